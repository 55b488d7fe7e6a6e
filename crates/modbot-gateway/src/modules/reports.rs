//! Reports, appeals and the private review menu

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use modbot_core::OutgoingMessage;
use modbot_service::{
    ReportWorkflow, ReviewCallback, ServiceContext, ServiceResult, SessionState,
};
use tracing::{debug, warn};

use crate::dispatch::{
    CallbackCall, CommandCall, Handled, HandlerResult, Module, ModuleDescriptor, NotApplicable,
    TextCall,
};

/// How often expired review sessions are dropped
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub struct ReportsModule;

#[async_trait]
impl Module for ReportsModule {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: "reports",
            commands: &["report", "reports", "reporthistory", "appeal", "menu"],
            handles_callbacks: &[ReviewCallback::PREFIX],
            handles_text: true,
            has_startup: true,
        }
    }

    async fn startup(&self, ctx: Arc<ServiceContext>) -> ServiceResult<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let purged = ctx.sessions().purge_expired(Utc::now());
                if purged > 0 {
                    debug!(purged, "Expired review sessions dropped");
                }
            }
        });
        Ok(())
    }

    async fn command(&self, ctx: &ServiceContext, call: &CommandCall<'_>) -> HandlerResult {
        let workflow = ReportWorkflow::new(ctx);
        let inv = &call.inv;
        Ok(match call.name {
            "report" => {
                let reported = call.message.reported_message();
                workflow.submit_report(inv, reported.as_ref()).await.into()
            }
            "reports" => workflow.open_overview(inv).await.into(),
            "reporthistory" => workflow.report_history(inv, call.args).await.into(),
            "appeal" => workflow.start_appeal(inv).into(),
            "menu" => Handled::Plain(workflow.exit_menu(inv)),
            _ => return Err(NotApplicable),
        })
    }

    async fn callback(&self, ctx: &ServiceContext, call: &CallbackCall<'_>) -> HandlerResult {
        let Some(action) = ReviewCallback::parse(call.data) else {
            debug!(data = call.data, "Malformed review callback");
            return Ok(Handled::Done);
        };
        let workflow = ReportWorkflow::new(ctx);
        let inv = &call.inv;

        Ok(match action {
            ReviewCallback::Page(page) => workflow.change_page(inv, page).await.into(),
            ReviewCallback::Close(key) => {
                let Some(origin) = call.origin() else {
                    return Ok(Handled::Done);
                };
                let closer = call.query.from.full_name();
                match workflow.close_entry(inv, key, origin, &closer).await {
                    Ok(notice) => Handled::Plain(notice),
                    Err(e) => Handled::Failed(e),
                }
            }
            ReviewCallback::Reopen(key) => {
                let Some(origin) = call.origin() else {
                    return Ok(Handled::Done);
                };
                match workflow.reopen_entry(inv, key, origin).await {
                    Ok(notice) => Handled::Plain(notice),
                    Err(e) => Handled::Failed(e),
                }
            }
            ReviewCallback::Exit => {
                let confirmation = workflow.exit_menu(inv);
                if let Err(e) = ctx
                    .gateway()
                    .send_message(OutgoingMessage::plain(inv.chat_id, confirmation))
                    .await
                {
                    warn!(user_id = %inv.actor_id, error = %e, "Failed to send menu confirmation");
                }
                Handled::Plain(ctx.tr(
                    "moderation.report.menu_exit_callback",
                    inv.lang(),
                    "Reports menu closed.",
                    &[],
                ))
            }
        })
    }

    /// Free text in a private chat feeds the pending selection or appeal
    async fn text(&self, ctx: &ServiceContext, call: &TextCall<'_>) -> HandlerResult {
        let inv = &call.inv;
        if !inv.is_private() {
            return Err(NotApplicable);
        }
        let workflow = ReportWorkflow::new(ctx);
        match ctx.sessions().state(inv.actor_id, inv.now) {
            SessionState::AwaitingReportSelection => {
                let text = call.message.text_or_caption().unwrap_or_default();
                Ok(workflow.select_entry(inv, text).await.into())
            }
            SessionState::AwaitingAppealReason => Ok(workflow
                .submit_appeal_reason(inv, call.message.text.as_deref())
                .await
                .into()),
            SessionState::Idle => Err(NotApplicable),
        }
    }
}
