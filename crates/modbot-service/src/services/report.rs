//! Report and appeal review workflow
//!
//! Members report messages in groups; moderators review open reports and
//! appeals from a paginated overview in their private chat with the bot.
//! The overview, its page and the visible entry list live in the caller's
//! [`ReviewSession`]. Appeals are global: anyone who moderates at least one
//! tracked chat sees all of them.

use std::collections::{BTreeSet, HashMap};

use modbot_core::entities::{shorten, Appeal, EntryStatus, NewReport, Report};
use modbot_core::traits::{
    InlineButton, InlineKeyboard, Localizer, MessageRef, OutgoingMessage,
};
use modbot_core::value_objects::{ChatId, UserId};
use modbot_core::DomainError;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::format::{display_label, escape_html, format_timestamp, linked_user, user_link};
use super::invocation::Invocation;
use super::permission::PermissionChecker;
use super::session::{EntryKey, ReviewEntry, ReviewSession, SessionState};
use crate::dto::AppealRequest;

pub const REVIEW_PAGE_SIZE: usize = 10;
pub const HISTORY_PAGE_SIZE: i64 = 10;
const SUMMARY_CHARS: usize = 60;
const PAGE_BUTTONS_PER_ROW: usize = 5;

/// The message a member replied to with `/report`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportedMessage {
    pub chat_title: Option<String>,
    pub chat_username: Option<String>,
    pub message_id: i64,
    pub author_id: Option<UserId>,
    pub author_name: Option<String>,
    pub author_is_bot: bool,
    /// Text or caption with inline links already expanded
    pub text: Option<String>,
    pub has_photo: bool,
    pub has_video: bool,
}

/// Text and keyboard of one rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub text: String,
    pub keyboard: InlineKeyboard,
}

/// Overview page after clamping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub view: ReviewView,
    pub page: usize,
    pub total_pages: usize,
}

/// Button presses understood by the review menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCallback {
    Page(i64),
    Close(EntryKey),
    Reopen(EntryKey),
    Exit,
}

impl ReviewCallback {
    pub const PREFIX: &'static str = "reports";

    /// `reports:page:{n}`, `reports:close:{kind}:{id}`, `reports:reopen:{kind}:{id}`, `reports:exit`
    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.split(':').collect();
        match parts.as_slice() {
            [Self::PREFIX, "exit"] => Some(Self::Exit),
            [Self::PREFIX, "page", page] => page.parse().ok().map(Self::Page),
            [Self::PREFIX, "close", kind, id] => EntryKey::parse(kind, id).map(Self::Close),
            [Self::PREFIX, "reopen", kind, id] => EntryKey::parse(kind, id).map(Self::Reopen),
            _ => None,
        }
    }
}

/// Row offset of a 1-based history page; `None` past the addressable range
pub fn history_offset(page: i64) -> Option<i64> {
    page.checked_sub(1)?.checked_mul(HISTORY_PAGE_SIZE)
}

/// `max(1, ceil(len / per_page))`
pub fn total_pages(len: usize, per_page: usize) -> usize {
    len.div_ceil(per_page.max(1)).max(1)
}

/// Render one overview page. `page` is clamped into `0..total_pages`.
pub fn render_page(
    localizer: &dyn Localizer,
    lang: Option<&str>,
    entries: &[ReviewEntry],
    page: i64,
    per_page: usize,
) -> RenderedPage {
    let per_page = per_page.max(1);
    let total = total_pages(entries.len(), per_page);
    let page = usize::try_from(page.max(0)).unwrap_or(0).min(total - 1);

    let start = page * per_page;
    let mut lines = Vec::new();
    let mut section = None;
    for (index, entry) in entries.iter().enumerate().skip(start).take(per_page) {
        let is_report = matches!(entry.key, EntryKey::Report(_));
        if section != Some(is_report) {
            let header = if is_report { "<b>Reports:</b>" } else { "<b>Appeals:</b>" };
            lines.push(header.to_string());
            section = Some(is_report);
        }
        lines.push(format!("{}. {}", index + 1, entry.label));
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(localizer.translate(
        "moderation.report.instructions",
        lang,
        "Send the number of an entry to view full details.",
        &[],
    ));
    lines.push(localizer.translate(
        "moderation.report.exit_hint",
        lang,
        "Send /menu to leave this menu.",
        &[],
    ));

    let mut keyboard = InlineKeyboard::new();
    if total > 1 {
        let buttons: Vec<InlineButton> = (0..total)
            .map(|idx| {
                let label = if idx == page {
                    format!("[{}]", idx + 1)
                } else {
                    (idx + 1).to_string()
                };
                InlineButton::callback(label, format!("reports:page:{idx}"))
            })
            .collect();
        for chunk in buttons.chunks(PAGE_BUTTONS_PER_ROW) {
            keyboard = keyboard.row(chunk.to_vec());
        }
    }
    keyboard = keyboard.row(vec![exit_button(localizer, lang)]);

    RenderedPage {
        view: ReviewView {
            text: lines.join("\n"),
            keyboard,
        },
        page,
        total_pages: total,
    }
}

fn exit_button(localizer: &dyn Localizer, lang: Option<&str>) -> InlineButton {
    InlineButton::callback(
        localizer.translate("moderation.report.exit_button", lang, "🏠 Back to menu", &[]),
        "reports:exit",
    )
}

/// Overview label of a report, without ordinal
pub fn report_label(report: &Report) -> String {
    let summary = report.summary(SUMMARY_CHARS);
    let summary = if summary.is_empty() {
        "[no text]".to_string()
    } else {
        escape_html(&summary)
    };
    format!("{}: {summary}", escape_html(&report.chat_label()))
}

pub struct ReportWorkflow<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReportWorkflow<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// `/report` as a reply inside a group
    #[instrument(skip(self, inv, reported), fields(chat_id = %inv.chat_id, user_id = %inv.actor_id))]
    pub async fn submit_report(
        &self,
        inv: &Invocation,
        reported: Option<&ReportedMessage>,
    ) -> ServiceResult<String> {
        if inv.is_private() {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.report.only_groups",
                inv.lang(),
                "❌ You can only use this command in group chats.",
                &[],
            )));
        }
        let Some(reported) = reported else {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.report.reply_required",
                inv.lang(),
                "❌ Reply to the message you want to report.",
                &[],
            )));
        };
        if reported.author_is_bot {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.report.target_is_bot",
                inv.lang(),
                "❌ You cannot report bot messages.",
                &[],
            )));
        }

        let report = self
            .ctx
            .report_repo()
            .insert(
                &NewReport {
                    chat_id: inv.chat_id,
                    chat_title: reported.chat_title.clone(),
                    chat_username: reported.chat_username.clone(),
                    message_id: reported.message_id,
                    reporter_id: inv.actor_id,
                    target_user_id: reported.author_id,
                    target_user_name: reported.author_name.clone(),
                    message_text: reported.text.clone().filter(|t| !t.is_empty()),
                    has_photo: reported.has_photo,
                    has_video: reported.has_video,
                },
                inv.now,
            )
            .await?;
        info!(chat_id = %inv.chat_id, report_id = report.id, "Report submitted");

        Ok(self.ctx.tr(
            "moderation.report.received",
            inv.lang(),
            "✅ Report submitted. Moderators will review it in their direct messages.",
            &[],
        ))
    }

    // ========================================================================
    // Overview
    // ========================================================================

    /// Chats where the user counts as a moderator, among chats with a stored
    /// level for the user, ledger rows or reports. Each chat is checked once.
    #[instrument(skip(self))]
    pub async fn moderated_chats(&self, user_id: UserId) -> ServiceResult<Vec<ChatId>> {
        let mut candidates: BTreeSet<ChatId> = self
            .ctx
            .level_repo()
            .find_by_user(user_id)
            .await?
            .into_iter()
            .map(|o| o.chat_id)
            .collect();
        candidates.extend(self.ctx.action_repo().known_chat_ids().await?);
        candidates.extend(self.ctx.report_repo().known_chat_ids().await?);

        let checker = PermissionChecker::new(self.ctx);
        let mut moderated = Vec::new();
        for chat_id in candidates {
            if checker.is_admin_for_chat(chat_id, user_id).await? {
                moderated.push(chat_id);
            }
        }
        debug!(count = moderated.len(), "Moderated chats resolved");
        Ok(moderated)
    }

    /// Open reports of chats where the user is admin, memoized per chat
    async fn visible_reports(&self, user_id: UserId) -> ServiceResult<Vec<Report>> {
        let reports = self
            .ctx
            .report_repo()
            .find_by_status(EntryStatus::Open, None)
            .await?;

        let checker = PermissionChecker::new(self.ctx);
        let mut allowed: HashMap<ChatId, bool> = HashMap::new();
        let mut visible = Vec::with_capacity(reports.len());
        for report in reports {
            let ok = match allowed.get(&report.chat_id) {
                Some(ok) => *ok,
                None => {
                    let ok = checker.is_admin_for_chat(report.chat_id, user_id).await?;
                    allowed.insert(report.chat_id, ok);
                    ok
                }
            };
            if ok {
                visible.push(report);
            }
        }
        Ok(visible)
    }

    /// Entries the user may review: visible reports, then every open appeal.
    /// `None` when the user moderates nothing.
    pub async fn overview_entries(&self, user_id: UserId) -> ServiceResult<Option<Vec<ReviewEntry>>> {
        let reports = self.visible_reports(user_id).await?;
        if reports.is_empty() && self.moderated_chats(user_id).await?.is_empty() {
            return Ok(None);
        }

        let appeals = self
            .ctx
            .appeal_repo()
            .find_by_status(EntryStatus::Open)
            .await?;

        let mut entries: Vec<ReviewEntry> = reports
            .iter()
            .map(|report| ReviewEntry {
                key: EntryKey::Report(report.id),
                label: report_label(report),
            })
            .collect();
        for appeal in &appeals {
            entries.push(ReviewEntry {
                key: EntryKey::Appeal(appeal.id),
                label: format!(
                    "{}: {}",
                    linked_user(self.ctx, None, appeal.user_id).await,
                    escape_html(&shorten(&appeal.description, SUMMARY_CHARS))
                ),
            });
        }
        Ok(Some(entries))
    }

    /// `/reports`: send the overview and start a review session
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn open_overview(&self, inv: &Invocation) -> ServiceResult<()> {
        self.require_dm(inv)?;
        self.ctx.sessions().remove(inv.actor_id);

        let Some(entries) = self.overview_entries(inv.actor_id).await? else {
            return Err(self.not_moderator(inv));
        };
        if entries.is_empty() {
            self.send_plain(inv, self.empty_text(inv.lang())).await?;
            return Ok(());
        }

        let rendered = render_page(self.ctx.localizer(), inv.lang(), &entries, 0, REVIEW_PAGE_SIZE);
        let overview = self
            .ctx
            .gateway()
            .send_message(
                OutgoingMessage::html(inv.chat_id, rendered.view.text)
                    .with_keyboard(rendered.view.keyboard),
            )
            .await
            .map_err(|e| ServiceError::transport("send overview", e))?;

        info!(user_id = %inv.actor_id, entries = entries.len(), "Review overview opened");
        self.ctx.sessions().put(
            ReviewSession::new(inv.actor_id, inv.language.clone(), inv.now).begin_review(
                entries,
                REVIEW_PAGE_SIZE,
                overview,
                inv.now,
            ),
        );
        Ok(())
    }

    /// Page button on the overview; stale buttons are ignored
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn change_page(&self, inv: &Invocation, page: i64) -> ServiceResult<()> {
        let Some(mut session) = self.ctx.sessions().get(inv.actor_id, inv.now) else {
            return Ok(());
        };
        let Some(overview) = session.overview else {
            return Ok(());
        };
        if session.entries.is_empty() || usize::try_from(page).ok() == Some(session.page) {
            return Ok(());
        }

        let lang = session.language.clone();
        let rendered = render_page(
            self.ctx.localizer(),
            lang.as_deref(),
            &session.entries,
            page,
            session.per_page,
        );
        if let Err(e) = self
            .ctx
            .gateway()
            .edit_message(overview, &rendered.view.text, Some(rendered.view.keyboard))
            .await
        {
            debug!(error = %e, "Failed to edit review overview page");
        }

        session.turn_page(rendered.page, inv.now);
        self.ctx.sessions().put(session);
        Ok(())
    }

    /// Free text while a review session awaits a selection
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn select_entry(&self, inv: &Invocation, text: &str) -> ServiceResult<()> {
        let session = match self.ctx.sessions().get(inv.actor_id, inv.now) {
            Some(session) if !session.entries.is_empty() => session,
            _ => {
                let text = self.ctx.tr(
                    "moderation.report.selection.no_active_menu",
                    inv.lang(),
                    "Use /reports to request the overview again.",
                    &[],
                );
                return self.send_plain(inv, text).await;
            }
        };
        if session.requester_id != inv.actor_id {
            let text = self.ctx.tr(
                "moderation.report.selection.only_requester",
                inv.lang(),
                "Only the moderator who opened the menu can select entries.",
                &[],
            );
            return self.send_plain(inv, text).await;
        }
        let lang = session.language.clone().or_else(|| inv.language.clone());
        let lang = lang.as_deref();

        let allowed: BTreeSet<i64> = self
            .visible_reports(inv.actor_id)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let entries: Vec<&ReviewEntry> = session
            .entries
            .iter()
            .filter(|e| match e.key {
                EntryKey::Report(id) => allowed.contains(&id),
                EntryKey::Appeal(_) => true,
            })
            .collect();
        if entries.is_empty() {
            let text = self.ctx.tr(
                "moderation.report.selection.no_longer_available",
                lang,
                "No entries available. Use /reports to refresh the list.",
                &[],
            );
            return self.send_plain(inv, text).await;
        }

        let value = text.trim();
        if value.starts_with('/') {
            return Ok(());
        }
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
            let text = self.ctx.tr(
                "moderation.report.selection.number_required",
                lang,
                "Please send the number from the list to view the entry.",
                &[],
            );
            return self.send_plain(inv, text).await;
        }

        let Some(entry) = value
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| entries.get(idx))
        else {
            let text = self.ctx.tr(
                "moderation.report.selection.out_of_range",
                lang,
                "The selected number is outside of the available range.",
                &[],
            );
            return self.send_plain(inv, text).await;
        };

        match self.detail_view(entry.key, lang).await? {
            Some(view) => {
                self.ctx
                    .gateway()
                    .send_message(OutgoingMessage::html(inv.chat_id, view.text).with_keyboard(view.keyboard))
                    .await
                    .map_err(|e| ServiceError::transport("send entry details", e))?;
                Ok(())
            }
            None => self.send_plain(inv, self.missing_text(entry.key, lang)).await,
        }
    }

    // ========================================================================
    // Detail views
    // ========================================================================

    /// Detail screen of a report or appeal, `None` when it no longer exists
    pub async fn detail_view(&self, key: EntryKey, lang: Option<&str>) -> ServiceResult<Option<ReviewView>> {
        Ok(match key {
            EntryKey::Report(id) => match self.ctx.report_repo().find_by_id(id).await? {
                Some(report) => Some(self.report_detail(&report, lang).await),
                None => None,
            },
            EntryKey::Appeal(id) => match self.ctx.appeal_repo().find_by_id(id).await? {
                Some(appeal) => Some(self.appeal_detail(&appeal, lang).await),
                None => None,
            },
        })
    }

    async fn report_detail(&self, report: &Report, lang: Option<&str>) -> ReviewView {
        let reporter = linked_user(self.ctx, Some(report.chat_id), report.reporter_id).await;
        let target = match report.target_user_id {
            Some(id) => {
                let label =
                    display_label(self.ctx, Some(report.chat_id), id, report.target_user_name.as_deref())
                        .await;
                user_link(id, &label)
            }
            None => escape_html(report.target_user_name.as_deref().unwrap_or("unknown")),
        };

        let body = escape_html(report.message_text.as_deref().unwrap_or_default()).replace('\n', "<br>");
        let body = if body.is_empty() {
            self.ctx.tr(
                "moderation.report.selection.no_text",
                lang,
                "<i>No text was attached to this message.</i>",
                &[],
            )
        } else {
            body
        };

        let mut lines = vec![
            format!("<b>Report #{}</b>", report.id),
            format!("Chat: {}", escape_html(&report.chat_label())),
            format!("Reporter: {reporter}"),
            format!("Target: {target}"),
            format!("Created: {}", format_timestamp(report.created_at)),
            String::new(),
            body,
        ];

        let mut attachments = Vec::new();
        if report.has_photo {
            attachments.push(self.ctx.tr("moderation.report.selection.attachment.photo", lang, "photo", &[]));
        }
        if report.has_video {
            attachments.push(self.ctx.tr("moderation.report.selection.attachment.video", lang, "video", &[]));
        }
        if !attachments.is_empty() {
            lines.push(String::new());
            lines.push(self.ctx.tr(
                "moderation.report.selection.contains",
                lang,
                "<i>Contains: {items}</i>",
                &[("items", escape_html(&attachments.join(", ")))],
            ));
        }

        lines.push(String::new());
        lines.push(self.status_line(report.status, lang));
        if !report.is_open() {
            if let Some(closer) = report.closed_by_user_id {
                let label = display_label(
                    self.ctx,
                    Some(report.chat_id),
                    closer,
                    report.closed_by_user_name.as_deref(),
                )
                .await;
                lines.push(self.ctx.tr(
                    "moderation.report.selection.closed_by",
                    lang,
                    "Closed by: {user}",
                    &[("user", user_link(closer, &label))],
                ));
            }
        }

        let key = EntryKey::Report(report.id);
        let keyboard = InlineKeyboard::new()
            .row(vec![InlineButton::url(
                self.ctx.tr("moderation.report.selection.open_message", lang, "Go To Message", &[]),
                report.message_link(),
            )])
            .row(vec![self.toggle_button(key, report.is_open(), lang)]);

        ReviewView {
            text: lines.join("\n"),
            keyboard,
        }
    }

    async fn appeal_detail(&self, appeal: &Appeal, lang: Option<&str>) -> ReviewView {
        let description = escape_html(&appeal.description).replace('\n', "<br>");
        let description = if description.is_empty() {
            self.ctx.tr(
                "moderation.report.selection.no_description",
                lang,
                "<i>No description provided.</i>",
                &[],
            )
        } else {
            description
        };

        let lines = [
            format!("<b>Appeal #{}</b>", appeal.id),
            format!("User: {}", linked_user(self.ctx, None, appeal.user_id).await),
            format!("Created: {}", format_timestamp(appeal.created_at)),
            String::new(),
            description,
            String::new(),
            self.status_line(appeal.status, lang),
        ];

        let key = EntryKey::Appeal(appeal.id);
        let keyboard = InlineKeyboard::new()
            .row(vec![InlineButton::url(
                self.ctx.tr("moderation.report.selection.open_dm", lang, "Go To DM", &[]),
                appeal.user_link(),
            )])
            .row(vec![self.toggle_button(key, appeal.is_open(), lang)]);

        ReviewView {
            text: lines.join("\n"),
            keyboard,
        }
    }

    fn status_line(&self, status: EntryStatus, lang: Option<&str>) -> String {
        let label = self.ctx.tr(
            &format!("moderation.report.selection.status.{status}"),
            lang,
            status.as_str(),
            &[],
        );
        self.ctx.tr(
            "moderation.report.selection.status",
            lang,
            "Status: {status}",
            &[("status", label)],
        )
    }

    /// Close button on open entries, reopen button on closed ones
    fn toggle_button(&self, key: EntryKey, open: bool, lang: Option<&str>) -> InlineButton {
        let suffix = key.callback_suffix();
        let (action, catalogue_key, default) = match (key, open) {
            (EntryKey::Report(_), true) => ("close", "moderation.report.selection.close_button", "✅ Close report"),
            (EntryKey::Appeal(_), true) => ("close", "moderation.report.selection.close_appeal_button", "✅ Close appeal"),
            (EntryKey::Report(_), false) => ("reopen", "moderation.report.selection.reopen_button", "↩️ Reopen report"),
            (EntryKey::Appeal(_), false) => ("reopen", "moderation.report.selection.reopen_appeal_button", "↩️ Reopen appeal"),
        };
        InlineButton::callback(
            self.ctx.tr(catalogue_key, lang, default, &[]),
            format!("reports:{action}:{suffix}"),
        )
    }

    // ========================================================================
    // Close / reopen
    // ========================================================================

    /// Close button on a detail message. Closing twice re-renders the same
    /// view and leaves `closed_by` untouched. Returns the callback notice.
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn close_entry(
        &self,
        inv: &Invocation,
        key: EntryKey,
        detail: MessageRef,
        closer_name: &str,
    ) -> ServiceResult<String> {
        let lang = self.session_lang(inv);
        let lang = lang.as_deref();
        if !self.may_review(inv.actor_id, key).await? {
            return Err(self.not_moderator(inv));
        }

        let already_closed = match key {
            EntryKey::Report(id) => {
                let Some(report) = self.ctx.report_repo().find_by_id(id).await? else {
                    return Err(DomainError::ReportNotFound(id).into());
                };
                if report.is_open() {
                    self.ctx
                        .report_repo()
                        .update_status(id, EntryStatus::Closed, Some((inv.actor_id, closer_name)))
                        .await?;
                }
                !report.is_open()
            }
            EntryKey::Appeal(id) => {
                let Some(appeal) = self.ctx.appeal_repo().find_by_id(id).await? else {
                    return Err(DomainError::AppealNotFound(id).into());
                };
                if appeal.is_open() {
                    self.ctx
                        .appeal_repo()
                        .update_status(id, EntryStatus::Closed)
                        .await?;
                }
                !appeal.is_open()
            }
        };

        self.rerender_detail(key, detail, lang).await?;
        let notice = match (key, already_closed) {
            (EntryKey::Report(_), true) => {
                self.ctx.tr("moderation.report.selection.close_already", lang, "Report already closed.", &[])
            }
            (EntryKey::Appeal(_), true) => self.ctx.tr(
                "moderation.report.selection.close_appeal_already",
                lang,
                "Appeal already closed.",
                &[],
            ),
            (EntryKey::Report(_), false) => {
                self.ctx.tr("moderation.report.selection.close_success", lang, "Report closed.", &[])
            }
            (EntryKey::Appeal(_), false) => {
                self.ctx.tr("moderation.report.selection.close_appeal_success", lang, "Appeal closed.", &[])
            }
        };
        if !already_closed {
            info!(user_id = %inv.actor_id, entry = %key.callback_suffix(), "Review entry closed");
            self.refresh_overview(inv).await?;
        }
        Ok(notice)
    }

    /// Reopen a closed entry and clear its closer
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn reopen_entry(&self, inv: &Invocation, key: EntryKey, detail: MessageRef) -> ServiceResult<String> {
        let lang = self.session_lang(inv);
        let lang = lang.as_deref();
        if !self.may_review(inv.actor_id, key).await? {
            return Err(self.not_moderator(inv));
        }

        let reopened = match key {
            EntryKey::Report(id) => {
                let Some(report) = self.ctx.report_repo().find_by_id(id).await? else {
                    return Err(DomainError::ReportNotFound(id).into());
                };
                if !report.is_open() {
                    self.ctx.report_repo().update_status(id, EntryStatus::Open, None).await?;
                }
                !report.is_open()
            }
            EntryKey::Appeal(id) => {
                let Some(appeal) = self.ctx.appeal_repo().find_by_id(id).await? else {
                    return Err(DomainError::AppealNotFound(id).into());
                };
                if !appeal.is_open() {
                    self.ctx.appeal_repo().update_status(id, EntryStatus::Open).await?;
                }
                !appeal.is_open()
            }
        };

        self.rerender_detail(key, detail, lang).await?;
        if reopened {
            info!(user_id = %inv.actor_id, entry = %key.callback_suffix(), "Review entry reopened");
            self.refresh_overview(inv).await?;
            Ok(self.ctx.tr("moderation.report.selection.reopen_success", lang, "Entry reopened.", &[]))
        } else {
            Ok(self.ctx.tr("moderation.report.selection.reopen_already", lang, "Entry is already open.", &[]))
        }
    }

    /// Reports need admin rights in their chat, appeals any moderated chat
    async fn may_review(&self, user_id: UserId, key: EntryKey) -> ServiceResult<bool> {
        match key {
            EntryKey::Report(id) => match self.ctx.report_repo().find_by_id(id).await? {
                Some(report) => {
                    PermissionChecker::new(self.ctx)
                        .is_admin_for_chat(report.chat_id, user_id)
                        .await
                }
                None => Err(DomainError::ReportNotFound(id).into()),
            },
            EntryKey::Appeal(_) => Ok(!self.moderated_chats(user_id).await?.is_empty()),
        }
    }

    async fn rerender_detail(&self, key: EntryKey, detail: MessageRef, lang: Option<&str>) -> ServiceResult<()> {
        if let Some(view) = self.detail_view(key, lang).await? {
            if let Err(e) = self
                .ctx
                .gateway()
                .edit_message(detail, &view.text, Some(view.keyboard))
                .await
            {
                debug!(error = %e, "Failed to edit entry details");
            }
        }
        Ok(())
    }

    /// Rebuild the caller's overview after a status change. An empty list
    /// shows the empty notice and ends the session.
    pub async fn refresh_overview(&self, inv: &Invocation) -> ServiceResult<()> {
        let Some(mut session) = self.ctx.sessions().get(inv.actor_id, inv.now) else {
            return Ok(());
        };
        let Some(overview) = session.overview else {
            return Ok(());
        };
        let lang = session.language.clone();
        let lang = lang.as_deref();

        let entries = self.overview_entries(inv.actor_id).await?.unwrap_or_default();
        if entries.is_empty() {
            let keyboard = InlineKeyboard::new().row(vec![exit_button(self.ctx.localizer(), lang)]);
            if let Err(e) = self
                .ctx
                .gateway()
                .edit_message(overview, &self.empty_text(lang), Some(keyboard))
                .await
            {
                debug!(error = %e, "Failed to edit review overview");
            }
            self.ctx.sessions().remove(inv.actor_id);
            return Ok(());
        }

        let rendered = render_page(
            self.ctx.localizer(),
            lang,
            &entries,
            i64::try_from(session.page).unwrap_or(0),
            session.per_page,
        );
        if let Err(e) = self
            .ctx
            .gateway()
            .edit_message(overview, &rendered.view.text, Some(rendered.view.keyboard))
            .await
        {
            debug!(error = %e, "Failed to edit review overview");
        }
        session.refresh(entries, rendered.page, inv.now);
        self.ctx.sessions().put(session);
        Ok(())
    }

    // ========================================================================
    // Menu and appeals
    // ========================================================================

    /// `/menu` or the exit button: drop any session
    pub fn exit_menu(&self, inv: &Invocation) -> String {
        if self.ctx.sessions().remove(inv.actor_id).is_some() {
            debug!(user_id = %inv.actor_id, "Review session closed");
        }
        self.ctx.tr(
            "moderation.menu.exit_confirmation",
            inv.lang(),
            "🏠 You're back in the main menu. Use /help to see available commands.",
            &[],
        )
    }

    /// `/appeal`: ask for the reason
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub fn start_appeal(&self, inv: &Invocation) -> ServiceResult<String> {
        if !inv.is_private() {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.appeal.dm_only",
                inv.lang(),
                "❌ Send appeals to the bot in a private chat.",
                &[],
            )));
        }
        let session = self
            .ctx
            .sessions()
            .get(inv.actor_id, inv.now)
            .unwrap_or_else(|| ReviewSession::new(inv.actor_id, inv.language.clone(), inv.now));
        self.ctx.sessions().put(session.await_appeal(inv.now));

        Ok(self.ctx.tr(
            "moderation.appeal.prompt",
            inv.lang(),
            "Please describe why you believe the punishment was a mistake.",
            &[],
        ))
    }

    /// Free text while an appeal reason is awaited. An empty reason keeps
    /// the session waiting.
    #[instrument(skip(self, inv, text), fields(user_id = %inv.actor_id))]
    pub async fn submit_appeal_reason(&self, inv: &Invocation, text: Option<&str>) -> ServiceResult<String> {
        if self.ctx.sessions().state(inv.actor_id, inv.now) != SessionState::AwaitingAppealReason {
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.appeal.not_waiting",
                inv.lang(),
                "Use /appeal to start a new appeal.",
                &[],
            )));
        }

        let reason = text.map(str::trim).unwrap_or_default();
        if reason.is_empty() {
            return Ok(self.ctx.tr(
                "moderation.appeal.empty",
                inv.lang(),
                "Please send a text description for your appeal.",
                &[],
            ));
        }
        let request = AppealRequest {
            description: reason.to_string(),
        };
        if let Err(e) = request.validate() {
            debug!(error = %e, "Appeal rejected by validation");
            return Err(ServiceError::validation(self.ctx.tr(
                "moderation.appeal.too_long",
                inv.lang(),
                "Please describe your appeal in 1-4000 characters.",
                &[],
            )));
        }

        let appeal = self
            .ctx
            .appeal_repo()
            .insert(inv.actor_id, &request.description, inv.now)
            .await?;
        self.ctx.sessions().remove(inv.actor_id);
        info!(user_id = %inv.actor_id, appeal_id = appeal.id, "Appeal submitted");

        Ok(self.ctx.tr(
            "moderation.appeal.received",
            inv.lang(),
            "✅ Your appeal has been submitted. Moderators will reach out in private messages if they need more details.",
            &[],
        ))
    }

    // ========================================================================
    // History
    // ========================================================================

    /// `/reporthistory [page]`: every report of the moderated chats
    #[instrument(skip(self, inv), fields(user_id = %inv.actor_id))]
    pub async fn report_history(&self, inv: &Invocation, args: &str) -> ServiceResult<String> {
        self.require_dm(inv)?;
        let page = args
            .split_whitespace()
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        let chats = self.moderated_chats(inv.actor_id).await?;
        if chats.is_empty() {
            return Err(self.not_moderator(inv));
        }
        let Some(offset) = history_offset(page) else {
            return Ok(self.ctx.tr(
                "moderation.report.history.no_page",
                inv.lang(),
                "No reports were found for this page.",
                &[],
            ));
        };

        let mut reports = self
            .ctx
            .report_repo()
            .find_page(&chats, HISTORY_PAGE_SIZE + 1, offset)
            .await?;
        let has_more = reports.len() > HISTORY_PAGE_SIZE as usize;
        reports.truncate(HISTORY_PAGE_SIZE as usize);

        if reports.is_empty() {
            return Ok(if page == 1 {
                self.ctx.tr("moderation.report.history.empty", inv.lang(), "There are no reports recorded yet.", &[])
            } else {
                self.ctx.tr(
                    "moderation.report.history.no_page",
                    inv.lang(),
                    "No reports were found for this page.",
                    &[],
                )
            });
        }

        let mut lines = vec![self.ctx.tr(
            "moderation.report.history.header",
            inv.lang(),
            "<b>Report history, page {page}</b>",
            &[("page", page.to_string())],
        )];
        for (index, report) in reports.iter().enumerate() {
            lines.push(self.history_entry(inv, offset + index as i64 + 1, report).await);
        }

        let mut footer = Vec::new();
        if page > 1 {
            footer.push(self.ctx.tr(
                "moderation.report.history.prev_hint",
                inv.lang(),
                "Use /reporthistory {page} for the previous page.",
                &[("page", (page - 1).to_string())],
            ));
        }
        if has_more {
            footer.push(self.ctx.tr(
                "moderation.report.history.next_hint",
                inv.lang(),
                "Use /reporthistory {page} for the next page.",
                &[("page", (page + 1).to_string())],
            ));
        }
        if !footer.is_empty() {
            lines.push(footer.join("\n"));
        }
        Ok(lines.join("\n"))
    }

    async fn history_entry(&self, inv: &Invocation, ordinal: i64, report: &Report) -> String {
        let summary = report.summary(SUMMARY_CHARS);
        let summary = if summary.is_empty() { "[no text]".to_string() } else { escape_html(&summary) };
        let reporter = linked_user(self.ctx, Some(report.chat_id), report.reporter_id).await;
        let target = match report.target_user_id {
            Some(id) => {
                let label =
                    display_label(self.ctx, Some(report.chat_id), id, report.target_user_name.as_deref())
                        .await;
                user_link(id, &label)
            }
            None => "unknown".to_string(),
        };

        let mut lines = vec![
            format!(
                r#"{ordinal}. [{}] <a href="{}">{}</a>: {summary}"#,
                report.status.as_str().to_uppercase(),
                report.message_link(),
                escape_html(&report.chat_label()),
            ),
            format!(
                "<i>Reporter:</i> {reporter} • <i>Target:</i> {target} • <i>Created:</i> {}",
                format_timestamp(report.created_at)
            ),
        ];
        if let (EntryStatus::Closed, Some(closer)) = (report.status, report.closed_by_user_id) {
            let label =
                display_label(self.ctx, Some(report.chat_id), closer, report.closed_by_user_name.as_deref())
                    .await;
            lines.push(self.ctx.tr(
                "moderation.report.history.closed_by",
                inv.lang(),
                "<i>Closed by:</i> {user}",
                &[("user", user_link(closer, &label))],
            ));
        }
        lines.join("\n")
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn require_dm(&self, inv: &Invocation) -> ServiceResult<()> {
        if inv.is_private() {
            return Ok(());
        }
        Err(ServiceError::validation(self.ctx.tr(
            "moderation.report.dm_only",
            inv.lang(),
            "❌ Use this command in a private chat with the bot.",
            &[],
        )))
    }

    fn not_moderator(&self, inv: &Invocation) -> ServiceError {
        ServiceError::validation(self.ctx.tr(
            "moderation.report.not_admin",
            inv.lang(),
            "❌ You are not a moderator in any tracked chats.",
            &[],
        ))
    }

    fn empty_text(&self, lang: Option<&str>) -> String {
        self.ctx.tr(
            "moderation.report.empty",
            lang,
            "There are no pending reports or appeals right now.",
            &[],
        )
    }

    fn missing_text(&self, key: EntryKey, lang: Option<&str>) -> String {
        match key {
            EntryKey::Report(_) => self.ctx.tr(
                "moderation.report.selection.report_missing",
                lang,
                "This report is no longer available.",
                &[],
            ),
            EntryKey::Appeal(_) => self.ctx.tr(
                "moderation.report.selection.appeal_missing",
                lang,
                "This appeal is no longer available.",
                &[],
            ),
        }
    }

    fn session_lang(&self, inv: &Invocation) -> Option<String> {
        self.ctx
            .sessions()
            .get(inv.actor_id, inv.now)
            .and_then(|s| s.language)
            .or_else(|| inv.language.clone())
    }

    async fn send_plain(&self, inv: &Invocation, text: String) -> ServiceResult<()> {
        if let Err(e) = self
            .ctx
            .gateway()
            .send_message(OutgoingMessage::plain(inv.chat_id, text))
            .await
        {
            warn!(error = %e, "Failed to send review reply");
        }
        Ok(())
    }
}
