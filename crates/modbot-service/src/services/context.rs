//! Service context - dependency container for services
//!
//! Holds every store, the messaging gateway, the user directory, the string
//! catalogue, the moderation settings and the review-session store.

use std::sync::Arc;

use modbot_common::ModerationSettings;
use modbot_core::traits::{
    ActionRepository, AppealRepository, AwardRepository, CommandRestrictionRepository,
    LevelRepository, Localizer, MessagingGateway, RankRepository, ReportRepository,
    UserDirectory, WarningRepository,
};

use super::error::{ServiceError, ServiceResult};
use super::i18n::FallbackLocalizer;
use super::session::SessionStore;

/// Service context containing all dependencies
///
/// Constructed once at startup and shared (cheaply cloned) with every
/// update-handling task. There is no other process-wide state.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    rank_repo: Arc<dyn RankRepository>,
    level_repo: Arc<dyn LevelRepository>,
    restriction_repo: Arc<dyn CommandRestrictionRepository>,
    action_repo: Arc<dyn ActionRepository>,
    warning_repo: Arc<dyn WarningRepository>,
    award_repo: Arc<dyn AwardRepository>,
    report_repo: Arc<dyn ReportRepository>,
    appeal_repo: Arc<dyn AppealRepository>,

    // Collaborators
    gateway: Arc<dyn MessagingGateway>,
    directory: Arc<dyn UserDirectory>,
    localizer: Arc<dyn Localizer>,

    settings: ModerationSettings,
    sessions: SessionStore,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn rank_repo(&self) -> &dyn RankRepository {
        self.rank_repo.as_ref()
    }

    pub fn level_repo(&self) -> &dyn LevelRepository {
        self.level_repo.as_ref()
    }

    pub fn restriction_repo(&self) -> &dyn CommandRestrictionRepository {
        self.restriction_repo.as_ref()
    }

    pub fn action_repo(&self) -> &dyn ActionRepository {
        self.action_repo.as_ref()
    }

    pub fn warning_repo(&self) -> &dyn WarningRepository {
        self.warning_repo.as_ref()
    }

    pub fn award_repo(&self) -> &dyn AwardRepository {
        self.award_repo.as_ref()
    }

    pub fn report_repo(&self) -> &dyn ReportRepository {
        self.report_repo.as_ref()
    }

    pub fn appeal_repo(&self) -> &dyn AppealRepository {
        self.appeal_repo.as_ref()
    }

    // === Collaborators ===

    /// The messaging gateway (send, edit, restrict, ban...)
    pub fn gateway(&self) -> &dyn MessagingGateway {
        self.gateway.as_ref()
    }

    /// Username and display-name lookups
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    /// Translate a catalogue key, filling `{name}` placeholders
    pub fn tr(
        &self,
        key: &str,
        language: Option<&str>,
        default: &str,
        args: &[(&str, String)],
    ) -> String {
        self.localizer.translate(key, language, default, args)
    }

    // === Settings and state ===

    pub fn settings(&self) -> &ModerationSettings {
        &self.settings
    }

    /// Per-moderator review sessions
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("collaborators", &"...")
            .field("settings", &self.settings)
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    rank_repo: Option<Arc<dyn RankRepository>>,
    level_repo: Option<Arc<dyn LevelRepository>>,
    restriction_repo: Option<Arc<dyn CommandRestrictionRepository>>,
    action_repo: Option<Arc<dyn ActionRepository>>,
    warning_repo: Option<Arc<dyn WarningRepository>>,
    award_repo: Option<Arc<dyn AwardRepository>>,
    report_repo: Option<Arc<dyn ReportRepository>>,
    appeal_repo: Option<Arc<dyn AppealRepository>>,
    gateway: Option<Arc<dyn MessagingGateway>>,
    directory: Option<Arc<dyn UserDirectory>>,
    localizer: Option<Arc<dyn Localizer>>,
    settings: Option<ModerationSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank_repo(mut self, repo: Arc<dyn RankRepository>) -> Self {
        self.rank_repo = Some(repo);
        self
    }

    pub fn level_repo(mut self, repo: Arc<dyn LevelRepository>) -> Self {
        self.level_repo = Some(repo);
        self
    }

    pub fn restriction_repo(mut self, repo: Arc<dyn CommandRestrictionRepository>) -> Self {
        self.restriction_repo = Some(repo);
        self
    }

    pub fn action_repo(mut self, repo: Arc<dyn ActionRepository>) -> Self {
        self.action_repo = Some(repo);
        self
    }

    pub fn warning_repo(mut self, repo: Arc<dyn WarningRepository>) -> Self {
        self.warning_repo = Some(repo);
        self
    }

    pub fn award_repo(mut self, repo: Arc<dyn AwardRepository>) -> Self {
        self.award_repo = Some(repo);
        self
    }

    pub fn report_repo(mut self, repo: Arc<dyn ReportRepository>) -> Self {
        self.report_repo = Some(repo);
        self
    }

    pub fn appeal_repo(mut self, repo: Arc<dyn AppealRepository>) -> Self {
        self.appeal_repo = Some(repo);
        self
    }

    pub fn gateway(mut self, gateway: Arc<dyn MessagingGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Optional, defaults to [`FallbackLocalizer`]
    pub fn localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Optional, defaults to [`ModerationSettings::default`]
    pub fn settings(mut self, settings: ModerationSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let settings = self.settings.unwrap_or_default();
        let sessions = SessionStore::new(settings.session_ttl_secs);

        Ok(ServiceContext {
            rank_repo: self.rank_repo.ok_or_else(|| ServiceError::validation("rank_repo is required"))?,
            level_repo: self.level_repo.ok_or_else(|| ServiceError::validation("level_repo is required"))?,
            restriction_repo: self
                .restriction_repo
                .ok_or_else(|| ServiceError::validation("restriction_repo is required"))?,
            action_repo: self.action_repo.ok_or_else(|| ServiceError::validation("action_repo is required"))?,
            warning_repo: self.warning_repo.ok_or_else(|| ServiceError::validation("warning_repo is required"))?,
            award_repo: self.award_repo.ok_or_else(|| ServiceError::validation("award_repo is required"))?,
            report_repo: self.report_repo.ok_or_else(|| ServiceError::validation("report_repo is required"))?,
            appeal_repo: self.appeal_repo.ok_or_else(|| ServiceError::validation("appeal_repo is required"))?,
            gateway: self.gateway.ok_or_else(|| ServiceError::validation("gateway is required"))?,
            directory: self.directory.ok_or_else(|| ServiceError::validation("directory is required"))?,
            localizer: self.localizer.unwrap_or_else(|| Arc::new(FallbackLocalizer)),
            settings,
            sessions,
        })
    }
}
