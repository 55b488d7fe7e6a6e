//! Service layer error types
//!
//! Provides a unified error type for all service operations and the mapping
//! from an error to the reply a user sees in chat.

use modbot_common::AppError;
use modbot_core::traits::Localizer;
use modbot_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (configuration, bootstrap)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// A gated command was invoked below its required priority
    CommandDenied { command: String, required: i32 },

    /// The messaging gateway refused an enforcement call
    Transport { action: &'static str, message: String },

    /// Internal error
    Internal(String),
}

/// User-facing error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientAuthority,
    TargetOutranks,
    InvalidArgument,
    NotFound,
    Protected,
    Transport,
    Storage,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::CommandDenied { command, required } => {
                write!(f, "/{command} requires priority {required}")
            }
            Self::Transport { action, message } => write!(f, "Failed to {action}: {message}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// The actor lacks the priority a command or action requires
    pub fn insufficient(required: i32) -> Self {
        Self::Domain(DomainError::InsufficientAuthority { required })
    }

    /// A command gate refused the actor
    pub fn denied(command: impl Into<String>, required: i32) -> Self {
        Self::CommandDenied {
            command: command.into(),
            required,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a gateway failure raised while applying `action`
    pub fn transport(action: &'static str, err: DomainError) -> Self {
        let message = match err {
            DomainError::TransportError(msg) => msg,
            other => other.to_string(),
        };
        Self::Transport { action, message }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify into the user-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => match e {
                DomainError::InsufficientAuthority { .. } => ErrorKind::InsufficientAuthority,
                DomainError::TargetOutranks => ErrorKind::TargetOutranks,
                DomainError::InvalidArgument(_) => ErrorKind::InvalidArgument,
                DomainError::ProtectedRank(_) => ErrorKind::Protected,
                DomainError::TransportError(_) => ErrorKind::Transport,
                e if e.is_not_found() => ErrorKind::NotFound,
                _ => ErrorKind::Storage,
            },
            Self::App(AppError::InvalidInput(_)) => ErrorKind::InvalidArgument,
            Self::App(_) | Self::Internal(_) => ErrorKind::Storage,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::InvalidArgument,
            Self::CommandDenied { .. } => ErrorKind::InsufficientAuthority,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Storage and internal failures are logged at error level
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::CommandDenied { .. } => "INSUFFICIENT_AUTHORITY",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Reply text shown in chat
    pub fn user_message(&self, localizer: &dyn Localizer, language: Option<&str>) -> String {
        let tr = |key: &str, default: &str, args: &[(&str, String)]| {
            localizer.translate(key, language, default, args)
        };

        match self {
            Self::Domain(DomainError::InsufficientAuthority { required }) => tr(
                "moderation.error.insufficient",
                "❌ Only level {level}+ members can do this.",
                &[("level", required.to_string())],
            ),
            Self::CommandDenied { command, required } => tr(
                "moderation.command_restrict.denied",
                "❌ Only level {level}+ members can use /{command}.",
                &[("level", required.to_string()), ("command", command.clone())],
            ),
            Self::Domain(DomainError::TargetOutranks) => tr(
                "moderation.error.target_outranks",
                "❌ You cannot moderate members with an equal or higher level.",
                &[],
            ),
            Self::Domain(DomainError::InvalidArgument(msg)) | Self::Validation(msg) => {
                if msg.starts_with('❌') {
                    msg.clone()
                } else {
                    format!("❌ {msg}")
                }
            }
            Self::Domain(DomainError::RankNotFound(id)) => tr(
                "moderation.error.rank_not_found",
                "❌ Rank {id} does not exist.",
                &[("id", id.to_string())],
            ),
            Self::Domain(DomainError::ReportNotFound(_)) => tr(
                "moderation.report.selection.report_missing",
                "This report is no longer available.",
                &[],
            ),
            Self::Domain(DomainError::AppealNotFound(_)) => tr(
                "moderation.report.selection.appeal_missing",
                "This appeal is no longer available.",
                &[],
            ),
            Self::Domain(DomainError::AwardNotFound(id)) => tr(
                "moderation.award.not_found",
                "❌ Award #{id} was not found in this chat.",
                &[("id", id.to_string())],
            ),
            Self::Domain(DomainError::ProtectedRank(id)) => tr(
                "moderation.rank.protected",
                "❌ Rank {id} is a default rank and cannot be deleted.",
                &[("id", id.to_string())],
            ),
            Self::NotFound { resource, id } => tr(
                "moderation.error.not_found",
                "❌ {resource} {id} was not found.",
                &[("resource", (*resource).to_string()), ("id", id.clone())],
            ),
            Self::Transport { action, message } => transport_reply(localizer, language, action, message),
            Self::Domain(DomainError::TransportError(message)) => {
                transport_reply(localizer, language, "complete the action", message)
            }
            Self::Domain(_) | Self::App(_) | Self::Internal(_) => tr(
                "moderation.error.generic",
                "❌ Something went wrong. Please try again later.",
                &[],
            ),
        }
    }
}

/// Friendly text for a refused gateway call
fn transport_reply(
    localizer: &dyn Localizer,
    language: Option<&str>,
    action: &str,
    message: &str,
) -> String {
    let lowered = message.to_lowercase();
    if lowered.contains("user is an administrator of the chat") {
        return localizer.translate(
            "moderation.transport.admin",
            language,
            "Hey buddy, I'm not scared, watch your words.",
            &[],
        );
    }
    if lowered.contains("can't remove chat owner") {
        return localizer.translate(
            "moderation.transport.owner",
            language,
            "Bold move trying to remove the chat owner!",
            &[],
        );
    }
    if lowered.contains("can't restrict self") {
        return localizer.translate(
            "moderation.transport.self",
            language,
            "That's a bit much, you can't restrict yourself.",
            &[],
        );
    }
    localizer.translate(
        "moderation.transport.failed",
        language,
        "❌ Failed to {action} user: {error}",
        &[("action", action.to_string()), ("error", message.to_string())],
    )
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|e| e.message.as_ref().map(ToString::to_string))
            .next()
            .unwrap_or_else(|| err.to_string());
        Self::Validation(message)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::InvalidInput(format!("{resource} {id} not found"))
            }
            ServiceError::Validation(msg) => AppError::InvalidInput(msg),
            ServiceError::CommandDenied { required, .. } => {
                AppError::Domain(DomainError::InsufficientAuthority { required })
            }
            ServiceError::Transport { action, message } => {
                AppError::ExternalService(format!("{action}: {message}"))
            }
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
