//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only level {required}+ members can do this")]
    InsufficientAuthority { required: i32 },

    #[error("Cannot moderate members with equal or higher level")]
    TargetOutranks,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Rank not found: {0}")]
    RankNotFound(i64),

    #[error("Report not found: {0}")]
    ReportNotFound(i64),

    #[error("Appeal not found: {0}")]
    AppealNotFound(i64),

    #[error("Award not found: {0}")]
    AwardNotFound(i64),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Default rank {0} cannot be deleted")]
    ProtectedRank(i64),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get a stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            // Authorization
            Self::InsufficientAuthority { .. } => "INSUFFICIENT_AUTHORITY",
            Self::TargetOutranks => "TARGET_OUTRANKS",

            // Validation
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",

            // Not Found
            Self::RankNotFound(_) => "UNKNOWN_RANK",
            Self::ReportNotFound(_) => "UNKNOWN_REPORT",
            Self::AppealNotFound(_) => "UNKNOWN_APPEAL",
            Self::AwardNotFound(_) => "UNKNOWN_AWARD",

            // Business Rules
            Self::ProtectedRank(_) => "PROTECTED_RANK",

            // Infrastructure
            Self::TransportError(_) => "TRANSPORT_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RankNotFound(_)
                | Self::ReportNotFound(_)
                | Self::AppealNotFound(_)
                | Self::AwardNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::InsufficientAuthority { .. } | Self::TargetOutranks
        )
    }

    /// Check if the messaging gateway rejected the call
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }

    /// Storage and internal failures abort the current command
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::InternalError(_))
    }

    /// Shorthand for transport failures
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Shorthand for invalid arguments
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
