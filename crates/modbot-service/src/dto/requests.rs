//! Request DTOs for command arguments
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Rank Requests
// ============================================================================

/// `/addmodrank <name> <priority>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddRankRequest {
    #[validate(length(min = 1, max = 64, message = "Rank name must be 1-64 characters."))]
    pub name: String,

    #[validate(range(min = 0, max = 1000, message = "Priority must be between 0 and 1000."))]
    pub priority: i32,
}

/// `/modedit <id> <name>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameRankRequest {
    pub id: i64,

    #[validate(length(min = 1, max = 64, message = "Rank name must be 1-64 characters."))]
    pub name: String,
}

// ============================================================================
// Ledger Requests
// ============================================================================

/// `/award <text>`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AwardRequest {
    #[validate(length(min = 1, max = 512, message = "Award text must be 1-512 characters."))]
    pub text: String,
}

/// Free-text reason of an appeal
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppealRequest {
    #[validate(length(min = 1, max = 4000, message = "Please describe your appeal in 1-4000 characters."))]
    pub description: String,
}
