//! Moderation action model -> entity mapper

use modbot_core::entities::{ActionType, ModerationAction};
use modbot_core::error::DomainError;
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::ActionModel;

/// Convert a ledger row; an unknown `action_type` is a storage fault
pub fn action_from_model(model: ActionModel) -> Result<ModerationAction, DomainError> {
    let action_type = model
        .action_type
        .parse::<ActionType>()
        .map_err(DomainError::DatabaseError)?;

    Ok(ModerationAction {
        id: model.id,
        action_type,
        user_id: UserId::new(model.user_id),
        admin_id: UserId::new(model.admin_id),
        chat_id: ChatId::new(model.chat_id),
        duration_seconds: model.duration_seconds,
        reason: model.reason,
        timestamp: model.created_at,
        expires_at: model.expires_at,
        active: model.active,
    })
}
