//! Report and appeal model -> entity mappers

use modbot_core::entities::{Appeal, EntryStatus, Report};
use modbot_core::error::DomainError;
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::{AppealModel, ReportModel};

fn parse_status(raw: &str) -> Result<EntryStatus, DomainError> {
    raw.parse::<EntryStatus>().map_err(DomainError::DatabaseError)
}

pub fn report_from_model(model: ReportModel) -> Result<Report, DomainError> {
    Ok(Report {
        id: model.id,
        chat_id: ChatId::new(model.chat_id),
        chat_title: model.chat_title,
        chat_username: model.chat_username,
        message_id: model.message_id,
        reporter_id: UserId::new(model.reporter_id),
        target_user_id: model.target_user_id.map(UserId::new),
        target_user_name: model.target_user_name,
        message_text: model.message_text,
        has_photo: model.has_photo,
        has_video: model.has_video,
        created_at: model.created_at,
        status: parse_status(&model.status)?,
        closed_by_user_id: model.closed_by_user_id.map(UserId::new),
        closed_by_user_name: model.closed_by_user_name,
    })
}

pub fn appeal_from_model(model: AppealModel) -> Result<Appeal, DomainError> {
    Ok(Appeal {
        id: model.id,
        user_id: UserId::new(model.user_id),
        description: model.description,
        created_at: model.created_at,
        status: parse_status(&model.status)?,
    })
}
