//! Warning and award model -> entity mappers

use modbot_core::entities::{Award, Warning};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::{AwardModel, WarningModel};

impl From<WarningModel> for Warning {
    fn from(model: WarningModel) -> Self {
        Warning {
            id: model.id,
            user_id: UserId::new(model.user_id),
            chat_id: ChatId::new(model.chat_id),
            admin_id: UserId::new(model.admin_id),
            reason: model.reason,
            timestamp: model.created_at,
            active: model.active,
        }
    }
}

impl From<AwardModel> for Award {
    fn from(model: AwardModel) -> Self {
        Award {
            id: model.id,
            chat_id: ChatId::new(model.chat_id),
            user_id: UserId::new(model.user_id),
            admin_id: UserId::new(model.admin_id),
            text: model.text,
            timestamp: model.created_at,
        }
    }
}
