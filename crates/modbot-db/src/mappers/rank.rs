//! Rank, level and restriction model -> entity mappers

use modbot_core::entities::{CommandRestriction, ModeratorRank, UserLevelOverride};
use modbot_core::value_objects::{ChatId, UserId};

use crate::models::{CommandLevelModel, LevelModel, RankModel};

impl From<RankModel> for ModeratorRank {
    fn from(model: RankModel) -> Self {
        ModeratorRank {
            id: model.id,
            chat_id: ChatId::new(model.chat_id),
            name: model.name,
            level: model.level,
            priority: model.priority,
        }
    }
}

impl From<LevelModel> for UserLevelOverride {
    fn from(model: LevelModel) -> Self {
        UserLevelOverride {
            chat_id: ChatId::new(model.chat_id),
            user_id: UserId::new(model.user_id),
            level: model.level,
        }
    }
}

impl From<CommandLevelModel> for CommandRestriction {
    fn from(model: CommandLevelModel) -> Self {
        CommandRestriction {
            chat_id: ChatId::new(model.chat_id),
            command: model.command,
            required_priority: model.level,
        }
    }
}
