//! Level resolution
//!
//! A user's effective level is their stored override, else a default derived
//! from chat-membership status. The effective priority is the priority of the
//! rank at that level; priority is the only ordering used for comparisons.

use modbot_core::entities::ModeratorRank;
use modbot_core::value_objects::{ChatId, MemberStatus, UserId};
use modbot_core::DomainError;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::rank::RankRegistry;

/// Level granted by membership status alone (`creator` 5, `administrator` 3,
/// everything else 0)
pub fn status_level(status: Option<MemberStatus>) -> i32 {
    status.map_or(0, MemberStatus::default_level)
}

pub struct LevelResolver<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LevelResolver<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Override if stored, else the default for the user's membership
    /// status as reported by the gateway. A failed lookup counts as level 0.
    #[instrument(skip(self))]
    pub async fn effective_level(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<i32> {
        if let Some(level) = self.ctx.level_repo().get(chat_id, user_id).await? {
            return Ok(level);
        }
        Ok(status_level(self.member_status(chat_id, user_id).await))
    }

    /// Rank at the user's effective level. Level 0 is the plain member rank
    /// and is never written to the catalogue.
    #[instrument(skip(self))]
    pub async fn effective_rank(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<ModeratorRank> {
        let level = self.effective_level(chat_id, user_id).await?;
        if level <= 0 {
            return Ok(ModeratorRank::synthetic(chat_id, 0));
        }
        RankRegistry::new(self.ctx)
            .ensure_rank_for_level(chat_id, level)
            .await
    }

    /// Priority of the rank at the user's effective level
    pub async fn effective_priority(&self, chat_id: ChatId, user_id: UserId) -> ServiceResult<i32> {
        Ok(self.effective_rank(chat_id, user_id).await?.priority)
    }

    /// Membership status, `None` when the gateway cannot tell
    pub async fn member_status(&self, chat_id: ChatId, user_id: UserId) -> Option<MemberStatus> {
        match self.ctx.gateway().get_chat_member(chat_id, user_id).await {
            Ok(member) => Some(member.status),
            Err(e) => {
                debug!(chat_id = %chat_id, user_id = %user_id, error = %e, "Membership lookup failed");
                None
            }
        }
    }

    /// Store an override; level 0 removes it
    #[instrument(skip(self))]
    pub async fn set_level(&self, chat_id: ChatId, user_id: UserId, level: i32) -> ServiceResult<()> {
        if level < 0 {
            return Err(DomainError::invalid("Level must be zero or positive.").into());
        }
        if level == 0 {
            self.ctx.level_repo().clear(chat_id, user_id).await?;
        } else {
            self.ctx.level_repo().set(chat_id, user_id, level).await?;
        }
        info!(chat_id = %chat_id, user_id = %user_id, level, "Level override updated");
        Ok(())
    }
}
