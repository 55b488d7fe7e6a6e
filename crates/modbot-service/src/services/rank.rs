//! Rank registry
//!
//! Per-chat catalogue of named ranks. Levels 0-5 are seeded defaults whose id
//! equals their level; custom ranks are appended above the current maximum.

use std::cmp::Reverse;

use modbot_core::entities::{ModeratorRank, DEFAULT_RANK_LEVELS};
use modbot_core::value_objects::ChatId;
use modbot_core::DomainError;
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Rank catalogue operations
pub struct RankRegistry<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RankRegistry<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Seed the six default ranks. A row already holding a default level under
    /// a foreign id keeps its name and priority but is re-keyed to the level.
    #[instrument(skip(self))]
    pub async fn ensure_defaults(&self, chat_id: ChatId) -> ServiceResult<()> {
        let repo = self.ctx.rank_repo();
        for level in DEFAULT_RANK_LEVELS {
            let rank = match repo.find_by_level(chat_id, level).await? {
                Some(existing) if existing.id == i64::from(level) => continue,
                Some(existing) => ModeratorRank {
                    id: i64::from(level),
                    ..existing
                },
                None => ModeratorRank::synthetic(chat_id, level),
            };
            debug!(chat_id = %chat_id, level, "Seeding default rank");
            repo.replace_at_level(&rank).await?;
        }
        Ok(())
    }

    /// Create a custom rank at the next free level
    #[instrument(skip(self))]
    pub async fn add_rank(
        &self,
        chat_id: ChatId,
        name: &str,
        priority: i32,
    ) -> ServiceResult<ModeratorRank> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid("Rank name cannot be empty.").into());
        }
        if priority < 0 {
            return Err(DomainError::invalid("Priority must be zero or positive.").into());
        }

        self.ensure_defaults(chat_id).await?;
        let rank = self.ctx.rank_repo().create_next(chat_id, name, priority).await?;

        info!(chat_id = %chat_id, rank_id = rank.id, level = rank.level, "Rank created");
        Ok(rank)
    }

    #[instrument(skip(self))]
    pub async fn rename_rank(
        &self,
        chat_id: ChatId,
        id: i64,
        name: &str,
    ) -> ServiceResult<ModeratorRank> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid("Rank name cannot be empty.").into());
        }

        self.ensure_defaults(chat_id).await?;
        if !self.ctx.rank_repo().rename(chat_id, id, name).await? {
            return Err(DomainError::RankNotFound(id).into());
        }

        self.get_rank_by_id(chat_id, id)
            .await?
            .ok_or_else(|| DomainError::RankNotFound(id).into())
    }

    /// Delete a custom rank and clear every override pointing at its level
    #[instrument(skip(self))]
    pub async fn delete_rank(&self, chat_id: ChatId, id: i64) -> ServiceResult<ModeratorRank> {
        let rank = self
            .get_rank_by_id(chat_id, id)
            .await?
            .ok_or(DomainError::RankNotFound(id))?;

        if rank.is_default() {
            return Err(DomainError::ProtectedRank(id).into());
        }

        if !self.ctx.rank_repo().delete(chat_id, id).await? {
            return Err(DomainError::RankNotFound(id).into());
        }
        let cleared = self.ctx.level_repo().clear_level(chat_id, rank.level).await?;

        info!(chat_id = %chat_id, rank_id = id, cleared, "Rank deleted");
        Ok(rank)
    }

    /// Stored rank by id; default ids resolve even before seeding
    pub async fn get_rank_by_id(
        &self,
        chat_id: ChatId,
        id: i64,
    ) -> ServiceResult<Option<ModeratorRank>> {
        if let Some(rank) = self.ctx.rank_repo().find_by_id(chat_id, id).await? {
            return Ok(Some(rank));
        }
        Ok(i32::try_from(id)
            .ok()
            .and_then(|level| ModeratorRank::default_for_level(chat_id, level)))
    }

    pub async fn get_rank_by_level(
        &self,
        chat_id: ChatId,
        level: i32,
    ) -> ServiceResult<Option<ModeratorRank>> {
        if let Some(rank) = self.ctx.rank_repo().find_by_level(chat_id, level).await? {
            return Ok(Some(rank));
        }
        Ok(ModeratorRank::default_for_level(chat_id, level))
    }

    /// All ranks: priority desc, then level desc, then id asc
    #[instrument(skip(self))]
    pub async fn ordered_ranks(&self, chat_id: ChatId) -> ServiceResult<Vec<ModeratorRank>> {
        self.ensure_defaults(chat_id).await?;
        let mut ranks = self.ctx.rank_repo().find_by_chat(chat_id).await?;
        sort_ranks(&mut ranks);
        Ok(ranks)
    }

    /// Rank describing `level`; unknown custom levels get a stored `Level N`
    /// rank whose priority equals the level.
    #[instrument(skip(self))]
    pub async fn ensure_rank_for_level(
        &self,
        chat_id: ChatId,
        level: i32,
    ) -> ServiceResult<ModeratorRank> {
        let level = level.max(0);
        if let Some(rank) = self.get_rank_by_level(chat_id, level).await? {
            return Ok(rank);
        }

        let rank = ModeratorRank::synthetic(chat_id, level);
        // A custom rank may already own this id at another level
        if self.ctx.rank_repo().find_by_id(chat_id, rank.id).await?.is_none() {
            self.ctx.rank_repo().replace_at_level(&rank).await?;
            debug!(chat_id = %chat_id, level, "Materialized rank for observed level");
        }
        Ok(rank)
    }
}

/// Sort for listings: priority desc, level desc, id asc
pub fn sort_ranks(ranks: &mut [ModeratorRank]) {
    ranks.sort_by_key(|r| (Reverse(r.priority), Reverse(r.level), r.id));
}
