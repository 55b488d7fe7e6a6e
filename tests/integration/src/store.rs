//! In-memory implementation of every repository port
//!
//! One [`MemoryStore`] backs all stores of a test context, mirroring the
//! ordering and upsert rules of the PostgreSQL repositories. Tests inspect
//! the tables through the snapshot accessors.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use modbot_core::entities::{
    ActionType, Appeal, Award, CommandRestriction, EntryStatus, ModerationAction, ModeratorRank,
    NewAction, NewReport, Report, UserLevelOverride, Warning,
};
use modbot_core::traits::{
    ActionRepository, AppealRepository, AwardRepository, CommandRestrictionRepository,
    LevelRepository, RankRepository, RepoResult, ReportRepository, WarningRepository,
};
use modbot_core::value_objects::{ChatId, UserId};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    ranks: Vec<ModeratorRank>,
    levels: Vec<UserLevelOverride>,
    restrictions: Vec<CommandRestriction>,
    actions: Vec<ModerationAction>,
    warnings: Vec<Warning>,
    awards: Vec<Award>,
    reports: Vec<Report>,
    appeals: Vec<Appeal>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory tables
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn actions(&self) -> Vec<ModerationAction> {
        self.tables().actions.clone()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.tables().warnings.clone()
    }

    pub fn reports(&self) -> Vec<Report> {
        self.tables().reports.clone()
    }

    pub fn appeals(&self) -> Vec<Appeal> {
        self.tables().appeals.clone()
    }

    pub fn awards(&self) -> Vec<Award> {
        self.tables().awards.clone()
    }

    pub fn ranks(&self, chat_id: ChatId) -> Vec<ModeratorRank> {
        self.tables()
            .ranks
            .iter()
            .filter(|r| r.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn level_of(&self, chat_id: ChatId, user_id: UserId) -> Option<i32> {
        self.tables()
            .levels
            .iter()
            .find(|o| o.chat_id == chat_id && o.user_id == user_id)
            .map(|o| o.level)
    }
}

fn newest_first_by<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

// ============================================================================
// Ranks, levels, restrictions
// ============================================================================

#[async_trait]
impl RankRepository for MemoryStore {
    async fn find_by_id(&self, chat_id: ChatId, id: i64) -> RepoResult<Option<ModeratorRank>> {
        Ok(self
            .tables()
            .ranks
            .iter()
            .find(|r| r.chat_id == chat_id && r.id == id)
            .cloned())
    }

    async fn find_by_level(&self, chat_id: ChatId, level: i32) -> RepoResult<Option<ModeratorRank>> {
        Ok(self
            .tables()
            .ranks
            .iter()
            .find(|r| r.chat_id == chat_id && r.level == level)
            .cloned())
    }

    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<ModeratorRank>> {
        Ok(self.ranks(chat_id))
    }

    async fn replace_at_level(&self, rank: &ModeratorRank) -> RepoResult<()> {
        let mut tables = self.tables();
        tables
            .ranks
            .retain(|r| r.chat_id != rank.chat_id || (r.level != rank.level && r.id != rank.id));
        tables.ranks.push(rank.clone());
        Ok(())
    }

    async fn create_next(&self, chat_id: ChatId, name: &str, priority: i32) -> RepoResult<ModeratorRank> {
        let mut tables = self.tables();
        let in_chat = tables.ranks.iter().filter(|r| r.chat_id == chat_id);
        let id = in_chat.clone().map(|r| r.id).max().unwrap_or(5) + 1;
        let level = in_chat.map(|r| r.level).max().unwrap_or(5) + 1;
        let rank = ModeratorRank {
            id,
            chat_id,
            name: name.to_string(),
            level,
            priority,
        };
        tables.ranks.push(rank.clone());
        Ok(rank)
    }

    async fn rename(&self, chat_id: ChatId, id: i64, name: &str) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.ranks.iter_mut().find(|r| r.chat_id == chat_id && r.id == id) {
            Some(rank) => {
                rank.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, chat_id: ChatId, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.ranks.len();
        tables.ranks.retain(|r| r.chat_id != chat_id || r.id != id);
        Ok(tables.ranks.len() < before)
    }
}

#[async_trait]
impl LevelRepository for MemoryStore {
    async fn get(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Option<i32>> {
        Ok(self.level_of(chat_id, user_id))
    }

    async fn set(&self, chat_id: ChatId, user_id: UserId, level: i32) -> RepoResult<()> {
        let mut tables = self.tables();
        tables
            .levels
            .retain(|o| o.chat_id != chat_id || o.user_id != user_id);
        tables.levels.push(UserLevelOverride {
            chat_id,
            user_id,
            level,
        });
        Ok(())
    }

    async fn clear(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.levels.len();
        tables
            .levels
            .retain(|o| o.chat_id != chat_id || o.user_id != user_id);
        Ok(tables.levels.len() < before)
    }

    async fn clear_level(&self, chat_id: ChatId, level: i32) -> RepoResult<u64> {
        let mut tables = self.tables();
        let before = tables.levels.len();
        tables.levels.retain(|o| o.chat_id != chat_id || o.level != level);
        Ok((before - tables.levels.len()) as u64)
    }

    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserLevelOverride>> {
        Ok(self
            .tables()
            .levels
            .iter()
            .filter(|o| o.chat_id == chat_id)
            .copied()
            .collect())
    }

    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Vec<UserLevelOverride>> {
        Ok(self
            .tables()
            .levels
            .iter()
            .filter(|o| o.user_id == user_id)
            .copied()
            .collect())
    }
}

#[async_trait]
impl CommandRestrictionRepository for MemoryStore {
    async fn get(&self, chat_id: ChatId, command: &str) -> RepoResult<Option<i32>> {
        Ok(self
            .tables()
            .restrictions
            .iter()
            .find(|r| r.chat_id == chat_id && r.command == command)
            .map(|r| r.required_priority))
    }

    async fn set(&self, chat_id: ChatId, command: &str, priority: i32) -> RepoResult<()> {
        let mut tables = self.tables();
        tables
            .restrictions
            .retain(|r| r.chat_id != chat_id || r.command != command);
        tables.restrictions.push(CommandRestriction {
            chat_id,
            command: command.to_string(),
            required_priority: priority,
        });
        Ok(())
    }

    async fn clear(&self, chat_id: ChatId, command: &str) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.restrictions.len();
        tables
            .restrictions
            .retain(|r| r.chat_id != chat_id || r.command != command);
        Ok(tables.restrictions.len() < before)
    }

    async fn find_by_chat(&self, chat_id: ChatId) -> RepoResult<Vec<CommandRestriction>> {
        Ok(self
            .tables()
            .restrictions
            .iter()
            .filter(|r| r.chat_id == chat_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Ledger
// ============================================================================

#[async_trait]
impl ActionRepository for MemoryStore {
    async fn insert(
        &self,
        action: &NewAction,
        timestamp: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> RepoResult<ModerationAction> {
        let mut tables = self.tables();
        let stored = ModerationAction {
            id: tables.next_id(),
            action_type: action.action_type,
            user_id: action.user_id,
            admin_id: action.admin_id,
            chat_id: action.chat_id,
            duration_seconds: action.duration.map(|d| d.num_seconds()),
            reason: action.reason.clone(),
            timestamp,
            expires_at,
            active: action.active,
        };
        tables.actions.push(stored.clone());
        Ok(stored)
    }

    async fn find_active(&self, chat_id: ChatId, action_type: ActionType) -> RepoResult<Vec<ModerationAction>> {
        let mut rows: Vec<ModerationAction> = self
            .tables()
            .actions
            .iter()
            .filter(|a| a.chat_id == chat_id && a.action_type == action_type && a.active)
            .cloned()
            .collect();
        newest_first_by(&mut rows, |a| (a.timestamp, a.id));
        Ok(rows)
    }

    async fn deactivate_ids(&self, ids: &[i64]) -> RepoResult<u64> {
        let mut tables = self.tables();
        let mut count = 0;
        for action in tables.actions.iter_mut().filter(|a| a.active && ids.contains(&a.id)) {
            action.active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn deactivate_for_user(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        action_type: ActionType,
    ) -> RepoResult<u64> {
        let mut tables = self.tables();
        let mut count = 0;
        for action in tables.actions.iter_mut().filter(|a| {
            a.active && a.chat_id == chat_id && a.user_id == user_id && a.action_type == action_type
        }) {
            action.active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn deactivate_for_chat(&self, chat_id: ChatId, action_type: ActionType) -> RepoResult<u64> {
        let mut tables = self.tables();
        let mut count = 0;
        for action in tables
            .actions
            .iter_mut()
            .filter(|a| a.active && a.chat_id == chat_id && a.action_type == action_type)
        {
            action.active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn find_page(&self, chat_ids: &[ChatId], limit: i64, offset: i64) -> RepoResult<Vec<ModerationAction>> {
        let mut rows: Vec<ModerationAction> = self
            .tables()
            .actions
            .iter()
            .filter(|a| chat_ids.contains(&a.chat_id))
            .cloned()
            .collect();
        newest_first_by(&mut rows, |a| (a.timestamp, a.id));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn user_ids_for_chat(&self, chat_id: ChatId) -> RepoResult<Vec<UserId>> {
        let ids: BTreeSet<UserId> = self
            .tables()
            .actions
            .iter()
            .filter(|a| a.chat_id == chat_id)
            .map(|a| a.user_id)
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>> {
        let ids: BTreeSet<ChatId> = self.tables().actions.iter().map(|a| a.chat_id).collect();
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl WarningRepository for MemoryStore {
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        reason: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Warning> {
        let mut tables = self.tables();
        let warning = Warning {
            id: tables.next_id(),
            user_id,
            chat_id,
            admin_id,
            reason: reason.map(str::to_string),
            timestamp,
            active: true,
        };
        tables.warnings.push(warning.clone());
        Ok(warning)
    }

    async fn find_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Warning>> {
        let mut rows: Vec<Warning> = self
            .tables()
            .warnings
            .iter()
            .filter(|w| w.active && w.chat_id == chat_id && w.user_id == user_id)
            .cloned()
            .collect();
        newest_first_by(&mut rows, |w| (w.timestamp, w.id));
        Ok(rows)
    }

    async fn count_active(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<i64> {
        Ok(self
            .tables()
            .warnings
            .iter()
            .filter(|w| w.active && w.chat_id == chat_id && w.user_id == user_id)
            .count() as i64)
    }

    async fn deactivate(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.warnings.iter_mut().find(|w| w.id == id && w.active) {
            Some(warning) => {
                warning.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn deactivate_for_chat(&self, chat_id: ChatId) -> RepoResult<u64> {
        let mut tables = self.tables();
        let mut count = 0;
        for warning in tables
            .warnings
            .iter_mut()
            .filter(|w| w.active && w.chat_id == chat_id)
        {
            warning.active = false;
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl AwardRepository for MemoryStore {
    async fn insert(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        admin_id: UserId,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> RepoResult<Award> {
        let mut tables = self.tables();
        let award = Award {
            id: tables.next_id(),
            chat_id,
            user_id,
            admin_id,
            text: text.to_string(),
            timestamp,
        };
        tables.awards.push(award.clone());
        Ok(award)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Award>> {
        Ok(self.tables().awards.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_user(&self, chat_id: ChatId, user_id: UserId) -> RepoResult<Vec<Award>> {
        let mut rows: Vec<Award> = self
            .tables()
            .awards
            .iter()
            .filter(|a| a.chat_id == chat_id && a.user_id == user_id)
            .cloned()
            .collect();
        newest_first_by(&mut rows, |a| (a.timestamp, a.id));
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut tables = self.tables();
        let before = tables.awards.len();
        tables.awards.retain(|a| a.id != id);
        Ok(tables.awards.len() < before)
    }
}

// ============================================================================
// Reports and appeals
// ============================================================================

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn insert(&self, report: &NewReport, created_at: DateTime<Utc>) -> RepoResult<Report> {
        let mut tables = self.tables();
        let stored = Report {
            id: tables.next_id(),
            chat_id: report.chat_id,
            chat_title: report.chat_title.clone(),
            chat_username: report.chat_username.clone(),
            message_id: report.message_id,
            reporter_id: report.reporter_id,
            target_user_id: report.target_user_id,
            target_user_name: report.target_user_name.clone(),
            message_text: report.message_text.clone(),
            has_photo: report.has_photo,
            has_video: report.has_video,
            created_at,
            status: EntryStatus::Open,
            closed_by_user_id: None,
            closed_by_user_name: None,
        };
        tables.reports.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Report>> {
        Ok(self.tables().reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_status(&self, status: EntryStatus, chat_ids: Option<&[ChatId]>) -> RepoResult<Vec<Report>> {
        let mut rows: Vec<Report> = self
            .tables()
            .reports
            .iter()
            .filter(|r| r.status == status)
            .filter(|r| chat_ids.is_none_or(|ids| ids.contains(&r.chat_id)))
            .cloned()
            .collect();
        newest_first_by(&mut rows, |r| (r.created_at, r.id));
        Ok(rows)
    }

    async fn update_status(
        &self,
        id: i64,
        status: EntryStatus,
        closed_by: Option<(UserId, &str)>,
    ) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.reports.iter_mut().find(|r| r.id == id) {
            Some(report) => {
                report.status = status;
                report.closed_by_user_id = closed_by.map(|(user_id, _)| user_id);
                report.closed_by_user_name = closed_by.map(|(_, name)| name.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_page(&self, chat_ids: &[ChatId], limit: i64, offset: i64) -> RepoResult<Vec<Report>> {
        let mut rows: Vec<Report> = self
            .tables()
            .reports
            .iter()
            .filter(|r| chat_ids.contains(&r.chat_id))
            .cloned()
            .collect();
        newest_first_by(&mut rows, |r| (r.created_at, r.id));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn known_chat_ids(&self) -> RepoResult<Vec<ChatId>> {
        let ids: BTreeSet<ChatId> = self.tables().reports.iter().map(|r| r.chat_id).collect();
        Ok(ids.into_iter().collect())
    }
}

#[async_trait]
impl AppealRepository for MemoryStore {
    async fn insert(&self, user_id: UserId, description: &str, created_at: DateTime<Utc>) -> RepoResult<Appeal> {
        let mut tables = self.tables();
        let appeal = Appeal {
            id: tables.next_id(),
            user_id,
            description: description.to_string(),
            created_at,
            status: EntryStatus::Open,
        };
        tables.appeals.push(appeal.clone());
        Ok(appeal)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Appeal>> {
        Ok(self.tables().appeals.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_status(&self, status: EntryStatus) -> RepoResult<Vec<Appeal>> {
        let mut rows: Vec<Appeal> = self
            .tables()
            .appeals
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        newest_first_by(&mut rows, |a| (a.created_at, a.id));
        Ok(rows)
    }

    async fn update_status(&self, id: i64, status: EntryStatus) -> RepoResult<bool> {
        let mut tables = self.tables();
        match tables.appeals.iter_mut().find(|a| a.id == id) {
            Some(appeal) => {
                appeal.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
