//! Review sessions
//!
//! The only in-memory, per-actor state of the engine: one session per
//! moderator (or appellant), keyed by user id. Only the owner ever writes
//! their session; ownership is checked explicitly by the workflow.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use modbot_core::traits::MessageRef;
use modbot_core::value_objects::UserId;

/// Where a user is in the report/appeal conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingReportSelection,
    AwaitingAppealReason,
}

/// What an overview line points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum EntryKey {
    Report(i64),
    Appeal(i64),
}

impl EntryKey {
    /// `report:{id}` / `appeal:{id}`, used in callback data
    pub fn callback_suffix(self) -> String {
        match self {
            Self::Report(id) => format!("report:{id}"),
            Self::Appeal(id) => format!("appeal:{id}"),
        }
    }

    /// Inverse of [`EntryKey::callback_suffix`]
    pub fn parse(kind: &str, id: &str) -> Option<Self> {
        let id = id.parse().ok()?;
        match kind {
            "report" => Some(Self::Report(id)),
            "appeal" => Some(Self::Appeal(id)),
            _ => None,
        }
    }
}

/// One line of the review overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub key: EntryKey,
    /// Pre-rendered HTML label without the ordinal
    pub label: String,
}

/// Ephemeral per-user workflow state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    pub requester_id: UserId,
    pub state: SessionState,
    pub entries: Vec<ReviewEntry>,
    pub page: usize,
    pub per_page: usize,
    pub overview: Option<MessageRef>,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewSession {
    pub fn new(requester_id: UserId, language: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            requester_id,
            state: SessionState::Idle,
            entries: Vec::new(),
            page: 0,
            per_page: 10,
            overview: None,
            language,
            updated_at: now,
        }
    }

    /// Idle -> AwaitingReportSelection
    pub fn begin_review(
        mut self,
        entries: Vec<ReviewEntry>,
        per_page: usize,
        overview: MessageRef,
        now: DateTime<Utc>,
    ) -> Self {
        self.state = SessionState::AwaitingReportSelection;
        self.entries = entries;
        self.per_page = per_page.max(1);
        self.page = 0;
        self.overview = Some(overview);
        self.updated_at = now;
        self
    }

    /// Any state -> AwaitingAppealReason
    pub fn await_appeal(mut self, now: DateTime<Utc>) -> Self {
        self.state = SessionState::AwaitingAppealReason;
        self.entries.clear();
        self.overview = None;
        self.updated_at = now;
        self
    }

    /// Replace the entry list after a close/reopen, keeping the page
    pub fn refresh(&mut self, entries: Vec<ReviewEntry>, page: usize, now: DateTime<Utc>) {
        self.entries = entries;
        self.page = page;
        self.updated_at = now;
    }

    pub fn turn_page(&mut self, page: usize, now: DateTime<Utc>) {
        self.page = page;
        self.updated_at = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.updated_at > ttl
    }
}

/// Concurrent session map with idle expiry
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<UserId, ReviewSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::seconds(ttl_secs.max(1)),
        }
    }

    /// Live session of a user; an expired one is dropped and reads as absent
    pub fn get(&self, user_id: UserId, now: DateTime<Utc>) -> Option<ReviewSession> {
        let expired = match self.sessions.get(&user_id) {
            Some(session) if !session.is_expired(now, self.ttl) => return Some(session.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(&user_id);
        }
        None
    }

    /// Current state, `Idle` when there is no live session
    pub fn state(&self, user_id: UserId, now: DateTime<Utc>) -> SessionState {
        self.get(user_id, now)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    pub fn put(&self, session: ReviewSession) {
        self.sessions.insert(session.requester_id, session);
    }

    pub fn remove(&self, user_id: UserId) -> Option<ReviewSession> {
        self.sessions.remove(&user_id).map(|(_, session)| session)
    }

    /// Drop every expired session, returns how many were dropped
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
