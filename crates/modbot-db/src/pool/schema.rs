//! Idempotent schema bootstrap
//!
//! One logical store per concern; every statement is `IF NOT EXISTS` so the
//! bootstrap can run on every start.

use sqlx::PgPool;
use tracing::info;

/// Full schema of the moderation stores
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS moderator_ranks (
    chat_id     BIGINT  NOT NULL,
    id          BIGINT  NOT NULL,
    name        TEXT    NOT NULL,
    level       INTEGER NOT NULL,
    priority    INTEGER NOT NULL,
    PRIMARY KEY (chat_id, id),
    UNIQUE (chat_id, level)
);

CREATE TABLE IF NOT EXISTS moderation_levels (
    chat_id     BIGINT  NOT NULL,
    user_id     BIGINT  NOT NULL,
    level       INTEGER NOT NULL,
    PRIMARY KEY (chat_id, user_id)
);

CREATE TABLE IF NOT EXISTS command_levels (
    chat_id     BIGINT  NOT NULL,
    command     TEXT    NOT NULL,
    level       INTEGER NOT NULL,
    PRIMARY KEY (chat_id, command)
);

CREATE TABLE IF NOT EXISTS moderation_actions (
    id               BIGSERIAL   PRIMARY KEY,
    action_type      TEXT        NOT NULL,
    user_id          BIGINT      NOT NULL,
    admin_id         BIGINT      NOT NULL,
    chat_id          BIGINT      NOT NULL,
    duration_seconds BIGINT,
    reason           TEXT,
    created_at       TIMESTAMPTZ NOT NULL,
    expires_at       TIMESTAMPTZ,
    active           BOOLEAN     NOT NULL DEFAULT TRUE
);
CREATE INDEX IF NOT EXISTS idx_moderation_actions_live
    ON moderation_actions (chat_id, action_type, active);
CREATE INDEX IF NOT EXISTS idx_moderation_actions_history
    ON moderation_actions (chat_id, created_at DESC, id DESC);

CREATE TABLE IF NOT EXISTS warnings (
    id          BIGSERIAL   PRIMARY KEY,
    user_id     BIGINT      NOT NULL,
    chat_id     BIGINT      NOT NULL,
    admin_id    BIGINT      NOT NULL,
    reason      TEXT,
    created_at  TIMESTAMPTZ NOT NULL,
    active      BOOLEAN     NOT NULL DEFAULT TRUE
);
CREATE INDEX IF NOT EXISTS idx_warnings_user ON warnings (chat_id, user_id, active);

CREATE TABLE IF NOT EXISTS awards (
    id          BIGSERIAL   PRIMARY KEY,
    chat_id     BIGINT      NOT NULL,
    user_id     BIGINT      NOT NULL,
    admin_id    BIGINT      NOT NULL,
    text        TEXT        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS reports (
    id                  BIGSERIAL   PRIMARY KEY,
    chat_id             BIGINT      NOT NULL,
    chat_title          TEXT,
    chat_username       TEXT,
    message_id          BIGINT      NOT NULL,
    reporter_id         BIGINT      NOT NULL,
    target_user_id      BIGINT,
    target_user_name    TEXT,
    message_text        TEXT,
    has_photo           BOOLEAN     NOT NULL DEFAULT FALSE,
    has_video           BOOLEAN     NOT NULL DEFAULT FALSE,
    created_at          TIMESTAMPTZ NOT NULL,
    status              TEXT        NOT NULL DEFAULT 'open',
    closed_by_user_id   BIGINT,
    closed_by_user_name TEXT
);
CREATE INDEX IF NOT EXISTS idx_reports_status ON reports (status, chat_id);

CREATE TABLE IF NOT EXISTS appeals (
    id          BIGSERIAL   PRIMARY KEY,
    user_id     BIGINT      NOT NULL,
    description TEXT        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    status      TEXT        NOT NULL DEFAULT 'open'
);

CREATE TABLE IF NOT EXISTS known_users (
    chat_id     BIGINT      NOT NULL,
    user_id     BIGINT      NOT NULL,
    username    TEXT,
    full_name   TEXT        NOT NULL,
    last_seen   TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (chat_id, user_id)
);
CREATE INDEX IF NOT EXISTS idx_known_users_username ON known_users (lower(username));
";

/// Create all tables and indexes that do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Database schema ensured");
    Ok(())
}
