//! # modbot-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `modbot-core`, plus the persistent user directory. It handles:
//!
//! - Connection pool management and schema bootstrap
//! - Database models with SQLx `FromRow` derives
//! - Model → entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modbot_db::pool::{create_pool, ensure_schema, DatabaseConfig};
//! use modbot_db::repositories::PgRankRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::with_url("postgres://localhost/modbot")).await?;
//!     ensure_schema(&pool).await?;
//!     let ranks = PgRankRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, ensure_schema, DatabaseConfig, PgPool};
pub use repositories::{
    PgActionRepository, PgAppealRepository, PgAwardRepository, PgCommandRestrictionRepository,
    PgLevelRepository, PgRankRepository, PgReportRepository, PgUserDirectory,
    PgWarningRepository,
};
