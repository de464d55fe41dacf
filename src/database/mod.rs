/// Database modules organized by feature
mod events;
mod guilds;
mod keywords;
mod migrations;
mod movies;
mod prize_draws;
mod submissions;
mod tasks;
mod users;

use poise::serenity_prelude::GuildId;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::config::GuildScope;
use crate::repository::{RepoError, RepoResult};

/// Database connection pool wrapper
///
/// Implements every repository trait. Writes for guilds outside the current
/// scope are refused so a dev bot never touches production guild data.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    scope: GuildScope,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(database_url: &str, scope: GuildScope) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let db = Self { pool, scope };
        db.run_migrations().await?;

        info!("Database connected and migrations completed");
        Ok(db)
    }

    /// Get a reference to the connection pool (for internal use)
    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Refuse guilds outside the configured scope
    fn check(&self, guild_id: GuildId) -> RepoResult<i64> {
        if self.scope.permits(guild_id) {
            Ok(guild_id.get() as i64)
        } else {
            Err(RepoError::GuildNotPermitted(guild_id))
        }
    }
}

/// Convert a stored BIGINT back into a Discord id
fn snowflake<T: From<u64>>(value: i64) -> T {
    T::from(value as u64)
}

fn malformed(what: &str, value: impl std::fmt::Display) -> RepoError {
    RepoError::Malformed(format!("{} '{}'", what, value))
}
