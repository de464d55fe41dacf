use super::Database;
use sqlx::Error as SqlxError;

impl Database {
    /// Run database migrations to create tables
    pub(super) async fn run_migrations(&self) -> Result<(), SqlxError> {
        self.create_guild_tables().await?;
        self.create_keyword_tables().await?;
        self.create_task_tables().await?;
        self.create_submission_tables().await?;
        self.create_movie_tables().await?;
        self.create_prize_tables().await?;
        self.create_user_tables().await?;
        Ok(())
    }

    async fn execute_all(&self, statements: &[&str]) -> Result<(), SqlxError> {
        for statement in statements {
            sqlx::query(statement).execute(self.pool()).await?;
        }
        Ok(())
    }

    async fn create_guild_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[r#"
            CREATE TABLE IF NOT EXISTS guilds (
                guild_id BIGINT PRIMARY KEY,
                toggles JSONB NOT NULL DEFAULT '{}',
                roles JSONB NOT NULL DEFAULT '{}',
                channels JSONB NOT NULL DEFAULT '{}',
                setup JSONB NOT NULL DEFAULT '{}',
                updated_by BIGINT,
                updated_at TIMESTAMPTZ
            )
            "#])
        .await
    }

    async fn create_keyword_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[r#"
            CREATE TABLE IF NOT EXISTS keywords (
                guild_id BIGINT NOT NULL,
                keyword_id TEXT NOT NULL,
                word TEXT NOT NULL,
                last_used_at TIMESTAMPTZ,
                last_used_event BIGINT,
                times_used INTEGER NOT NULL DEFAULT 0,
                usage_history BIGINT[] NOT NULL DEFAULT '{}',
                PRIMARY KEY (guild_id, keyword_id)
            )
            "#])
        .await
    }

    async fn create_task_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                guild_id BIGINT NOT NULL,
                task_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                skill TEXT,
                verification_type TEXT NOT NULL,
                amt_bronze INTEGER NOT NULL DEFAULT 0,
                amt_silver INTEGER NOT NULL DEFAULT 0,
                amt_gold INTEGER NOT NULL DEFAULT 0,
                weight INTEGER NOT NULL DEFAULT 50,
                PRIMARY KEY (guild_id, task_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS task_events (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                tasks JSONB NOT NULL,
                keyword TEXT,
                channel_id BIGINT,
                message_id BIGINT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS task_polls (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                category TEXT NOT NULL,
                options TEXT[] NOT NULL,
                channel_id BIGINT,
                message_id BIGINT,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS task_poll_votes (
                poll_id BIGINT NOT NULL REFERENCES task_polls(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL,
                task_id TEXT NOT NULL,
                PRIMARY KEY (poll_id, user_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS task_feedback (
                guild_id BIGINT NOT NULL,
                event_id BIGINT NOT NULL,
                task_id TEXT NOT NULL,
                user_id BIGINT NOT NULL,
                vote TEXT NOT NULL,
                PRIMARY KEY (guild_id, event_id, task_id, user_id)
            )
            "#,
        ])
        .await
    }

    async fn create_submission_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                event_id BIGINT NOT NULL,
                task_id TEXT NOT NULL,
                proof TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                tier TEXT,
                reviewed_by BIGINT,
                reviewed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            "CREATE INDEX IF NOT EXISTS submissions_guild_status ON submissions (guild_id, status, reviewed_at)",
        ])
        .await
    }

    async fn create_movie_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                title TEXT NOT NULL,
                title_key TEXT NOT NULL,
                added_by BIGINT NOT NULL,
                added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                watched BOOLEAN NOT NULL DEFAULT FALSE,
                watched_at TIMESTAMPTZ,
                UNIQUE (guild_id, title_key)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS movie_polls (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                options BIGINT[] NOT NULL,
                channel_id BIGINT,
                message_id BIGINT,
                active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS movie_poll_votes (
                poll_id BIGINT NOT NULL REFERENCES movie_polls(id) ON DELETE CASCADE,
                user_id BIGINT NOT NULL,
                movie_id BIGINT NOT NULL,
                PRIMARY KEY (poll_id, user_id)
            )
            "#,
        ])
        .await
    }

    async fn create_prize_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[r#"
            CREATE TABLE IF NOT EXISTS prize_draws (
                id BIGSERIAL PRIMARY KEY,
                guild_id BIGINT NOT NULL,
                period_start TIMESTAMPTZ NOT NULL,
                period_end TIMESTAMPTZ NOT NULL,
                entries JSONB NOT NULL,
                winners BIGINT[] NOT NULL DEFAULT '{}',
                rolled_at TIMESTAMPTZ
            )
            "#])
        .await
    }

    async fn create_user_tables(&self) -> Result<(), SqlxError> {
        self.execute_all(&[r#"
            CREATE TABLE IF NOT EXISTS user_stats (
                guild_id BIGINT NOT NULL,
                user_id BIGINT NOT NULL,
                tasks_completed INTEGER NOT NULL DEFAULT 0,
                bronze INTEGER NOT NULL DEFAULT 0,
                silver INTEGER NOT NULL DEFAULT 0,
                gold INTEGER NOT NULL DEFAULT 0,
                prize_wins INTEGER NOT NULL DEFAULT 0,
                movies_added INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (guild_id, user_id)
            )
            "#])
        .await
    }
}
