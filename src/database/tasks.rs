use async_trait::async_trait;
use poise::serenity_prelude::GuildId;

use super::{Database, malformed};
use crate::models::{Task, TaskCategory, TierAmounts};
use crate::repository::{ImportCounts, RepoResult, TaskRepository};

type TaskRow = (String, String, String, Option<String>, String, i32, i32, i32, i32);

fn into_task(row: TaskRow) -> RepoResult<Task> {
    let (id, name, category, skill, verification_type, bronze, silver, gold, weight) = row;
    let category = category
        .parse::<TaskCategory>()
        .map_err(|_| malformed("task category", &category))?;

    Ok(Task {
        id,
        name,
        category,
        skill,
        verification_type,
        amounts: TierAmounts { bronze, silver, gold },
        weight,
    })
}

const SELECT_TASK: &str = r#"
    SELECT task_id, name, category, skill, verification_type,
           amt_bronze, amt_silver, amt_gold, weight
    FROM tasks
"#;

#[async_trait]
impl TaskRepository for Database {
    async fn get_all_tasks(&self, guild_id: GuildId) -> RepoResult<Vec<Task>> {
        let id = self.check(guild_id)?;
        let rows: Vec<TaskRow> =
            sqlx::query_as(&format!("{} WHERE guild_id = $1 ORDER BY task_id", SELECT_TASK))
                .bind(id)
                .fetch_all(self.pool())
                .await?;

        rows.into_iter().map(into_task).collect()
    }

    async fn get_tasks_by_category(
        &self,
        guild_id: GuildId,
        category: TaskCategory,
    ) -> RepoResult<Vec<Task>> {
        let id = self.check(guild_id)?;
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "{} WHERE guild_id = $1 AND category = $2 ORDER BY task_id",
            SELECT_TASK
        ))
        .bind(id)
        .bind(category.as_str())
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(into_task).collect()
    }

    async fn insert_tasks(&self, guild_id: GuildId, tasks: &[Task]) -> RepoResult<ImportCounts> {
        let id = self.check(guild_id)?;
        let mut tx = self.pool().begin().await?;
        let mut counts = ImportCounts::default();

        for task in tasks {
            let result = sqlx::query(
                r#"
                INSERT INTO tasks (
                    guild_id, task_id, name, category, skill, verification_type,
                    amt_bronze, amt_silver, amt_gold, weight
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (guild_id, task_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&task.id)
            .bind(&task.name)
            .bind(task.category.as_str())
            .bind(&task.skill)
            .bind(&task.verification_type)
            .bind(task.amounts.bronze)
            .bind(task.amounts.silver)
            .bind(task.amounts.gold)
            .bind(task.weight)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                counts.inserted += 1;
            } else {
                counts.skipped += 1;
            }
        }

        tx.commit().await?;
        Ok(counts)
    }

    async fn adjust_task_weight(
        &self,
        guild_id: GuildId,
        task_id: &str,
        delta: i32,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query("UPDATE tasks SET weight = weight + $3 WHERE guild_id = $1 AND task_id = $2")
            .bind(id)
            .bind(task_id)
            .bind(delta)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
