use sqlx::PgPool;

use crate::dto::score::{DeletionResult, RankedScore};
use crate::error::{Result, StorageError};
use crate::models::ScoreEntry;

pub struct ScoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one entry stamped with the database's current time
    pub async fn insert(&self, nickname: &str, score: i32) -> Result<ScoreEntry> {
        let entry = sqlx::query_as::<_, ScoreEntry>(
            r#"
            INSERT INTO scores (nickname, score)
            VALUES ($1, $2)
            RETURNING id, nickname, score, timestamp AS recorded_at
            "#,
        )
        .bind(nickname)
        .bind(score)
        .fetch_one(self.pool)
        .await?;

        Ok(entry)
    }

    /// Best score per nickname, highest first. Equal scores are ordered by
    /// nickname in byte order so the result does not depend on the server
    /// collation.
    pub async fn top_scores(&self, limit: i64) -> Result<Vec<RankedScore>> {
        let rows = sqlx::query_as::<_, RankedScore>(
            r#"
            SELECT nickname, MAX(score) AS score
            FROM scores
            GROUP BY nickname
            ORDER BY MAX(score) DESC, nickname COLLATE "C" ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Remove every entry recorded under exactly this nickname
    pub async fn delete_by_nickname(&self, nickname: &str) -> Result<DeletionResult> {
        let result = sqlx::query("DELETE FROM scores WHERE nickname = $1")
            .bind(nickname)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(nickname.to_string()));
        }

        Ok(DeletionResult {
            deleted: result.rows_affected(),
        })
    }
}
