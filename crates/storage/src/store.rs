use async_trait::async_trait;

use crate::Database;
use crate::dto::score::{DeletionResult, RankedScore};
use crate::error::Result;
use crate::models::ScoreEntry;
use crate::repository::score::ScoreRepository;

/// Backing relation for score entries.
///
/// Implementations must honour the same semantics: `top_scores` returns the
/// best score per nickname ordered by score descending then nickname
/// ascending, and `delete_by_nickname` fails with `StorageError::NotFound`
/// carrying the nickname when nothing matched.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn ensure_schema(&self) -> Result<()>;

    async fn insert(&self, nickname: &str, score: i32) -> Result<ScoreEntry>;

    async fn top_scores(&self, limit: usize) -> Result<Vec<RankedScore>>;

    async fn delete_by_nickname(&self, nickname: &str) -> Result<DeletionResult>;
}

#[async_trait]
impl ScoreStore for Database {
    async fn ensure_schema(&self) -> Result<()> {
        self.run_migrations().await
    }

    async fn insert(&self, nickname: &str, score: i32) -> Result<ScoreEntry> {
        ScoreRepository::new(self.pool()).insert(nickname, score).await
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<RankedScore>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        ScoreRepository::new(self.pool()).top_scores(limit).await
    }

    async fn delete_by_nickname(&self, nickname: &str) -> Result<DeletionResult> {
        ScoreRepository::new(self.pool())
            .delete_by_nickname(nickname)
            .await
    }
}
