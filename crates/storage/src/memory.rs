//! Process-local score store used by tests and database-less runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::dto::score::{DeletionResult, RankedScore};
use crate::error::{Result, StorageError};
use crate::models::ScoreEntry;
use crate::store::ScoreStore;

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: Vec<ScoreEntry>,
}

#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, all nicknames included
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert(&self, nickname: &str, score: i32) -> Result<ScoreEntry> {
        let mut table = self.table.write().await;
        table.next_id = table
            .next_id
            .checked_add(1)
            .ok_or_else(|| StorageError::Unavailable("score id sequence exhausted".into()))?;

        let entry = ScoreEntry {
            id: table.next_id,
            nickname: nickname.to_string(),
            score,
            recorded_at: Utc::now(),
        };
        table.rows.push(entry.clone());

        Ok(entry)
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<RankedScore>> {
        let table = self.table.read().await;

        let mut best: HashMap<&str, i32> = HashMap::new();
        for row in &table.rows {
            best.entry(row.nickname.as_str())
                .and_modify(|score| *score = (*score).max(row.score))
                .or_insert(row.score);
        }

        let mut ranked: Vec<RankedScore> = best
            .into_iter()
            .map(|(nickname, score)| RankedScore {
                nickname: nickname.to_string(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.nickname.cmp(&b.nickname)));
        ranked.truncate(limit);

        Ok(ranked)
    }

    async fn delete_by_nickname(&self, nickname: &str) -> Result<DeletionResult> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.nickname != nickname);
        let deleted = (before - table.rows.len()) as u64;

        if deleted == 0 {
            return Err(StorageError::NotFound(nickname.to_string()));
        }

        Ok(DeletionResult { deleted })
    }
}
