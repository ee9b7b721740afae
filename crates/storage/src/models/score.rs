use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One persisted submission. Rows are never updated, only deleted in bulk by
/// nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScoreEntry {
    pub id: i32,
    pub nickname: String,
    pub score: i32,
    pub recorded_at: DateTime<Utc>,
}
