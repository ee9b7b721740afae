use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Request payload for submitting a score
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitScoreRequest {
    #[validate(length(min = 1, message = "Nickname must not be empty"))]
    pub nickname: String,

    pub score: i32,
}

impl SubmitScoreRequest {
    pub fn new(nickname: impl Into<String>, score: i32) -> Self {
        Self {
            nickname: nickname.into(),
            score,
        }
    }
}

/// A nickname together with its best score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RankedScore {
    pub nickname: String,
    pub score: i32,
}

/// Outcome of removing every entry of a nickname
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeletionResult {
    pub deleted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
