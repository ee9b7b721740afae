use std::sync::Arc;

use validator::Validate;

use crate::dto::score::{DeletionResult, RankedScore, SubmitScoreRequest};
use crate::error::Result;
use crate::models::ScoreEntry;
use crate::store::ScoreStore;

/// Number of nicknames shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Submit, rank and delete scores against a [`ScoreStore`].
///
/// Stateless apart from the store handle, so clones can be shared freely
/// between request handlers.
#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn ScoreStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    /// Make sure the backing relation exists. Safe to call on every start.
    pub async fn initialize(&self) -> Result<()> {
        self.store.ensure_schema().await
    }

    /// Validate and append one score entry. Invalid input never reaches the
    /// store.
    pub async fn submit_score(&self, request: &SubmitScoreRequest) -> Result<ScoreEntry> {
        request.validate()?;

        self.store.insert(&request.nickname, request.score).await
    }

    /// Best score per nickname, highest first, at most [`LEADERBOARD_SIZE`]
    /// entries.
    pub async fn list_top_scores(&self) -> Result<Vec<RankedScore>> {
        self.store.top_scores(LEADERBOARD_SIZE).await
    }

    pub async fn delete_scores_by_nickname(&self, nickname: &str) -> Result<DeletionResult> {
        self.store.delete_by_nickname(nickname).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::error::StorageError;
    use crate::memory::MemoryStore;

    struct UnreachableStore;

    #[async_trait]
    impl ScoreStore for UnreachableStore {
        async fn ensure_schema(&self) -> Result<()> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn insert(&self, _nickname: &str, _score: i32) -> Result<ScoreEntry> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn top_scores(&self, _limit: usize) -> Result<Vec<RankedScore>> {
            Err(StorageError::Unavailable("down".into()))
        }

        async fn delete_by_nickname(&self, _nickname: &str) -> Result<DeletionResult> {
            Err(StorageError::Unavailable("down".into()))
        }
    }

    fn service() -> (LeaderboardService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LeaderboardService::new(store.clone()), store)
    }

    async fn submit(service: &LeaderboardService, nickname: &str, score: i32) {
        service
            .submit_score(&SubmitScoreRequest::new(nickname, score))
            .await
            .unwrap();
    }

    fn ranked(nickname: &str, score: i32) -> RankedScore {
        RankedScore {
            nickname: nickname.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_best_score_per_nickname() {
        let (service, _) = service();
        for (nickname, score) in [
            ("Alice", 100),
            ("Bob", 150),
            ("Alice", 120),
            ("Charlie", 80),
            ("Bob", 180),
        ] {
            submit(&service, nickname, score).await;
        }

        let top = service.list_top_scores().await.unwrap();
        assert_eq!(
            top,
            vec![ranked("Bob", 180), ranked("Alice", 120), ranked("Charlie", 80)]
        );
    }

    #[tokio::test]
    async fn test_lower_later_score_does_not_replace_best() {
        let (service, _) = service();
        submit(&service, "Alice", 300).await;
        submit(&service, "Alice", 5).await;

        let top = service.list_top_scores().await.unwrap();
        assert_eq!(top, vec![ranked("Alice", 300)]);
    }

    #[tokio::test]
    async fn test_list_empty_when_no_entries() {
        let (service, _) = service();
        assert!(service.list_top_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_truncated_and_non_increasing() {
        let (service, _) = service();
        for i in 0..25 {
            submit(&service, &format!("player{i:02}"), (i * 7) % 11).await;
        }

        let top = service.list_top_scores().await.unwrap();
        assert_eq!(top.len(), LEADERBOARD_SIZE);
        assert!(top.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[tokio::test]
    async fn test_negative_scores_accepted() {
        let (service, _) = service();
        submit(&service, "Unlucky", -40).await;

        let top = service.list_top_scores().await.unwrap();
        assert_eq!(top, vec![ranked("Unlucky", -40)]);
    }

    #[tokio::test]
    async fn test_delete_removes_every_entry() {
        let (service, store) = service();
        submit(&service, "Alice", 100).await;
        submit(&service, "Alice", 120).await;
        submit(&service, "Bob", 90).await;

        let result = service.delete_scores_by_nickname("Alice").await.unwrap();
        assert_eq!(result.deleted, 2);
        assert_eq!(store.len().await, 1);

        let top = service.list_top_scores().await.unwrap();
        assert!(top.iter().all(|entry| entry.nickname != "Alice"));

        let again = service.delete_scores_by_nickname("Alice").await;
        assert!(matches!(again, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_nickname_leaves_table_untouched() {
        let (service, store) = service();
        submit(&service, "Alice", 100).await;

        let result = service
            .delete_scores_by_nickname("NonExistentNickname")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_nickname_rejected_without_write() {
        let (service, store) = service();

        let result = service
            .submit_score(&SubmitScoreRequest::new("", 10))
            .await;
        assert!(matches!(result, Err(StorageError::Validation(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (service, _) = service();
        service.initialize().await.unwrap();
        service.initialize().await.unwrap();
    }

    #[tokio::test]
    async fn test_initialize_reports_unreachable_store() {
        let service = LeaderboardService::new(Arc::new(UnreachableStore));

        let result = service.initialize().await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));

        // The service stays usable; later calls surface the same failure.
        let listed = service.list_top_scores().await;
        assert!(matches!(listed, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_submission_checked_before_store() {
        let service = LeaderboardService::new(Arc::new(UnreachableStore));

        let result = service
            .submit_score(&SubmitScoreRequest::new("", 10))
            .await;
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
