use axum::{
    Router,
    routing::{delete, get, post},
};
use storage::LeaderboardService;

use super::handlers::{delete_scores, list_scores, submit_score};

pub fn routes() -> Router<LeaderboardService> {
    Router::new()
        .route("/scores", get(list_scores))
        .route("/score", post(submit_score))
        .route("/score/:nickname", delete(delete_scores))
}
