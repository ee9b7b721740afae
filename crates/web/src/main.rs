use std::sync::Arc;

use anyhow::Context;
use storage::{Database, LeaderboardService, MemoryStore, ScoreStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod ingest;
mod routes;

use config::{Config, StoreBackend};

#[derive(OpenApi)]
#[openapi(
    paths(
        features::scores::handlers::list_scores,
        features::scores::handlers::submit_score,
        features::scores::handlers::delete_scores,
    ),
    components(
        schemas(
            storage::dto::score::SubmitScoreRequest,
            storage::dto::score::RankedScore,
            storage::dto::score::MessageResponse,
        )
    ),
    tags(
        (name = "scores", description = "Leaderboard endpoints"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store: Arc<dyn ScoreStore> = match (config.backend, config.database_url.as_deref()) {
        (StoreBackend::Postgres, Some(database_url)) => {
            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::connect(database_url, config.pool)
                .context("Failed to initialize database")?;
            Arc::new(db)
        }
        (StoreBackend::Postgres, None) => anyhow::bail!("Cannot load DATABASE_URL env variable"),
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory score store; scores are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let service = LeaderboardService::new(store);

    match service.initialize().await {
        Ok(()) => tracing::info!("Ensured table 'scores' exists"),
        Err(e) => tracing::warn!(
            "Failed to initialize database, requests will fail until it is reachable: {}",
            e
        ),
    }

    if let Some(ingest) = config.ingest.clone() {
        let listener = ingest::bind(ingest.addr)
            .await
            .with_context(|| format!("Failed to bind ingest listener on {}", ingest.addr))?;
        tracing::info!(
            "Accepting TCP scores for '{}' on {}",
            ingest.nickname,
            ingest.addr
        );
        tokio::spawn(ingest::serve(listener, service.clone(), ingest.nickname));
    }

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = routes::router(service)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
