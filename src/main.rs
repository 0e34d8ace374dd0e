use like_or_bad::config::Config;
use like_or_bad::database::{create_pool, run_migrations};
use like_or_bad::redis::RedisClient;
use like_or_bad::store::{
    ContentDirectory, MemoryContentDirectory, MemorySettingsStore, MemoryVoteStore,
    PgContentDirectory, PgSettingsStore, PgVoteStore, SettingsStore, VoteStore,
};
use like_or_bad::{AppState, create_app};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "like_or_bad=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Storage: Postgres when configured, otherwise process memory
    let (store, directory, settings_store): (
        Arc<dyn VoteStore>,
        Arc<dyn ContentDirectory>,
        Arc<dyn SettingsStore>,
    ) = match &config.database_url {
        Some(database_url) => {
            let db = create_pool(database_url).await?;
            tracing::info!("Database connection pool created");

            run_migrations(&db).await?;
            tracing::info!("Database migrations completed");

            (
                Arc::new(PgVoteStore::new(db.clone())),
                Arc::new(PgContentDirectory::new(db.clone())),
                Arc::new(PgSettingsStore::new(db)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, votes are kept in memory only");
            (
                Arc::new(MemoryVoteStore::new()),
                Arc::new(MemoryContentDirectory::new()),
                Arc::new(MemorySettingsStore::new()),
            )
        }
    };

    // Redis is only needed for the vote rate limit
    let redis = match &config.redis_url {
        Some(redis_url) if config.vote_rate_limit > 0 => {
            let redis = RedisClient::new(redis_url).await?;
            redis.ping().await?;
            tracing::info!(
                limit = config.vote_rate_limit,
                "Redis client created, vote rate limit enabled"
            );
            Some(Arc::new(redis))
        }
        _ => None,
    };

    let (host, port) = (config.host.clone(), config.port);

    // Create application state
    let state = AppState::build(config, store, directory, settings_store, redis).await?;

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Server listening on {}:{}", host, port);

    // Start server
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
