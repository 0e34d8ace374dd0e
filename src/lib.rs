pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod presentation;
pub mod redis;
pub mod services;
pub mod store;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::ActionTokens,
    config::Config,
    error::Result,
    redis::RedisClient,
    services::{
        settings_service::SettingsHandle, vote_guard::VoteGuard, vote_service::VoteService,
    },
    store::{ContentDirectory, SettingsStore, VoteStore},
};

#[derive(Clone)]
pub struct AppState {
    pub votes: VoteService,
    pub store: Arc<dyn VoteStore>,
    pub directory: Arc<dyn ContentDirectory>,
    pub settings: SettingsHandle,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services together. Settings are loaded here, once.
    pub async fn build(
        config: Config,
        store: Arc<dyn VoteStore>,
        directory: Arc<dyn ContentDirectory>,
        settings_store: Arc<dyn SettingsStore>,
        redis: Option<Arc<RedisClient>>,
    ) -> Result<Self> {
        let settings = SettingsHandle::load(settings_store).await?;

        let mut votes = VoteService::new(
            store.clone(),
            directory.clone(),
            VoteGuard::new(&config.app_secret),
            ActionTokens::new(&config.app_secret, config.nonce_ttl_hours),
            settings.clone(),
        );
        if let Some(redis) = redis {
            votes = votes.with_rate_limit(redis, config.vote_rate_limit);
        }

        Ok(Self {
            votes,
            store,
            directory,
            settings,
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::widget::health))
        .route("/widget/{item_id}", get(handlers::widget::widget))
        .route(
            "/assets/like-or-bad.js",
            get(handlers::widget::client_script),
        )
        .route("/api/votes", post(handlers::votes::submit_vote))
        .route("/api/votes/{item_id}", get(handlers::votes::get_counters));

    // Admin routes (bearer token)
    let admin_routes = Router::new()
        .route("/admin/votes", get(handlers::admin::list_votes))
        .route("/admin/votes/reset", post(handlers::admin::reset_items))
        .route(
            "/admin/votes/{item_id}/reset",
            post(handlers::admin::reset_item),
        )
        .route(
            "/admin/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
