use axum::{
    extract::{Path, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{Html, IntoResponse, Json},
};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::VOTE_ACTION,
    error::{AppError, Result},
    presentation::{WidgetState, WidgetView, render_widget},
    services::vote_guard::marker_cookie_name,
};

const CLIENT_SCRIPT: &str = include_str!("../../assets/like-or-bad.js");

pub async fn widget(
    State(state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
    jar: CookieJar,
) -> Result<Html<String>> {
    // Nothing to render for a non-positive id
    if item_id <= 0 {
        return Ok(Html(String::new()));
    }

    let now = Utc::now();
    let settings = state.settings.current().await;
    let counters = state.store.get(item_id).await?;

    // Reflect an existing vote on first paint instead of waiting for the script
    let marker = jar.get(&marker_cookie_name(item_id)).map(|c| c.value().to_string());
    let voted = state
        .votes
        .guard()
        .active_marker(item_id, marker.as_deref(), now)
        .map(|m| m.kind);

    let token = state.votes.tokens().issue(VOTE_ACTION, now)?;
    let endpoint = state.config.vote_endpoint();

    Ok(Html(render_widget(&WidgetView {
        item_id,
        counters,
        state: WidgetState::initial(voted),
        settings: &settings,
        token: &token,
        endpoint: &endpoint,
    })))
}

pub async fn client_script() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        CLIENT_SCRIPT,
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
