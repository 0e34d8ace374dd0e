use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, Result},
    handlers::ClientAddr,
    models::{VoteRequest, VoteResponse},
    services::{vote_guard::marker_cookie_name, vote_service::VoteContext},
};

pub async fn submit_vote(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<VoteRequest>, AppError>,
) -> Result<(CookieJar, Json<VoteResponse>)> {
    let cookie_name = marker_cookie_name(payload.item_id);
    let marker = jar.get(&cookie_name).map(|c| c.value().to_string());

    let outcome = state
        .votes
        .submit_vote(
            payload.item_id,
            &payload.kind,
            VoteContext {
                token: &payload.anti_forgery_token,
                marker: marker.as_deref(),
                client: client.as_deref(),
                now: Utc::now(),
            },
        )
        .await?;

    let cookie = Cookie::build((cookie_name, outcome.marker_token))
        .path(state.config.cookie_path.clone())
        .max_age(time::Duration::days(outcome.cookie_days as i64))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(outcome.counters.into())))
}

pub async fn get_counters(
    State(state): State<AppState>,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<VoteResponse>> {
    let counters = state.votes.counters(item_id).await?;
    Ok(Json(counters.into()))
}
