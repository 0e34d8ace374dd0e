use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, header::REFERER},
    response::{Json, Redirect},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    auth::AuthUser,
    config::Config,
    error::{AppError, Result},
    services::{
        projection_service::{self, ItemCountersRow, ListQuery},
        reset_service,
    },
};

pub const RESET_QUERY_KEY: &str = "votes_reset";
const ADMIN_LIST_PATH: &str = "/admin/votes";

#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub votes_reset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AdminNotice {
    pub kind: &'static str,
    pub dismissible: bool,
    pub message: String,
}

impl AdminNotice {
    pub fn reset(count: i64) -> Option<Self> {
        (count >= 1).then(|| Self {
            kind: "success",
            dismissible: true,
            message: format!("Reset vote counts for {} item(s).", count),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub items: Vec<ItemCountersRow>,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<AdminNotice>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResetRequest {
    pub item_ids: Vec<i64>,
}

pub async fn list_votes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, AppError>,
    WithRejection(Query(notice), _): WithRejection<Query<NoticeQuery>, AppError>,
) -> Result<Json<AdminListResponse>> {
    if !auth_user.can_list() {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }

    let items =
        projection_service::list_item_counters(state.directory.as_ref(), state.store.as_ref(), &query)
            .await?;

    Ok(Json(AdminListResponse {
        items,
        page: query.page(),
        limit: query.limit(),
        notice: notice.votes_reset.and_then(AdminNotice::reset),
    }))
}

pub async fn reset_item(
    State(state): State<AppState>,
    auth_user: AuthUser,
    headers: HeaderMap,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Redirect> {
    reset_service::reset_single(
        state.directory.as_ref(),
        state.store.as_ref(),
        &auth_user,
        item_id,
    )
    .await?;

    Ok(redirect_back(&headers, &state.config, 1))
}

pub async fn reset_items(
    State(state): State<AppState>,
    auth_user: AuthUser,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<BulkResetRequest>, AppError>,
) -> Result<Redirect> {
    let count = reset_service::reset_bulk(
        state.directory.as_ref(),
        state.store.as_ref(),
        &auth_user,
        &payload.item_ids,
    )
    .await?;

    Ok(redirect_back(&headers, &state.config, count))
}

fn redirect_back(headers: &HeaderMap, config: &Config, count: usize) -> Redirect {
    let base = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|referer| safe_redirect_target(referer, &config.allowed_origins))
        .unwrap_or_else(|| ADMIN_LIST_PATH.to_string());

    Redirect::to(&add_query_arg(&base, RESET_QUERY_KEY, &count.to_string()))
}

/// Keeps redirects on this site: relative paths, or absolute URLs under an
/// allowed origin (reduced to their path).
pub fn safe_redirect_target(referer: &str, allowed_origins: &[String]) -> Option<String> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer.to_string());
    }

    allowed_origins.iter().find_map(|origin| {
        let rest = referer.strip_prefix(origin.trim_end_matches('/'))?;
        match rest {
            "" => Some("/".to_string()),
            r if r.starts_with('/') && !r.starts_with("//") => Some(r.to_string()),
            r if r.starts_with('?') => Some(format!("/{}", r)),
            _ => None,
        }
    })
}

/// Sets `key=value` in the query string, replacing any previous value.
pub fn add_query_arg(url: &str, key: &str, value: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let (path, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(key))
        .map(str::to_string)
        .collect();
    pairs.push(format!("{}={}", key, value));

    let mut out = format!("{}?{}", path, pairs.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
