use axum::{extract::State, response::Json};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{VoteSettings, VoteSettingsInput},
};

fn require_manage(auth_user: &AuthUser) -> Result<()> {
    if auth_user.can_manage_settings() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Permission denied".to_string()))
    }
}

pub async fn get_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<VoteSettings>> {
    require_manage(&auth_user)?;
    Ok(Json(state.settings.current().await))
}

pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<VoteSettingsInput>, AppError>,
) -> Result<Json<VoteSettings>> {
    require_manage(&auth_user)?;
    let settings = state.settings.update(payload).await?;
    Ok(Json(settings))
}
