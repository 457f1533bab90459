//! Player Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{PlayerItem, PlayerPort};
use crate::domain::playback::PlayheadSample;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, PlayheadRequest, PlayheadResponse, ReloadRequest, SetFlagRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn reload(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReloadRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .coordinator
        .reload(&req.manifest_url, req.automatically_preserves_time_offset_from_live)?;
    Ok(Json(ApiResponse::ok()))
}

/// 宿主上报播放位置，采样时刻取请求到达时间
pub async fn report_playhead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlayheadRequest>,
) -> Result<Json<ApiResponse<PlayheadResponse>>, ApiError> {
    if !req.position.is_finite() || req.position < 0.0 {
        return Err(ApiError::BadRequest(format!(
            "Invalid playhead position: {}",
            req.position
        )));
    }

    state
        .coordinator
        .observe_playhead(PlayheadSample::now(req.position, req.is_playing));

    Ok(Json(ApiResponse::success(PlayheadResponse {
        latest_playhead: state.coordinator.latest_playhead(),
    })))
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Option<PlayerItem>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.coordinator.player().current_item())))
}

pub async fn set_control_focus(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFlagRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.coordinator.set_player_control_focused(req.enabled);
    Ok(Json(ApiResponse::ok()))
}
