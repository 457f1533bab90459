//! Session Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ApplicationError, ResolutionHandle, ResolutionOutcome, SessionSnapshot};
use crate::domain::session::LogMessage;
use crate::infrastructure::http::dto::{
    ApiResponse, Empty, ResolutionDto, SetAdPodsRequest, SetCustomHeadersRequest, SetFlagRequest,
    SetMediaUrlRequest, SetMetadataTypeRequest, SetSessionInfoRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 等待解析任务完成
///
/// 解析失败时旧会话保持不变，以 errno 503 返回失败原因
async fn await_resolution(handle: ResolutionHandle) -> Result<ResolutionDto, ApiError> {
    let outcome = handle
        .await
        .map_err(|e| ApplicationError::internal(format!("Resolution task failed: {}", e)))?;

    Ok(match outcome {
        ResolutionOutcome::Applied(descriptor) => ResolutionDto::Applied {
            local_session_id: descriptor.local_session_id().to_string(),
            manifest_url: descriptor.manifest_url().to_string(),
            ad_tracking_metadata_url: descriptor.ad_tracking_metadata_url().to_string(),
        },
        ResolutionOutcome::Superseded => ResolutionDto::Superseded,
        ResolutionOutcome::Failed(failure) => {
            return Err(ApplicationError::from(failure).into());
        }
    })
}

async fn report(handle: Option<ResolutionHandle>, wait: bool) -> Result<ResolutionDto, ApiError> {
    match handle {
        None => Ok(ResolutionDto::Skipped),
        Some(handle) if wait => await_resolution(handle).await,
        Some(_) => Ok(ResolutionDto::Pending),
    }
}

// ============================================================================
// Snapshot
// ============================================================================

pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError> {
    Ok(Json(ApiResponse::success(state.coordinator.state().snapshot())))
}

pub async fn get_logs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LogMessage>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.coordinator.state().log_messages())))
}

// ============================================================================
// Triggers
// ============================================================================

pub async fn set_media_url(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetMediaUrlRequest>,
) -> Result<Json<ApiResponse<ResolutionDto>>, ApiError> {
    let handle = state.coordinator.set_media_url(req.media_url);
    let result = report(handle, req.wait).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn set_init_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFlagRequest>,
) -> Result<Json<ApiResponse<ResolutionDto>>, ApiError> {
    let handle = state.coordinator.set_is_init_request(req.enabled);
    let result = report(handle, false).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn set_metadata_type(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetMetadataTypeRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.coordinator.set_metadata_type(req.metadata_type);
    Ok(Json(ApiResponse::ok()))
}

pub async fn set_live_offset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFlagRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .coordinator
        .set_automatically_preserves_time_offset_from_live(req.enabled);
    Ok(Json(ApiResponse::ok()))
}

pub async fn set_session_info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetSessionInfoRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .coordinator
        .set_session_info(req.manifest_url, req.ad_tracking_metadata_url, req.media_url);
    Ok(Json(ApiResponse::ok()))
}

// ============================================================================
// Pass-through
// ============================================================================

pub async fn set_custom_headers(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCustomHeadersRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.coordinator.set_custom_headers(req.headers);
    Ok(Json(ApiResponse::ok()))
}

pub async fn set_ad_pods(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetAdPodsRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.coordinator.set_ad_pods(req.ad_pods);
    Ok(Json(ApiResponse::ok()))
}

pub async fn set_debug_overlay(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFlagRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.coordinator.set_debug_overlay_visible(req.enabled);
    Ok(Json(ApiResponse::ok()))
}
