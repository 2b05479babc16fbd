use crate::api::ApiState;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::matches::Side;
use crate::models::overlay::{CommitResponse, DeltaArgs, Draft, KeyArgs, OverlayView, Region};
use crate::usecases::match_state::PendingCommit;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

pub async fn fetch(State(state): State<ApiState>) -> ServiceResponse<OverlayView> {
    let overlay = state.scoreboard.lock().await.view();
    Ok(Json(with_camera(&state, overlay).await))
}

pub async fn begin_edit(
    State(state): State<ApiState>,
    Path(region): Path<Region>,
) -> ServiceResponse<OverlayView> {
    let overlay = {
        let mut scoreboard = state.scoreboard.lock().await;
        scoreboard.begin_edit(region);
        scoreboard.view()
    };
    Ok(Json(with_camera(&state, overlay).await))
}

pub async fn set_draft(
    State(state): State<ApiState>,
    Path(region): Path<Region>,
    draft: Result<Json<Draft>, JsonRejection>,
) -> ServiceResponse<OverlayView> {
    let Json(draft) = draft.map_err(|_| AppError::DecodingRequestFailed)?;
    let overlay = {
        let mut scoreboard = state.scoreboard.lock().await;
        scoreboard.set_draft(region, draft)?;
        scoreboard.view()
    };
    Ok(Json(with_camera(&state, overlay).await))
}

pub async fn save(
    State(state): State<ApiState>,
    Path(region): Path<Region>,
) -> ServiceResponse<CommitResponse> {
    let (pending, overlay) = {
        let mut scoreboard = state.scoreboard.lock().await;
        let pending = scoreboard.save(region);
        (pending, scoreboard.view())
    };
    commit_response(&state, pending, overlay).await
}

pub async fn cancel(
    State(state): State<ApiState>,
    Path(region): Path<Region>,
) -> ServiceResponse<OverlayView> {
    let overlay = {
        let mut scoreboard = state.scoreboard.lock().await;
        scoreboard.cancel(region);
        scoreboard.view()
    };
    Ok(Json(with_camera(&state, overlay).await))
}

pub async fn handle_key(
    State(state): State<ApiState>,
    Path(region): Path<Region>,
    args: Result<Json<KeyArgs>, JsonRejection>,
) -> ServiceResponse<CommitResponse> {
    let Json(args) = args.map_err(|_| AppError::DecodingRequestFailed)?;
    let (pending, overlay) = {
        let mut scoreboard = state.scoreboard.lock().await;
        let pending = scoreboard.handle_key(region, args.key);
        (pending, scoreboard.view())
    };
    commit_response(&state, pending, overlay).await
}

pub async fn adjust_score(
    State(state): State<ApiState>,
    Path(side): Path<Side>,
    args: Result<Json<DeltaArgs>, JsonRejection>,
) -> ServiceResponse<CommitResponse> {
    let Json(args) = args.map_err(|_| AppError::DecodingRequestFailed)?;
    let (pending, overlay) = {
        let mut scoreboard = state.scoreboard.lock().await;
        let pending = scoreboard.adjust_score(side, args.delta);
        (pending, scoreboard.view())
    };
    commit_response(&state, Some(pending), overlay).await
}

pub async fn adjust_match_score(
    State(state): State<ApiState>,
    Path(side): Path<Side>,
    args: Result<Json<DeltaArgs>, JsonRejection>,
) -> ServiceResponse<CommitResponse> {
    let Json(args) = args.map_err(|_| AppError::DecodingRequestFailed)?;
    let (pending, overlay) = {
        let mut scoreboard = state.scoreboard.lock().await;
        let pending = scoreboard.adjust_match_score(side, args.delta);
        (pending, scoreboard.view())
    };
    commit_response(&state, Some(pending), overlay).await
}

pub async fn step_draft_score(
    State(state): State<ApiState>,
    Path(side): Path<Side>,
    args: Result<Json<DeltaArgs>, JsonRejection>,
) -> ServiceResponse<OverlayView> {
    let Json(args) = args.map_err(|_| AppError::DecodingRequestFailed)?;
    let overlay = {
        let mut scoreboard = state.scoreboard.lock().await;
        scoreboard.step_draft_score(side, args.delta)?;
        scoreboard.view()
    };
    Ok(Json(with_camera(&state, overlay).await))
}

/// Reruns camera acquisition with the last parameters. A failure is reported
/// through the camera status, not as an error.
pub async fn retry_camera(State(state): State<ApiState>) -> ServiceResponse<OverlayView> {
    let camera = state.camera.as_ref().ok_or(AppError::CameraNotAttached)?;
    let _ = camera.lock().await.retry().await;
    let overlay = state.scoreboard.lock().await.view();
    Ok(Json(with_camera(&state, overlay).await))
}

// utility

async fn with_camera(state: &ApiState, mut overlay: OverlayView) -> OverlayView {
    if let Some(camera) = &state.camera {
        overlay.camera = Some(camera.lock().await.status().into());
    }
    overlay
}

/// Waits for persistence without holding the scoreboard lock.
async fn commit_response(
    state: &ApiState,
    pending: Option<PendingCommit>,
    overlay: OverlayView,
) -> ServiceResponse<CommitResponse> {
    let outcome = match pending {
        Some(pending) => Some(pending.outcome().await),
        None => None,
    };
    let overlay = with_camera(state, overlay).await;
    Ok(Json(CommitResponse { outcome, overlay }))
}
