use crate::api::ApiState;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::matches::Match;
use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

pub async fn fetch_one(
    State(state): State<ApiState>,
    Path(match_id): Path<Uuid>,
) -> ServiceResponse<Match> {
    let store = state.store.ok_or(AppError::MatchesBackendDisabled)?;
    Ok(Json(store.fetch_match(match_id).await?))
}

pub async fn create(State(state): State<ApiState>) -> ServiceResponse<Match> {
    let store = state.store.ok_or(AppError::MatchesBackendDisabled)?;
    Ok(Json(store.create_match().await?))
}
