pub mod matches;
pub mod overlay;

use crate::api::ApiState;
use axum::Router;
use axum::routing::{get, post, put};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/overlay", get(overlay::fetch))
        .route("/overlay/regions/{region}/edit", post(overlay::begin_edit))
        .route("/overlay/regions/{region}/draft", put(overlay::set_draft))
        .route("/overlay/regions/{region}/save", post(overlay::save))
        .route("/overlay/regions/{region}/cancel", post(overlay::cancel))
        .route("/overlay/regions/{region}/keys", post(overlay::handle_key))
        .route("/overlay/players/{side}/score", post(overlay::adjust_score))
        .route("/overlay/match-score/{side}", post(overlay::adjust_match_score))
        .route("/overlay/match-score/draft/{side}", post(overlay::step_draft_score))
        .route("/overlay/camera/retry", post(overlay::retry_camera))
        .route("/matches", post(matches::create))
        .route("/matches/{match_id}", get(matches::fetch_one))
}
