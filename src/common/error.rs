use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    DecodingRequestFailed,

    MatchesNotFound,
    MatchesLoadFailed,
    MatchesBackendDisabled,

    OverlayRegionNotEditing,
    OverlayDraftMismatch,

    CameraNotAttached,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::MatchesNotFound => "matches.not_found",
            AppError::MatchesLoadFailed => "matches.load_failed",
            AppError::MatchesBackendDisabled => "matches.backend_disabled",

            AppError::OverlayRegionNotEditing => "overlay.region_not_editing",
            AppError::OverlayDraftMismatch => "overlay.draft_mismatch",

            AppError::CameraNotAttached => "camera.not_attached",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::MatchesNotFound => "The match could not be found.",
            AppError::MatchesLoadFailed => "Failed to load match data",
            AppError::MatchesBackendDisabled => "No match backend is configured.",

            AppError::OverlayRegionNotEditing => "This region is not being edited.",
            AppError::OverlayDraftMismatch => "The draft does not belong to this region.",

            AppError::CameraNotAttached => "No camera is attached to the overlay.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed | AppError::OverlayDraftMismatch => {
                StatusCode::BAD_REQUEST
            }

            AppError::MatchesNotFound | AppError::CameraNotAttached => StatusCode::NOT_FOUND,

            AppError::OverlayRegionNotEditing => StatusCode::CONFLICT,

            AppError::MatchesBackendDisabled => StatusCode::SERVICE_UNAVAILABLE,

            AppError::Unexpected | AppError::MatchesLoadFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
