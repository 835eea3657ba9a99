use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::api::handlers::ErrorResponse;
use crate::export::ExportError;
use crate::logic::SubmitError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Submit(SubmitError::MissingFields(_))
            | ApiError::Submit(SubmitError::UnsupportedKind(_)) => StatusCode::BAD_REQUEST,
            ApiError::Submit(SubmitError::UnknownKey(..)) => StatusCode::NOT_FOUND,
            ApiError::Submit(SubmitError::NoEndpoint(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Submit(SubmitError::WriteRejected(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Export(ExportError::UnknownCollection(_)) => StatusCode::NOT_FOUND,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}
