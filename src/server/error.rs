//! Request errors rendered as Kubernetes `Status` objects

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::crd::{CodecError, DispatchError, ValidationError};
use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("DeploymentConfig is invalid: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("name in body {body:?} does not match name in path {path:?}")]
    NameMismatch { body: String, path: String },

    #[error("failed to encode response: {0}")]
    Internal(String),
}

/// Wire form of a failed request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub status: &'static str,
    pub message: String,
    pub reason: &'static str,
    pub code: u16,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Dispatch(_) => StatusCode::NOT_FOUND,
            ApiError::Codec(_) | ApiError::NameMismatch { .. } => StatusCode::BAD_REQUEST,
            ApiError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::AlreadyExists { .. })
            | ApiError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::MissingField(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Dispatch(_) => "NotFound",
            ApiError::Codec(_) | ApiError::NameMismatch { .. } => "BadRequest",
            ApiError::Invalid(_) => "Invalid",
            ApiError::Store(StoreError::AlreadyExists { .. }) => "AlreadyExists",
            ApiError::Store(StoreError::Conflict { .. }) => "Conflict",
            ApiError::Store(StoreError::NotFound { .. }) => "NotFound",
            ApiError::Store(StoreError::MissingField(_)) => "BadRequest",
            ApiError::Internal(_) => "InternalError",
        }
    }

    pub fn to_status(&self) -> Status {
        Status {
            api_version: "v1",
            kind: "Status",
            status: "Failure",
            message: self.to_string(),
            reason: self.reason(),
            code: self.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_status())).into_response()
    }
}
