use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use networth_core::errors::{Error as CoreError, ValidationError};
use networth_core::session::AuthError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Core(CoreError::Auth(err))
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Core(CoreError::Validation(err))
    }
}

const STORE_UNAVAILABLE_MESSAGE: &str = "The ledger store is unavailable, please try again";
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<String, String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field_errors = None;
        let (status, message) = match &self {
            ApiError::Core(e) => match e {
                CoreError::Validation(ValidationError::ValidationFailed { fields }) => {
                    field_errors = Some(
                        fields
                            .iter()
                            .map(|(category, err)| (category.key().to_string(), err.to_string()))
                            .collect(),
                    );
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                // Store and internal details stay in the log.
                CoreError::Store(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    STORE_UNAVAILABLE_MESSAGE.to_string(),
                ),
                CoreError::Auth(auth) => {
                    (StatusCode::UNAUTHORIZED, auth.user_message().to_string())
                }
                CoreError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                ),
            },
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
            field_errors,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
