use actix_web::{
    HttpRequest, HttpResponse, ResponseError, error::JsonPayloadError, http::StatusCode,
};

use super::super::helpers::error_chain_fmt;
use crate::{domain::MissingFields, record_store::RecordStoreError};

/// Reasons a submission is turned away before anything is dispatched.
#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Missing required fields")]
    ValidationError(#[source] MissingFields),
    #[error("Missing required fields")]
    MalformedPayload(#[source] JsonPayloadError),
    #[error("Server configuration error")]
    ConfigurationError(#[source] anyhow::Error),
    #[error("Google Sheets not configured")]
    RecordStoreNotConfigured(#[source] RecordStoreError),
}

impl std::fmt::Debug for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubmitError::ValidationError(_) | SubmitError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            SubmitError::ConfigurationError(_) | SubmitError::RecordStoreNotConfigured(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Routes JSON extraction failures through the same 400 as absent fields.
pub fn reject_malformed_json(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    SubmitError::MalformedPayload(err).into()
}
