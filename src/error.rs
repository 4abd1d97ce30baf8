//! Error taxonomy for the `/predict` pipeline

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub const INFERENCE_FAILED: &str = "Failed to get prediction from TensorFlow Serve";
pub const DOWNSTREAM_FAILED: &str = "Failed to forward data to Spring Boot API";

#[derive(Debug, Error)]
pub enum RelayError {
    /// Caller sent a malformed upload
    #[error("{0}")]
    BadRequest(String),

    /// Caller sent no token
    #[error("{0}")]
    Unauthorized(String),

    /// Model server answered with a non-200 status
    #[error("{}: {}", INFERENCE_FAILED, .details)]
    Inference { details: String },

    /// Classification API answered with a non-200 status
    #[error("{}: {}", DOWNSTREAM_FAILED, .details)]
    Downstream { details: String },

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RelayError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            RelayError::Inference { details } => json!({
                "error": INFERENCE_FAILED,
                "details": details,
            }),
            RelayError::Downstream { details } => json!({
                "error": DOWNSTREAM_FAILED,
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: RelayError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_client_errors_carry_plain_message() {
        let (status, body) = body_json(RelayError::bad_request("No file part")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No file part" }));

        let (status, body) = body_json(RelayError::unauthorized("Missing JWT token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Missing JWT token" }));
    }

    #[actix_web::test]
    async fn test_upstream_errors_carry_details() {
        let (status, body) = body_json(RelayError::Inference {
            details: "model unavailable".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INFERENCE_FAILED);
        assert_eq!(body["details"], "model unavailable");

        let (status, body) = body_json(RelayError::Downstream {
            details: "{\"message\":\"expired\"}".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], DOWNSTREAM_FAILED);
        assert_eq!(body["details"], "{\"message\":\"expired\"}");
    }

    #[actix_web::test]
    async fn test_internal_error_has_no_details() {
        let (status, body) = body_json(RelayError::internal("boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "boom" }));
    }
}
