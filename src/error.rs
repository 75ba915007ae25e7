//! Failure taxonomy for the gateway and its mapping onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Every way a `/find_config` request can fail.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A request field violates its constraint.
    #[error("{field} {constraint}")]
    Validation {
        field: &'static str,
        constraint: String,
    },

    /// The body could not be decoded into a request at all.
    #[error(transparent)]
    MalformedBody(#[from] JsonRejection),

    /// The optimizer binary is missing or could not be spawned.
    #[error("failed to spawn optimizer {}: {source}", .path.display())]
    ExecutableNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The optimizer ran and reported failure.
    #[error("{message}")]
    ProcessExit { code: Option<i32>, message: String },

    /// The optimizer exited cleanly but its stdout is not JSON.
    #[error("optimizer output is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The optimizer succeeded but its stdout went past the capture limit.
    #[error("optimizer output exceeded {limit} bytes")]
    OutputTooLarge { limit: u64 },

    /// The optimizer outlived its time budget and was killed.
    #[error("optimizer did not finish within {0:?}")]
    Timeout(Duration),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    pub fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        Self::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    /// Status, machine-readable code and caller-facing message for this error.
    ///
    /// Spawn errors and raw optimizer output stay in the logs; of the
    /// optimizer's output only its stderr reaches the caller.
    pub fn status_and_message(&self) -> (StatusCode, &'static str, String) {
        match self {
            GatewayError::Validation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            GatewayError::MalformedBody(rejection) => {
                (rejection.status(), "MALFORMED_BODY", rejection.body_text())
            }
            GatewayError::ExecutableNotFound { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXECUTABLE_NOT_FOUND",
                "optimizer executable not found on the server".to_string(),
            ),
            GatewayError::ProcessExit { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OPTIMIZER_FAILED",
                message.clone(),
            ),
            GatewayError::Parse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PARSE_ERROR",
                "could not parse optimizer result".to_string(),
            ),
            GatewayError::OutputTooLarge { limit } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OUTPUT_TOO_LARGE",
                format!("optimizer result exceeded the {limit} byte limit"),
            ),
            GatewayError::Timeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "calculation timed out".to_string(),
            ),
            GatewayError::Unexpected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "an unexpected server error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "Request failed");
        } else {
            tracing::warn!(error = %self, code, "Request rejected");
        }

        let body = json!({
            "detail": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Failures that stop the server from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid CORS origin '{origin}': {source}")]
    InvalidCorsOrigin {
        origin: String,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn error_to_response(err: GatewayError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_is_a_client_error_naming_the_field() {
        let (status, json) =
            error_to_response(GatewayError::validation("branches", "must be greater than 0")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["detail"], "branches must be greater than 0");
    }

    #[tokio::test]
    async fn missing_executable_hides_the_path() {
        let err = GatewayError::ExecutableNotFound {
            path: PathBuf::from("/opt/secret/optimizer"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };

        let (status, json) = error_to_response(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "EXECUTABLE_NOT_FOUND");
        assert!(!json["detail"].as_str().unwrap().contains("/opt/secret"));
    }

    #[tokio::test]
    async fn process_exit_surfaces_the_message_verbatim() {
        let err = GatewayError::ProcessExit {
            code: Some(1),
            message: "no solution found".into(),
        };

        let (status, json) = error_to_response(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "no solution found");
    }

    #[tokio::test]
    async fn parse_error_does_not_echo_output() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        let (status, json) = error_to_response(GatewayError::Parse(source)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "PARSE_ERROR");
        assert_eq!(json["detail"], "could not parse optimizer result");
    }

    #[tokio::test]
    async fn oversized_output_has_its_own_code() {
        let (status, json) =
            error_to_response(GatewayError::OutputTooLarge { limit: 10 * 1024 * 1024 }).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "OUTPUT_TOO_LARGE");
        assert_eq!(json["detail"], "optimizer result exceeded the 10485760 byte limit");
    }

    #[tokio::test]
    async fn timeout_is_a_gateway_timeout() {
        let (status, json) =
            error_to_response(GatewayError::Timeout(Duration::from_secs(120))).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(json["detail"], "calculation timed out");
    }

    #[tokio::test]
    async fn unexpected_is_sanitized() {
        let (status, json) =
            error_to_response(GatewayError::Unexpected("join handle panicked".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["detail"], "an unexpected server error occurred");
    }
}
