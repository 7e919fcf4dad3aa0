use crate::sources::Domain;
use axum::Json;
use axum::http::StatusCode;
use serde_json::json;
use tracing::error;

/// Failures of the remote data client. A failed fetch is always one of
/// these, never an empty row set.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no endpoint configured for {0}")]
    MissingEndpoint(Domain),
    #[error("invalid endpoint url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("unexpected response body from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl ClientError {
    /// HTTP status returned by the backend, when it got that far.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub upstream_status: Option<u16>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            upstream_status: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        error!("data fetch failed: {err}");
        match err {
            ClientError::MissingEndpoint(_) | ClientError::InvalidUrl { .. } | ClientError::Build(_) => {
                Self::internal(err)
            }
            _ => Self {
                status: StatusCode::BAD_GATEWAY,
                upstream_status: err.upstream_status(),
                message: err.to_string(),
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "error": self.message,
            "upstreamStatus": self.upstream_status,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_failure_maps_to_bad_gateway() {
        let err = ClientError::Status {
            endpoint: "http://backend/appointments".to_string(),
            status: 503,
        };
        let app_err = AppError::from(err);
        assert_eq!(app_err.status, StatusCode::BAD_GATEWAY);
        assert_eq!(app_err.upstream_status, Some(503));
        assert!(app_err.message.contains("HTTP 503"));
    }

    #[test]
    fn missing_endpoint_is_a_server_configuration_error() {
        let app_err = AppError::from(ClientError::MissingEndpoint(Domain::IpdBilling));
        assert_eq!(app_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app_err.upstream_status, None);
        assert_eq!(app_err.message, "no endpoint configured for ipd-billing");
    }
}
