use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Stats API error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Invalid query parameters or a request the chain cannot answer
    BadRequest(String),
    /// Node returned a JSON-RPC error or an unexpected payload
    RpcError { method: String, message: String },
    /// Node answered with a non-200 status
    UpstreamError { status: StatusCode, message: String },
    /// Internal server error
    InternalError(String),
    /// HTTP request to the node failed
    HttpRequest(reqwest::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::RpcError { method, message } => write!(f, "RPC {} failed: {}", method, message),
            Self::UpstreamError { status, message } => {
                write!(f, "RPC HTTP {}: {}", status.as_u16(), message)
            }
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
            Self::HttpRequest(err) => write!(f, "RPC connection error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RpcError { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HttpRequest(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::BadRequest(_) => "bad_request",
        AppError::RpcError { .. } => "rpc_error",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::InternalError(_) => "internal_error",
        AppError::HttpRequest(_) => "http_request_error",
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequest(err)
    }
}

/// Failure of a single stats API fetch made by the pollers
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not complete
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The API answered with a non-2xx status
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    /// Body was not JSON or lacked the expected field
    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Short label used for logs and metric dimensions
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Parse(_) => "parse",
        }
    }
}
