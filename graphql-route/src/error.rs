//! Error types for the GraphQL route

use axum::{
    Json,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Result type alias using [`RouteError`]
pub type Result<T> = std::result::Result<T, RouteError>;

/// Methods the route answers to, advertised on 405 responses
pub const ALLOWED_METHODS: &str = "GET, HEAD, POST";

/// Failures raised by the adapter itself, before or around execution.
///
/// Errors reported by the GraphQL engine are not represented here; they are
/// passed through in the response body.
#[derive(Error, Debug)]
pub enum RouteError {
    /// No operation string, or an empty one
    #[error("No GraphQL query found in the request")]
    MissingQuery,

    /// Body is not valid JSON or not a JSON object
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// `variables` is not a JSON object
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),

    /// URL query string cannot be decoded
    #[error("Invalid query string: {0}")]
    InvalidQueryString(String),

    /// Form-encoded body cannot be decoded
    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    /// Raw body cannot be read as UTF-8 text
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// POST with a content type the route does not understand
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Verb other than GET, HEAD or POST
    #[error("Method {0} is not allowed")]
    MethodNotAllowed(Method),

    /// Mutation sent with a safe method (GET or HEAD)
    #[error("Mutations can only be sent with POST, not {0}")]
    MutationNotAllowed(Method),

    /// Execution failed outside the engine's error reporting
    #[error("Internal server error")]
    Internal,
}

impl RouteError {
    /// Create an invalid variables error
    pub fn invalid_variables(msg: impl Into<String>) -> Self {
        Self::InvalidVariables(msg.into())
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) | Self::MutationNotAllowed(_) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "errors": [{ "message": self.to_string() }]
        }));

        let allow = match self {
            Self::MethodNotAllowed(_) => Some(ALLOWED_METHODS),
            Self::MutationNotAllowed(_) => Some("POST"),
            _ => None,
        };

        let mut response = (status, body).into_response();
        if let Some(allow) = allow {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}
