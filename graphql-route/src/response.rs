//! Conversion of execution results into HTTP responses

use crate::error::{Result, RouteError};
use async_graphql::{Name, PathSegment, ServerError, Value as GraphQLValue};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};

/// Renders one engine-reported error into the response body
pub type ErrorFormatter = fn(&ServerError) -> Value;

/// GraphQL-formatted error: message, plus locations, path and extensions when set
pub fn default_error_formatter(error: &ServerError) -> Value {
    serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.message }))
}

/// Status for an execution result.
///
/// Errors without any data or path mean the operation never ran (syntax or
/// validation failure) and are a client error. An error carrying a path came
/// from a resolver, so the operation executed.
pub fn status_for(response: &async_graphql::Response) -> StatusCode {
    let executed = response.errors.iter().any(|e| !e.path.is_empty());
    if !response.errors.is_empty() && !executed && matches!(response.data, GraphQLValue::Null) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    }
}

/// Put `null` where a failed field was left out of `data`.
///
/// The engine omits errored fields instead of nulling them. Each error path is
/// followed until the first missing response key, which is set to `null`; an
/// error path into a missing list item is left alone.
pub fn null_errored_fields(response: &mut async_graphql::Response) {
    for error in &response.errors {
        if !matches!(error.path.first(), Some(PathSegment::Field(_))) {
            continue;
        }
        if matches!(response.data, GraphQLValue::Null) {
            response.data = GraphQLValue::Object(Default::default());
        }

        let mut node = &mut response.data;
        for segment in &error.path {
            match (segment, node) {
                (PathSegment::Field(key), GraphQLValue::Object(fields)) => {
                    let key = Name::new(key);
                    if !fields.contains_key(&key) {
                        fields.insert(key, GraphQLValue::Null);
                        break;
                    }
                    match fields.get_mut(&key) {
                        Some(child) => node = child,
                        None => break,
                    }
                }
                (PathSegment::Index(index), GraphQLValue::List(items)) => {
                    match items.get_mut(*index) {
                        Some(item) => node = item,
                        None => break,
                    }
                }
                _ => break,
            }
        }
    }
}

/// Build the JSON body: `data` unless it is null next to errors, `errors` when
/// any were reported, `extensions` when any were set
pub fn response_body(
    mut response: async_graphql::Response,
    formatter: ErrorFormatter,
) -> Result<Value> {
    null_errored_fields(&mut response);
    let mut body = Map::new();
    let has_errors = !response.errors.is_empty();

    if !has_errors || !matches!(response.data, GraphQLValue::Null) {
        let data = response.data.into_json().map_err(|e| {
            tracing::error!(error = %e, "failed to serialize GraphQL data");
            RouteError::Internal
        })?;
        body.insert("data".to_string(), data);
    }

    if has_errors {
        let errors = response.errors.iter().map(formatter).collect();
        body.insert("errors".to_string(), Value::Array(errors));
    }

    if !response.extensions.is_empty() {
        let extensions = serde_json::to_value(&response.extensions).map_err(|e| {
            tracing::error!(error = %e, "failed to serialize GraphQL extensions");
            RouteError::Internal
        })?;
        body.insert("extensions".to_string(), extensions);
    }

    Ok(Value::Object(body))
}

/// Full HTTP response for an execution result, including headers set by
/// resolvers
pub fn into_http_response(
    mut response: async_graphql::Response,
    formatter: ErrorFormatter,
) -> Result<Response> {
    null_errored_fields(&mut response);
    let status = status_for(&response);
    let headers = std::mem::take(&mut response.http_headers);
    let body = response_body(response, formatter)?;

    let mut http_response = (status, Json(body)).into_response();
    http_response.headers_mut().extend(headers);
    Ok(http_response)
}
