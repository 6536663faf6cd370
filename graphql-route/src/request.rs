//! Extraction of GraphQL parameters from HTTP requests

use crate::error::{Result, RouteError};
use async_graphql::Variables;
use async_graphql::parser::{
    parse_query,
    types::{DocumentOperations, OperationType},
};
use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request},
    http::{HeaderMap, Uri, header},
};
use serde::Deserialize;
use serde_json::Value;

/// Parameters of a single GraphQL operation as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GraphQLParams {
    /// Operation string
    #[serde(default)]
    pub query: Option<String>,
    /// Variables, either a JSON object or a JSON-encoded string of one
    #[serde(default)]
    pub variables: Option<Value>,
    /// Operation to run when the document holds several
    #[serde(default, rename = "operationName")]
    pub operation_name: Option<String>,
}

/// URL query strings and form bodies carry every field as text
#[derive(Debug, Default, Deserialize)]
struct EncodedParams {
    query: Option<String>,
    variables: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
}

impl From<EncodedParams> for GraphQLParams {
    fn from(params: EncodedParams) -> Self {
        Self {
            query: params.query,
            variables: params.variables.map(Value::String),
            operation_name: params.operation_name,
        }
    }
}

/// Body encodings understood on POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Json,
    GraphQL,
    Form,
    Other(String),
    Missing,
}

impl MediaType {
    /// Classify a request by its `Content-Type` header, ignoring parameters
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(value) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        else {
            return Self::Missing;
        };

        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "" => Self::Missing,
            "application/json" => Self::Json,
            "application/graphql" => Self::GraphQL,
            "application/x-www-form-urlencoded" => Self::Form,
            other if other.starts_with("application/") && other.ends_with("+json") => Self::Json,
            other => Self::Other(other.to_string()),
        }
    }
}

impl GraphQLParams {
    /// Read `query`, `variables` and `operationName` from the URL query string
    pub fn from_uri(uri: &Uri) -> Result<Self> {
        let Query(params) = Query::<EncodedParams>::try_from_uri(uri)
            .map_err(|rejection| RouteError::InvalidQueryString(rejection.body_text()))?;
        Ok(params.into())
    }

    /// Read the parameters of a POST request according to its content type
    pub async fn from_body(request: Request) -> Result<Self> {
        match MediaType::from_headers(request.headers()) {
            MediaType::Json => {
                let Json(params) = Json::<GraphQLParams>::from_request(request, &())
                    .await
                    .map_err(|rejection| RouteError::InvalidJson(rejection.body_text()))?;
                Ok(params)
            }
            MediaType::Form => {
                let Form(params) = Form::<EncodedParams>::from_request(request, &())
                    .await
                    .map_err(|rejection| RouteError::InvalidForm(rejection.body_text()))?;
                Ok(params.into())
            }
            MediaType::GraphQL => {
                let from_url = Self::from_uri(request.uri())?;
                let body = String::from_request(request, &())
                    .await
                    .map_err(|rejection| RouteError::InvalidBody(rejection.body_text()))?;
                Ok(Self {
                    query: Some(body),
                    ..from_url
                })
            }
            media_type => {
                // Clients that put everything in the URL may omit the content type
                let from_url = Self::from_uri(request.uri())?;
                if from_url.query.is_some() {
                    return Ok(from_url);
                }
                Err(RouteError::UnsupportedMediaType(match media_type {
                    MediaType::Other(essence) => essence,
                    _ => "missing".to_string(),
                }))
            }
        }
    }

    /// Whether a non-blank operation string was supplied
    pub fn has_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.trim().is_empty())
    }

    /// Whether the selected operation is a mutation.
    ///
    /// A query that does not parse, or names no operation it contains, is not
    /// a mutation here; the engine reports those itself.
    pub fn is_mutation(&self) -> bool {
        let Some(document) = self.query.as_deref().and_then(|q| parse_query(q).ok()) else {
            return false;
        };
        let name = self.operation_name.as_deref().filter(|n| !n.is_empty());

        let operation = match &document.operations {
            DocumentOperations::Single(operation) => Some(operation),
            DocumentOperations::Multiple(operations) => match name {
                Some(name) => operations
                    .iter()
                    .find(|(key, _)| key.as_str() == name)
                    .map(|(_, operation)| operation),
                None if operations.len() == 1 => operations.values().next(),
                None => None,
            },
        };

        operation.is_some_and(|operation| operation.node.ty == OperationType::Mutation)
    }

    /// Build the engine request, rejecting a missing operation string
    pub fn into_request(self) -> Result<async_graphql::Request> {
        let query = self
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or(RouteError::MissingQuery)?;

        let mut request = async_graphql::Request::new(query);

        if let Some(name) = self.operation_name.filter(|n| !n.is_empty()) {
            request = request.operation_name(name);
        }

        if let Some(variables) = normalize_variables(self.variables)? {
            request = request.variables(Variables::from_json(variables));
        }

        Ok(request)
    }
}

/// Accept an object, `null`, or a string holding either
fn normalize_variables(variables: Option<Value>) -> Result<Option<Value>> {
    match variables {
        None | Some(Value::Null) => Ok(None),
        Some(object @ Value::Object(_)) => Ok(Some(object)),
        Some(Value::String(encoded)) => {
            if encoded.trim().is_empty() {
                return Ok(None);
            }
            let decoded: Value = serde_json::from_str(&encoded)
                .map_err(|e| RouteError::invalid_variables(e.to_string()))?;
            match decoded {
                Value::String(_) => Err(RouteError::invalid_variables(
                    "expected a JSON object, got a string",
                )),
                other => normalize_variables(Some(other)),
            }
        }
        Some(_) => Err(RouteError::invalid_variables("expected a JSON object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn headers_with_content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_media_type_ignores_parameters_and_case() {
        let headers = headers_with_content_type("Application/JSON; charset=utf-8");
        assert_eq!(MediaType::from_headers(&headers), MediaType::Json);

        let headers = headers_with_content_type("application/graphql");
        assert_eq!(MediaType::from_headers(&headers), MediaType::GraphQL);

        let headers = headers_with_content_type("application/x-www-form-urlencoded");
        assert_eq!(MediaType::from_headers(&headers), MediaType::Form);

        let headers = headers_with_content_type("application/graphql-response+json");
        assert_eq!(MediaType::from_headers(&headers), MediaType::Json);

        let headers = headers_with_content_type("text/plain");
        assert_eq!(
            MediaType::from_headers(&headers),
            MediaType::Other("text/plain".to_string())
        );

        assert_eq!(MediaType::from_headers(&HeaderMap::new()), MediaType::Missing);
    }

    #[test]
    fn test_from_uri_decodes_all_fields() {
        let uri: Uri = "/graphql?query=%7Bme%7D&variables=%7B%22id%22%3A1%7D&operationName=Me"
            .parse()
            .unwrap();
        let params = GraphQLParams::from_uri(&uri).unwrap();

        assert_eq!(params.query.as_deref(), Some("{me}"));
        assert_eq!(params.variables, Some(Value::String(r#"{"id":1}"#.to_string())));
        assert_eq!(params.operation_name.as_deref(), Some("Me"));
    }

    #[test]
    fn test_from_uri_without_query_string() {
        let uri: Uri = "/graphql".parse().unwrap();
        let params = GraphQLParams::from_uri(&uri).unwrap();
        assert_eq!(params, GraphQLParams::default());
        assert!(!params.has_query());
    }

    #[test]
    fn test_blank_query_is_missing() {
        let params = GraphQLParams {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.into_request(),
            Err(RouteError::MissingQuery)
        ));
        assert!(matches!(
            GraphQLParams::default().into_request(),
            Err(RouteError::MissingQuery)
        ));
    }

    #[test]
    fn test_into_request_carries_operation_name_and_variables() {
        let params = GraphQLParams {
            query: Some("query A { a } query B { b }".to_string()),
            variables: Some(json!({ "x": 1 })),
            operation_name: Some("B".to_string()),
        };
        let request = params.into_request().unwrap();

        assert_eq!(request.operation_name.as_deref(), Some("B"));
        assert_eq!(request.variables.into_value().into_json().unwrap(), json!({ "x": 1 }));
    }

    #[test]
    fn test_empty_operation_name_is_ignored() {
        let params = GraphQLParams {
            query: Some("{ a }".to_string()),
            operation_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(params.into_request().unwrap().operation_name, None);
    }

    #[test]
    fn test_is_mutation_follows_the_selected_operation() {
        let params = |query: &str, operation_name: Option<&str>| GraphQLParams {
            query: Some(query.to_string()),
            variables: None,
            operation_name: operation_name.map(str::to_string),
        };

        assert!(params("mutation { bump }", None).is_mutation());
        assert!(!params("{ accounts }", None).is_mutation());
        assert!(!params("query Q { accounts }", None).is_mutation());

        let both = "query Read { accounts } mutation Write { bump }";
        assert!(params(both, Some("Write")).is_mutation());
        assert!(!params(both, Some("Read")).is_mutation());
        assert!(!params(both, None).is_mutation());
        assert!(!params(both, Some("Missing")).is_mutation());

        assert!(!params("mutation {", None).is_mutation());
        assert!(!GraphQLParams::default().is_mutation());
    }

    #[test]
    fn test_normalize_variables() {
        assert_eq!(normalize_variables(None).unwrap(), None);
        assert_eq!(normalize_variables(Some(Value::Null)).unwrap(), None);
        assert_eq!(
            normalize_variables(Some(Value::String(String::new()))).unwrap(),
            None
        );
        assert_eq!(
            normalize_variables(Some(Value::String(r#"{"a":true}"#.to_string()))).unwrap(),
            Some(json!({ "a": true }))
        );
        assert_eq!(
            normalize_variables(Some(Value::String("null".to_string()))).unwrap(),
            None
        );

        assert!(normalize_variables(Some(json!([1, 2]))).is_err());
        assert!(normalize_variables(Some(json!(3))).is_err());
        assert!(normalize_variables(Some(Value::String("{not json".to_string()))).is_err());
        assert!(normalize_variables(Some(Value::String(r#""{}""#.to_string()))).is_err());
    }
}
