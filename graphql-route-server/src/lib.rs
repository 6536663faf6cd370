//! graphql-route server - demo host application for the GraphQL route
//!
//! Provides:
//! - GET /health - Liveness and GraphQL engine status
//! - GET, HEAD, POST /graphql - The GraphQL route (path configurable)

use axum::{Router, routing::get};
use graphql_route::GraphQLApp;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod health;
pub mod schema;

use config::Config;
use schema::{AccountsSchema, create_schema};

/// Build the application router around a schema
pub fn build_router_with_schema(config: &Config, schema: AccountsSchema) -> Router {
    let graphql = GraphQLApp::new(schema.clone())
        .with_config(config.route.clone())
        .router(&config.path);

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(schema)
        .merge(graphql)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Build the application router with the demo schema
pub fn build_router(config: &Config) -> Router {
    build_router_with_schema(config, create_schema())
}
