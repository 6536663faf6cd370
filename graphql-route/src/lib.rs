//! graphql-route - mount an async-graphql schema as an axum route
//!
//! The route accepts:
//! - GET / HEAD - `query`, `variables` (JSON) and `operationName` from the URL;
//!   browsers asking for HTML without a query get the GraphiQL explorer
//! - POST - `application/json`, `application/graphql` or form-encoded bodies
//!
//! Any other method gets 405. Results are returned as `{"data", "errors"}`
//! JSON: 200 when data was produced (even partially), 400 when the operation
//! could not run at all.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod explorer;
pub mod request;
pub mod response;

pub use app::GraphQLApp;
pub use config::RouteConfig;
pub use context::{BackgroundTasks, RequestContext};
pub use error::{Result, RouteError};
pub use executor::GraphQLExecutor;
pub use request::GraphQLParams;
pub use response::{ErrorFormatter, default_error_formatter};
