//! The GraphQL route handler

use crate::config::RouteConfig;
use crate::context::RequestContext;
use crate::error::{Result, RouteError};
use crate::executor::GraphQLExecutor;
use crate::explorer::{explorer_page, prefers_html};
use crate::request::GraphQLParams;
use crate::response::{ErrorFormatter, default_error_formatter, into_http_response};
use async_graphql::Data;
use axum::{
    Router,
    extract::Request,
    http::Method,
    response::{Html, IntoResponse, Response},
    routing::any,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

type ContextProvider = Arc<dyn Fn(&RequestContext, &mut Data) + Send + Sync>;

/// A GraphQL executor mounted as an HTTP route.
///
/// ```ignore
/// let schema = Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish();
/// let app = Router::new().merge(GraphQLApp::new(schema).router("/graphql"));
/// ```
pub struct GraphQLApp<E> {
    executor: Arc<E>,
    config: RouteConfig,
    context_provider: Option<ContextProvider>,
    error_formatter: ErrorFormatter,
}

impl<E> Clone for GraphQLApp<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            config: self.config.clone(),
            context_provider: self.context_provider.clone(),
            error_formatter: self.error_formatter,
        }
    }
}

impl<E: GraphQLExecutor> GraphQLApp<E> {
    /// Wrap an executor with the default configuration
    pub fn new(executor: E) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    /// Wrap an executor that is already shared elsewhere
    pub fn from_arc(executor: Arc<E>) -> Self {
        Self {
            executor,
            config: RouteConfig::default(),
            context_provider: None,
            error_formatter: default_error_formatter,
        }
    }

    /// Replace the route configuration
    pub fn with_config(mut self, config: RouteConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable the explorer page
    pub fn with_explorer(mut self, explorer: bool) -> Self {
        self.config.explorer = explorer;
        self
    }

    /// Add request-scoped data for every operation.
    ///
    /// The provider runs after [`RequestContext`] has been inserted, so it can
    /// derive values from the request (a tenant header, say).
    pub fn with_context<F>(mut self, provider: F) -> Self
    where
        F: Fn(&RequestContext, &mut Data) + Send + Sync + 'static,
    {
        self.context_provider = Some(Arc::new(provider));
        self
    }

    /// Replace how engine-reported errors are rendered
    pub fn with_error_formatter(mut self, formatter: ErrorFormatter) -> Self {
        self.error_formatter = formatter;
        self
    }

    /// Current route configuration
    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Explorer page posting operations back to `endpoint`
    pub fn explorer_page(&self, endpoint: &str) -> String {
        explorer_page(endpoint, self.config.explorer_title.as_deref())
    }

    /// Router answering on `path` and `path/` for every method
    pub fn router<S>(self, path: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handler = move |request: Request| {
            let app = self.clone();
            async move { app.handle(request).await }
        };

        let base = path.trim_end_matches('/');
        if base.is_empty() {
            return Router::new().route("/", any(handler));
        }

        let base = if base.starts_with('/') {
            base.to_string()
        } else {
            format!("/{base}")
        };
        Router::new()
            .route(&base, any(handler.clone()))
            .route(&format!("{base}/"), any(handler))
    }

    /// Handle one request end to end
    pub async fn handle(&self, request: Request) -> Response {
        let context = RequestContext::new(&request);
        let method = context.method().clone();
        let path = context.path().to_string();
        debug!(%method, %path, "handling GraphQL request");

        let response = match self.dispatch(request, &context).await {
            Ok(response) => response,
            Err(err) => {
                if matches!(err, RouteError::Internal) {
                    error!(%method, %path, "GraphQL request failed");
                } else {
                    warn!(%method, %path, error = %err, "rejected GraphQL request");
                }
                err.into_response()
            }
        };

        context.background().spawn();
        response
    }

    async fn dispatch(&self, request: Request, context: &RequestContext) -> Result<Response> {
        let params = match request.method().clone() {
            Method::GET | Method::HEAD => {
                let params = GraphQLParams::from_uri(request.uri())?;
                if params.query.is_none()
                    && self.config.explorer
                    && prefers_html(request.headers())
                {
                    let page = self.explorer_page(context.path());
                    return Ok(Html(page).into_response());
                }
                if params.is_mutation() {
                    return Err(RouteError::MutationNotAllowed(context.method().clone()));
                }
                params
            }
            Method::POST => GraphQLParams::from_body(request).await?,
            other => return Err(RouteError::MethodNotAllowed(other)),
        };

        let mut gql_request = params.into_request()?.data(context.clone());
        if let Some(provider) = &self.context_provider {
            provider(context, &mut gql_request.data);
        }

        let outcome = AssertUnwindSafe(self.executor.execute(gql_request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(response) => into_http_response(response, self.error_formatter),
            Err(panic) => {
                error!(panic = %panic_message(&*panic), "GraphQL execution panicked");
                Err(RouteError::Internal)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
