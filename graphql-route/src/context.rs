//! Request-scoped context handed to resolvers

use axum::{
    extract::{OriginalUri, Request},
    http::{HeaderMap, Method, Uri},
};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// The originating HTTP request, as seen by resolvers.
///
/// Inserted into the data of every executed operation, so a resolver reads it
/// with `ctx.data::<RequestContext>()`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    background: BackgroundTasks,
}

impl RequestContext {
    /// Capture method, URI and headers of a request.
    ///
    /// The URI is the one the client sent, before any `Router::nest` prefix
    /// was stripped.
    pub fn new(request: &Request) -> Self {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| request.uri().clone());

        Self {
            method: request.method().clone(),
            uri,
            headers: request.headers().clone(),
            background: BackgroundTasks::default(),
        }
    }

    /// HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URI, mount prefix included
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path the route was reached on
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// All request headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text, if present and visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Tasks to run once the response is ready
    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }
}

/// Work queued by resolvers to run after the response has been built.
///
/// Tasks run in the order they were added, on a single spawned tokio task.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tasks: Arc<Mutex<Vec<BoxFuture<'static, ()>>>>,
}

impl BackgroundTasks {
    /// Queue a task
    pub fn add<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.lock().push(Box::pin(task));
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Drain the queue onto the runtime; a no-op when nothing was queued
    pub fn spawn(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        if tasks.is_empty() {
            return;
        }

        tracing::debug!(count = tasks.len(), "spawning background tasks");
        tokio::spawn(async move {
            for task in tasks {
                task.await;
            }
        });
    }
}

impl std::fmt::Debug for BackgroundTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTasks")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_context_captures_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/graphql/?x=1")
            .header("x-tenant", "acme")
            .body(Body::empty())
            .unwrap();

        let context = RequestContext::new(&request);
        assert_eq!(*context.method(), Method::POST);
        assert_eq!(context.path(), "/graphql/");
        assert_eq!(context.uri().query(), Some("x=1"));
        assert_eq!(context.header("x-tenant"), Some("acme"));
        assert_eq!(context.header("x-missing"), None);
        assert!(context.background().is_empty());
    }

    #[test]
    fn test_context_keeps_the_nest_prefix() {
        let mut request = Request::builder()
            .uri("/graphql?query=%7Bpath%7D")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(OriginalUri("/api/graphql?query=%7Bpath%7D".parse().unwrap()));

        let context = RequestContext::new(&request);
        assert_eq!(context.path(), "/api/graphql");
        assert_eq!(context.uri().query(), Some("query=%7Bpath%7D"));
    }

    #[tokio::test]
    async fn test_background_tasks_run_in_order() {
        let tasks = BackgroundTasks::default();
        let order = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();

        for i in 0..3 {
            let order = order.clone();
            tasks.add(async move {
                order.lock().push(i);
            });
        }
        tasks.add(async move {
            let _ = done_tx.send(());
        });
        assert_eq!(tasks.len(), 4);

        tasks.spawn();
        assert!(tasks.is_empty());

        done_rx.await.unwrap();
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_clones_share_the_queue() {
        let tasks = BackgroundTasks::default();
        let counter = Arc::new(AtomicUsize::new(0));

        let clone = tasks.clone();
        let c = counter.clone();
        clone.add(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(tasks.len(), 1);
        tasks.spawn();
        assert!(clone.is_empty());
    }
}
