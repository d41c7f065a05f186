use axum::{
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use futures::Future;
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};
use tower_http::classify::StatusInRangeAsFailures;
use tower_http::trace::{
    DefaultOnBodyChunk, DefaultOnEos, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse,
    MakeSpan, TraceLayer,
};
use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

/// Classification attached to error log lines so they can be filtered
/// downstream without parsing the message text.
#[derive(Debug)]
pub enum ErrorKind {
    /// Database-related errors
    Database,
    /// Unexpected or system errors
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Database => "database_error",
            ErrorKind::Internal => "internal_error",
        };
        f.write_str(label)
    }
}

/// Request ID tracking information
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl Default for RequestId {
    fn default() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }
}

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        RequestId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_ID: RefCell<Option<RequestId>>;
}

pub async fn scope_request_id<Fut, R>(request_id: RequestId, future: Fut) -> R
where
    Fut: Future<Output = R>,
{
    CURRENT_REQUEST_ID
        .scope(RefCell::new(Some(request_id)), future)
        .await
}

pub fn current_request_id() -> Option<RequestId> {
    CURRENT_REQUEST_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

#[derive(Clone, Default)]
pub struct RequestSpanMaker;

impl<B> MakeSpan<B> for RequestSpanMaker {
    fn make_span(&mut self, request: &Request<B>) -> tracing::Span {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .cloned()
            .or_else(|| {
                request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .map(RequestId::new)
            })
            .unwrap_or_default();

        tracing::info_span!(
            "http.request",
            request_id = %request_id.as_str(),
            method = %method,
            uri = %uri,
        )
    }
}

/// Header name for the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Requests slower than this get a warning with their id and path.
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

/// Middleware that gives every request an id, visible to handlers through
/// the request extension and to response builders through the task-local
/// read by [`current_request_id`].
pub async fn request_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::new)
        .unwrap_or_default();

    // Request IDs are validated ASCII, so the header conversion won't fail
    request.headers_mut().insert(
        HeaderName::from_static(REQUEST_ID_HEADER),
        HeaderValue::from_str(request_id.as_str())
            .expect("request ID contains only valid header characters"),
    );
    request.extensions_mut().insert(request_id.clone());

    let context = RequestContext {
        request_id: request_id.clone(),
        path: request.uri().path().to_string(),
        method: request.method().to_string(),
        user_agent: request
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let start = Instant::now();
    let mut response =
        scope_request_id(request_id.clone(), async move { next.run(request).await }).await;
    log_slow_request(&context, start.elapsed(), SLOW_REQUEST_THRESHOLD);

    response.headers_mut().insert(
        HeaderName::from_static(REQUEST_ID_HEADER),
        HeaderValue::from_str(request_id.as_str())
            .expect("request ID contains only valid header characters"),
    );

    response
}

/// Request context carried by logging helpers
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: RequestId,
    /// Requested path
    pub path: String,
    /// HTTP Method used
    pub method: String,
    /// User agent header, when present
    pub user_agent: Option<String>,
}

/// Configure tracing for the application with tower-http
pub fn configure_http_tracing() -> TraceLayer<
    tower_http::classify::SharedClassifier<StatusInRangeAsFailures>,
    RequestSpanMaker,
    DefaultOnRequest,
    DefaultOnResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    DefaultOnFailure,
> {
    let classifier =
        tower_http::classify::SharedClassifier::new(StatusInRangeAsFailures::new(500..=599));
    TraceLayer::new(classifier)
        .make_span_with(RequestSpanMaker::default())
        .on_request(DefaultOnRequest::default())
        .on_response(DefaultOnResponse::default())
        .on_body_chunk(DefaultOnBodyChunk::default())
        .on_eos(DefaultOnEos::default())
        .on_failure(DefaultOnFailure::default())
}

/// Log an error with context
///
/// This function is used to log errors with additional context
/// information that helps with debugging.
#[instrument(level = "error", skip(err))]
pub fn log_error<E: std::fmt::Display>(err: &E, kind: ErrorKind, context: Option<&str>) {
    match context {
        Some(ctx) => {
            error!(error_type = %kind, context = ctx, error = %err, "Error occurred")
        }
        None => error!(error_type = %kind, error = %err, "Error occurred"),
    }
}

/// Log slow requests
pub fn log_slow_request(context: &RequestContext, duration: Duration, threshold: Duration) {
    if duration > threshold {
        warn!(
            request_id = %context.request_id,
            path = %context.path,
            method = %context.method,
            duration_ms = %duration.as_millis(),
            threshold_ms = %threshold.as_millis(),
            "Slow request detected"
        );
    }
}

/// Runs a task and logs its duration and outcome under the given name.
pub async fn with_metrics<F, Fut, T, E>(
    operation_name: &str,
    tags: Option<HashMap<String, String>>,
    task: F,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let result = task().await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let tags = tags.unwrap_or_default();

    match &result {
        Ok(_) => {
            info!(
                operation = operation_name,
                duration_ms,
                tags = ?tags,
                "Operation completed successfully"
            );
        }
        Err(e) => {
            error!(
                operation = operation_name,
                duration_ms,
                error = %e,
                tags = ?tags,
                "Operation failed"
            );
        }
    }

    result
}
