use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the correlation id between client, proxy, and service
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request correlation id, available to handlers via `Extension`
#[derive(Clone, Copy, Debug)]
pub struct RequestId(Uuid);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads a well-formed id from the incoming headers, if present
    fn from_request(request: &Request) -> Option<Self> {
        let header = request.headers().get(&REQUEST_ID_HEADER)?;
        let id = Uuid::parse_str(header.to_str().ok()?).ok()?;
        Some(Self(id))
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware that attaches a request id to every request
///
/// A valid `x-request-id` header is honored so ids survive proxies and
/// retried clients; anything else gets a fresh UUID. The id is stored in the
/// request extensions and echoed on the response headers.
pub async fn propagate_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request).unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(&REQUEST_ID_HEADER, value);
    }

    response
}

/// Builds the tracing span used by the HTTP trace layer
///
/// Runs after [`propagate_request_id`], so the extension is always present
/// for requests flowing through the real router; "unknown" covers anything
/// assembled outside it.
pub fn http_request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
