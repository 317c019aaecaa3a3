use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;
use videohub_core::constants::REQUEST_ID_HEADER;

/// Request ID extension type
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Per-request values needed when rendering error envelopes.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    pub path: String,
}

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

/// Request ID middleware
/// Reuses an incoming `X-Request-ID` or generates one, and exposes it through:
/// - Response headers (X-Request-ID)
/// - Request extensions (`RequestId`, `RequestContext`)
/// - A task-local `RequestContext` for the rest of the request
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let context = RequestContext {
        request_id: request_id.clone(),
        path: request.uri().path().to_string(),
    };

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));
    request.extensions_mut().insert(context.clone());

    let mut response = REQUEST_CONTEXT.scope(context, next.run(request)).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Extract request ID from request extensions
pub fn get_request_id(request: &Request) -> Option<String> {
    request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
}

/// Context of the request currently being handled, if called inside the middleware.
pub fn current_request_context() -> Option<RequestContext> {
    REQUEST_CONTEXT.try_with(|ctx| ctx.clone()).ok()
}
