use axum::{
    body::{Body, Bytes},
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::common::redact::redact_json_body;

/// Largest request body the logger will buffer
const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

/// Request logging middleware
///
/// Logs method, path, status, and elapsed time for every request. For auth
/// endpoints the JSON body is logged too, with credential fields masked
/// before anything reaches the log stream.
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = std::time::Instant::now();

    let request = if should_log_body(&method, &path) {
        match buffer_and_log(request, &path).await {
            Ok(request) => request,
            Err(response) => return response,
        }
    } else {
        request
    };

    let response = next.run(request).await;

    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

/// Auth endpoints carry credentials, so only their bodies are worth the
/// buffering cost
fn should_log_body(method: &Method, path: &str) -> bool {
    matches!(*method, Method::POST | Method::PUT) && path.starts_with("/api/auth")
}

async fn buffer_and_log(
    request: Request<Body>,
    path: &str,
) -> Result<Request<Body>, Response> {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_LOGGED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(path = %path, error = %err, "failed to buffer request body");
            return Err(
                (StatusCode::BAD_REQUEST, "failed to read request body").into_response(),
            );
        }
    };

    if let Some(redacted) = redact_json_body(&bytes) {
        debug!(path = %path, body = %redacted, "auth request");
    }

    Ok(Request::from_parts(parts, Body::from(Bytes::from(bytes))))
}
