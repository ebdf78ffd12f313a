use axum::{
    body::{Body, Bytes, HttpBody},
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use std::time::Instant;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON bodies up to this size are buffered and logged.
const MAX_LOGGED_BODY: u64 = 1024;

/// Per-request span plus start/finish logging.
///
/// Reuses a valid incoming `x-trace-id` or generates one, and echoes it on
/// the response. Image bodies are streamed through untouched.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    let trace_value = HeaderValue::from_str(&trace_id.to_string()).ok();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let mut req = log_small_json("request", req).await;
        if let Some(v) = &trace_value {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let response = next.run(req).await;
        let mut response = log_small_json("response", response).await;
        if let Some(v) = trace_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Anything that splits into parts and a body: requests and responses.
trait Message: Sized {
    type Parts;
    fn split(self) -> (Self::Parts, Body);
    fn join(parts: Self::Parts, body: Body) -> Self;
    fn content_type(parts: &Self::Parts) -> Option<&HeaderValue>;
}

impl Message for Request<Body> {
    type Parts = axum::http::request::Parts;
    fn split(self) -> (Self::Parts, Body) {
        self.into_parts()
    }
    fn join(parts: Self::Parts, body: Body) -> Self {
        Request::from_parts(parts, body)
    }
    fn content_type(parts: &Self::Parts) -> Option<&HeaderValue> {
        parts.headers.get(header::CONTENT_TYPE)
    }
}

impl Message for Response {
    type Parts = axum::http::response::Parts;
    fn split(self) -> (Self::Parts, Body) {
        self.into_parts()
    }
    fn join(parts: Self::Parts, body: Body) -> Self {
        Response::from_parts(parts, body)
    }
    fn content_type(parts: &Self::Parts) -> Option<&HeaderValue> {
        parts.headers.get(header::CONTENT_TYPE)
    }
}

/// Buffer and log the body when it is small JSON of known length; pass every
/// other message through unchanged.
async fn log_small_json<M: Message>(direction: &str, msg: M) -> M {
    let (parts, body) = msg.split();
    if !should_log(M::content_type(&parts), body.size_hint().exact()) {
        return M::join(parts, body);
    }
    let bytes: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "{} body could not be read", direction);
            Bytes::new()
        }
    };
    if let Ok(text) = std::str::from_utf8(&bytes) {
        info!("{} body: {}", direction, text);
    }
    M::join(parts, Body::from(bytes))
}

fn should_log(content_type: Option<&HeaderValue>, len: Option<u64>) -> bool {
    let is_json = content_type
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    is_json && matches!(len, Some(n) if n <= MAX_LOGGED_BODY)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_small_json_of_known_length_is_buffered() {
        let json = HeaderValue::from_static("application/json");
        let tiff = HeaderValue::from_static("image/tiff");
        assert!(should_log(Some(&json), Some(42)));
        assert!(!should_log(Some(&json), Some(4096)));
        assert!(!should_log(Some(&json), None));
        assert!(!should_log(Some(&tiff), Some(10)));
        assert!(!should_log(None, Some(10)));
    }
}
