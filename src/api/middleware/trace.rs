use super::request_id::REQUEST_ID;
use axum::body::Body;
use axum::http::{Request, Response};
use std::time::Duration;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::{Span, info};

pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    fn(&Request<Body>, &Span),
    fn(&Response<Body>, Duration, &Span),
>;

/// One span per request. Must sit inside the request-id middleware so the id is already set.
pub fn http_trace_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as fn(&Request<Body>) -> Span)
        .on_request(on_request as fn(&Request<Body>, &Span))
        .on_response(on_response as fn(&Response<Body>, Duration, &Span))
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "relay",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

fn on_request(request: &Request<Body>, _span: &Span) {
    info!("📥 {} {}", request.method(), request.uri());
}

fn on_response(response: &Response<Body>, latency: Duration, _span: &Span) {
    info!("📤 {} in {}ms", response.status(), latency.as_millis());
}
