use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::Span;

#[derive(Debug, Clone, Copy)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id,
        )
    }
}

pub fn trace_with_request_id_layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpanWithRequestId> {
    TraceLayer::new_for_http().make_span_with(MakeSpanWithRequestId)
}
