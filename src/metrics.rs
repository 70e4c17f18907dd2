use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use journal_record_store::metrics as store_metrics;
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{opts, Encoder, IntCounterVec, Registry, TextEncoder};
use tracing::error;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();

static HTTP_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        opts!(
            "journal_http_rejections_total",
            "Requests answered with a 4xx status, grouped by reason"
        ),
        &["reason"],
    )
    .expect("valid rejection counter definition")
});

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = global_registry();
        store_metrics::register_metrics(registry);
        if let Err(err) = registry.register(Box::new(HTTP_REJECTIONS_TOTAL.clone())) {
            error!(?err, "failed to register http rejection metric");
        }
    });
}

pub fn global_registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn record_rejection(reason: &str) {
    HTTP_REJECTIONS_TOTAL.with_label_values(&[reason]).inc();
}

/// Prometheus text exposition of the global registry.
pub fn render() -> Response {
    register_metrics();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&global_registry().gather(), &mut buffer) {
        error!(?err, "failed to encode prometheus metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response();
    }

    match String::from_utf8(buffer) {
        Ok(body) => match HeaderValue::from_str(encoder.format_type()) {
            Ok(content_type) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
            Err(err) => {
                error!(?err, "failed to build content-type header for metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
            }
        },
        Err(err) => {
            error!(?err, "failed to convert prometheus metrics to utf8");
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}
