use lazy_static::lazy_static;
use prometheus::{core::Collector, opts, IntCounterVec, Registry};
use tracing::error;

lazy_static! {
    static ref STORE_WRITES_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "journal_store_writes_total",
            "Whole-file rewrites grouped by collection"
        ),
        &["collection"]
    )
    .unwrap();
    static ref STORE_CORRUPT_LOADS_TOTAL: IntCounterVec = IntCounterVec::new(
        opts!(
            "journal_store_corrupt_loads_total",
            "Loads that found unparseable content, grouped by collection"
        ),
        &["collection"]
    )
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register record store metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, STORE_WRITES_TOTAL.clone());
    register(registry, STORE_CORRUPT_LOADS_TOTAL.clone());
}

pub fn record_write(collection: &str) {
    STORE_WRITES_TOTAL.with_label_values(&[collection]).inc();
}

pub fn record_corrupt_load(collection: &str) {
    STORE_CORRUPT_LOADS_TOTAL
        .with_label_values(&[collection])
        .inc();
}

pub fn writes(collection: &str) -> u64 {
    STORE_WRITES_TOTAL.with_label_values(&[collection]).get()
}

pub fn corrupt_loads(collection: &str) -> u64 {
    STORE_CORRUPT_LOADS_TOTAL
        .with_label_values(&[collection])
        .get()
}
