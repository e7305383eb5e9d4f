use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;

lazy_static! {
    pub static ref ACTIVE_WATCHES_METRIC: IntGauge = IntGauge::new(
        "active_watches_metric",
        "Number of keys with a live watch"
    )
    .expect("metric can not be created");

    pub static ref HANDLER_REGISTRATIONS_METRIC: IntCounterVec = IntCounterVec::new(
        Opts::new("handler_registrations_metric", "Handler add/remove operations"),
        &["op"]
    )
    .expect("metric can not be created");

    pub static ref WATCH_STOPS_METRIC: IntCounter = IntCounter::new(
        "watch_stops_metric",
        "Watches torn down after their last handler left"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(ACTIVE_WATCHES_METRIC.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(HANDLER_REGISTRATIONS_METRIC.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(WATCH_STOPS_METRIC.clone()))
        .expect("collector can be registered");
}
