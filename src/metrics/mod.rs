use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

lazy_static! {
    pub static ref RECONCILE_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("reconcile_total", "Reconciliation passes by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref NOTIFICATIONS_EMITTED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("notifications_emitted_total", "Notifications emitted by reason code"),
        &["reason"]
    )
    .expect("metric can not be created");

    pub static ref QUEUE_DEPTH: IntGauge = IntGauge::new(
        "queue_depth",
        "Keys waiting in the work queue"
    )
    .expect("metric can not be created");

    pub static ref RESYNC_TOTAL: IntCounter = IntCounter::new(
        "resync_total",
        "Synthetic full re-deliveries of the cached object set"
    )
    .expect("metric can not be created");

    pub static ref WATCH_RECONNECTS_TOTAL: IntCounter = IntCounter::new(
        "watch_reconnects_total",
        "Watch stream reconnect attempts after a lost connection"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(RECONCILE_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NOTIFICATIONS_EMITTED_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(QUEUE_DEPTH.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(RESYNC_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(WATCH_RECONNECTS_TOTAL.clone()))
        .expect("collector can be registered");
}

pub async fn start_server(port: u16, mut shutdown_signal: watch::Receiver<()>) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    Ok(res)
}
