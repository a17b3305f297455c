use std::{path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use nong_api::{AssignerAdapter, HttpApi};
use nong_core::{
    AssignConfig, Assigner, AssignmentStore, EventHandle, FanOut, MetricsHandle, SequentialQueue,
    events::tracing_events,
};
use nong_observe::init_logger;
use nong_prometheus::PrometheusMetrics;
use nong_store::{MemoryStore, Seed, SeedTarget, SqliteStore};

mod config;
use config::{AgentConfig, Database};

fn main() -> anyhow::Result<()> {
    // Config and logger come up before the runtime so local offset detection
    // still runs single-threaded.
    let config = AgentConfig::load().context("loading configuration")?;
    init_logger(&config.logger)?;
    info!(
        listen = %config.listen,
        database = %config.database,
        pool_capacity = config.assign.pool_capacity,
        max_iterations = config.assign.max_iterations,
        "configuration loaded"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config))
}

async fn run(config: AgentConfig) -> anyhow::Result<()> {
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let queue = SequentialQueue::new();

    let (api, event_log) = match &config.database {
        Database::Memory => {
            let store = Arc::new(MemoryStore::new());
            seed_store(config.seed.as_deref(), &*store)?;
            let api = api_router(store, queue, &config.assign, tracing_events(), metrics.clone());
            (api, None)
        }
        Database::Sqlite(path) => {
            let fresh = !path.exists();
            let store = Arc::new(
                SqliteStore::open(path)
                    .with_context(|| format!("opening database {}", path.display()))?,
            );
            if fresh {
                seed_store(config.seed.as_deref(), &*store)?;
            } else if config.seed.is_some() {
                warn!(path = %path.display(), "database already exists; seed file ignored");
            }
            let event_log: EventHandle = store.clone();
            let events: EventHandle = Arc::new(FanOut::new(vec![tracing_events(), event_log]));
            let api = api_router(store.clone(), queue, &config.assign, events, metrics.clone());
            (api, Some(store))
        }
    };

    let app = api.merge(
        Router::new()
            .route("/metrics", get(serve_metrics))
            .with_state(metrics),
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("ctrl-c received; shutting down"),
                Err(e) => error!(error = %e, "failed to listen for ctrl-c; shutting down"),
            }
            shutdown.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    if let Some(store) = event_log {
        store.flush_events().await;
    }
    info!("server stopped");
    Ok(())
}

fn api_router<S: AssignmentStore>(
    store: Arc<S>,
    queue: SequentialQueue,
    assign: &AssignConfig,
    events: EventHandle,
    metrics: Arc<PrometheusMetrics>,
) -> Router {
    let metrics: MetricsHandle = metrics;
    let assigner = Assigner::new(store, queue, assign)
        .with_events(events)
        .with_metrics(metrics);
    HttpApi::new(Arc::new(AssignerAdapter::new(Arc::new(assigner)))).router()
}

fn seed_store(path: Option<&Path>, store: &dyn SeedTarget) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    Seed::from_file(path)?
        .apply(store)
        .with_context(|| format!("applying seed {}", path.display()))
}

async fn serve_metrics(State(metrics): State<Arc<PrometheusMetrics>>) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("# failed to encode metrics: {e}\n"),
            )
        }
    }
}
