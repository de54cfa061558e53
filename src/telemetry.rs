// src/telemetry.rs
use std::future::ready;

use axum::{routing::get, Router};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and return a handle.
    /// Later calls reuse the first recorder.
    pub fn init() -> Result<Self, BuildError> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new().install_recorder()?;
                describe_counter!("directory_queries_total", "Query requests served.");
                Ok::<_, BuildError>(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route("/metrics", get(move || ready(handle.render())))
    }
}
