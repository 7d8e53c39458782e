use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all ledger metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register so they appear before the first increment.
    counter!("ledger_loads_total").absolute(0);
    counter!("ledger_flushes_total").absolute(0);
    counter!("ledger_flush_failures_total").absolute(0);
    counter!("wagers_created_total").absolute(0);
    counter!("wagers_settled_total").absolute(0);
    counter!("cash_transactions_total").absolute(0);
    gauge!("unflushed_mutations", "identity" => "default").set(0.0);
    gauge!("ledger_sessions_open").set(0.0);

    Ok(handle)
}

/// A handle backed by a recorder that is never installed globally. Only one
/// recorder may be installed per process, so tests and embedders that
/// construct several app states use this instead.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
