// bind addresses
//
// The tier admin endpoints have no authentication of their own.
// To allow remote access, explicitly set --rpc-bind-address 0.0.0.0:8080 behind a firewall
pub const DEFAULT_RPC_BIND_ADDRESS: &str = "127.0.0.1:8080";

// Route used to expose Prometheus metrics when enabled
pub const DEFAULT_PROMETHEUS_ROUTE: &str = "/metrics";

// Catalog store
pub const DEFAULT_STORE_PATH: &str = "data/";
pub const DEFAULT_CATALOG_FILENAME: &str = "tiers.json";

// Logs
pub const DEFAULT_LOG_FILENAME: &str = "fature-daemon.log";
pub const DEFAULT_LOGS_PATH: &str = "logs/";
pub const DEFAULT_LOGS_DATETIME_FORMAT: &str = "[%Y-%m-%d] (%H:%M:%S%.3f)";

// Metric names
pub const METRIC_RESOLVE_REQUESTS: &str = "fature_tiers_resolve_requests";
pub const METRIC_INTEGRITY_ERRORS: &str = "fature_tiers_integrity_errors";
pub const METRIC_REPLACE_REJECTED: &str = "fature_tiers_replace_rejected";
pub const METRIC_REPLACE_COMMITTED: &str = "fature_tiers_replace_committed";

/// Worker count used when none is configured
pub fn detect_available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
