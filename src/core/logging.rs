//! Logging setup and request context.
//!
//! Request ids live in a tokio task-local so that every log line emitted while
//! handling a request can carry the id without threading it through calls.

use chrono::Local;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

tokio::task_local! {
    /// Task-local storage for the current request ID.
    pub static REQUEST_ID: String;
}

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,iflow_proxy=debug";

/// Filters always appended to silence chatty HTTP internals.
const NOISE_FILTERS: &str = "hyper=warn,hyper::proto=warn,h2=warn,reqwest=warn";

/// Get the current request ID from context, if set.
///
/// Returns an empty string if no request ID is set.
pub fn get_request_id() -> String {
    REQUEST_ID.try_with(|id| id.clone()).unwrap_or_default()
}

/// Generate a new unique request ID using UUID v4.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build the subscriber filter directives.
///
/// The noise filters are appended even when `RUST_LOG` is set, so that a bare
/// `RUST_LOG=trace` does not flood the output with connection-level logs.
pub fn build_filter_directives(base: Option<&str>) -> String {
    let base = base
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER);
    format!("{},{}", base, NOISE_FILTERS)
}

/// Formats timestamps in the local timezone (respects TZ).
struct LocalTime;

impl tracing_subscriber::fmt::time::FormatTime for LocalTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Install the global tracing subscriber.
///
/// Reads `RUST_LOG` for the filter and disables ANSI colors when `NO_COLOR` is set.
pub fn init_logging() {
    let base_filter = std::env::var("RUST_LOG").ok();
    let filter =
        tracing_subscriber::EnvFilter::new(build_filter_directives(base_filter.as_deref()));
    let no_color = std::env::var("NO_COLOR").is_ok();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(!no_color),
        )
        .init();
}
