//! iFlow Proxy - Main entry point
//!
//! This binary creates and runs the HTTP server with all routes and middleware.
//! Configuration is read from the environment (and `.env`, if present).

use anyhow::{Context, Result};
use iflow_proxy::{
    api::{build_router, AppState},
    core::{init_logging, init_metrics, AppConfig},
};
use std::sync::Arc;

fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    // Single worker unless configured or granted more CPU by the container
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| detect_cpu_limit().unwrap_or(1));

    println!("Tokio runtime: using {} worker threads", worker_threads);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_logging();
    init_metrics();

    let config = AppConfig::from_env();
    if config.upstream.api_key.is_none() {
        tracing::warn!("IFLOW_API_KEY is not set, upstream requests will be sent without credentials");
    }
    if !config.verify_ssl {
        tracing::warn!("SSL verification for upstream requests is disabled");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::from_config(config)?);
    state.aliases.log_aliases();

    let app = build_router(state.clone());

    tracing::info!("Upstream: {}", state.upstream.url());
    tracing::info!("OpenAI API: /v1/chat/completions, /v1/models");
    tracing::info!("Swagger UI: /swagger-ui");
    tracing::info!("Metrics endpoint: /metrics");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("iFlow Proxy running on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// CPU quota granted by the container, rounded up to whole cores.
///
/// Reads cgroup v2 `cpu.max`, then the cgroup v1 CFS quota files.
fn detect_cpu_limit() -> Option<usize> {
    let read = |path: &str| std::fs::read_to_string(path).ok();

    let v2 = read("/sys/fs/cgroup/cpu.max").and_then(|max| {
        let (quota, period) = max.trim().split_once(' ')?;
        cores_from_quota(quota, period)
    });
    if let Some(cores) = v2 {
        println!("Detected CPU limit from cgroup v2: {} cores", cores);
        return Some(cores);
    }

    let quota = read("/sys/fs/cgroup/cpu/cpu.cfs_quota_us")?;
    let period = read("/sys/fs/cgroup/cpu/cpu.cfs_period_us")?;
    let cores = cores_from_quota(quota.trim(), period.trim())?;
    println!("Detected CPU limit from cgroup v1: {} cores", cores);
    Some(cores)
}

/// `None` for an unlimited (`max` or `-1`) or malformed quota.
fn cores_from_quota(quota: &str, period: &str) -> Option<usize> {
    let quota: u64 = quota.parse().ok()?;
    let period: u64 = period.parse().ok()?;
    if quota == 0 || period == 0 {
        return None;
    }
    Some(quota.div_ceil(period) as usize)
}
