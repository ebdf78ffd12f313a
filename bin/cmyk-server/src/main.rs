//! cmyk-server – RGB to CMYK conversion over HTTP.
//!
//! Configuration comes from `CMYK_*` environment variables (see
//! [`config::Config`]). The upload and output directories are created on
//! startup; the server drains in-flight requests on SIGINT or SIGTERM.

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config);
    info!(version = env!("CARGO_PKG_VERSION"), "cmyk-server starting");

    let state = Arc::new(AppState::new(config));
    state.store.ensure_dirs().await?;
    info!(
        upload_dir = %state.config.upload_dir.display(),
        output_dir = %state.config.output_dir.display(),
        "storage directories ready"
    );

    let addr: SocketAddr = state.config.bind_address.parse()?;
    let app = routes::build(Arc::clone(&state));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("cmyk-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `CMYK_LOG`; an unparsable `CMYK_LOG` falls back to
/// `info` with a warning on stderr, since the subscriber is not up yet.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|e| {
            eprintln!("WARN: CMYK_LOG={:?} is invalid ({e}); using 'info'", config.log_level);
            EnvFilter::new("info")
        })
    });

    let fmt = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.log_json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                None
            }
        };
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "Ctrl-C handler unavailable");
                }
            }
            Some(_) = async {
                match sigterm.as_mut() {
                    Some(s) => s.recv().await,
                    None => std::future::pending().await,
                }
            } => {}
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl-C handler unavailable");
        }
    }

    info!("shutdown requested, draining connections");
}
