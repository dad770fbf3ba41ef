//! Tracing/logging initialization.
//!
//! Events from the `log` facade (the storage layer logs through it) are
//! forwarded into `tracing`, so one subscriber sees everything. The filter
//! comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Installs the global subscriber, as plain text or one JSON object per
/// line. Safe to call more than once; later calls are no-ops.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = if json {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_target(false));
        tracing::subscriber::set_global_default(subscriber).is_ok()
    } else {
        let subscriber = Registry::default().with(filter).with(fmt::layer());
        tracing::subscriber::set_global_default(subscriber).is_ok()
    };

    if installed {
        let _ = tracing_log::LogTracer::init();
    }
}
