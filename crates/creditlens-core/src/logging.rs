//! Tracing subscriber setup.
//!
//! Events go to stderr so stdout stays reserved for JSON command output.
//! Filtering follows `RUST_LOG` (e.g. `RUST_LOG=creditlens_core=debug`),
//! defaulting to `info`.

use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber: JSON lines when `json`, pretty otherwise.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(json: bool) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .with_writer(io::stderr);
        registry.with(json_layer).try_init()
    } else {
        let pretty_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stderr);
        registry.with(pretty_layer).try_init()
    };

    installed.is_ok()
}
