use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::settings::AppEnvironment;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter; production emits one JSON object per line.
pub fn init_tracing(env: &AppEnvironment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        AppEnvironment::Production => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        _ => registry
            .with(fmt::layer().with_target(false))
            .init(),
    }
}
