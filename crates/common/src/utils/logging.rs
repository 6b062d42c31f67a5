use std::io;
use tracing_subscriber::{fmt, EnvFilter};

// Used when RUST_LOG is unset.
const COMPACT_FILTER: &str = "info,tower_http=info,axum=info";
// Machine-read logs also carry per-save store events.
const JSON_FILTER: &str = "info,tower_http=info,service::user_store=debug";

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber on stdout: JSON lines when `json` is set,
/// compact text otherwise. A second call is a no-op.
pub fn init_logging(json: bool) {
    let builder = fmt().with_writer(io::stdout).with_target(false);
    let _ = if json {
        builder.with_env_filter(env_filter(JSON_FILTER)).json().try_init()
    } else {
        builder.with_env_filter(env_filter(COMPACT_FILTER)).compact().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(false);
        init_logging(true);
        tracing::info!(event = "after_init", "still logging");
    }
}
