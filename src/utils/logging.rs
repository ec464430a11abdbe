// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

// html5ever reports every recovered markup error at debug level; label pages have plenty.
const QUIET_PARSER_DIRECTIVES: &str = "html5ever=warn,selectors=warn";

/// Installs the global tracing subscriber.
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate
/// and the HTML parser internals are held at `warn`.
pub fn setup_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},{}", default_level, QUIET_PARSER_DIRECTIVES))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete (default level {}).", default_level);
}
