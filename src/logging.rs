//! Logging setup
//!
//! Shared `tracing` subscriber initialization for all binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Default filter directive for a configured level
pub fn default_directive(level: &str, debug: bool) -> String {
    if debug {
        "covid_dash=debug,tower_http=debug".to_string()
    } else {
        format!("covid_dash={},tower_http=info", level)
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. `format = "json"`
/// selects structured output; anything else is the human-readable format.
pub fn init(config: &LoggingConfig, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level, debug)));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("warn", false), "covid_dash=warn,tower_http=info");
        assert_eq!(default_directive("info", true), "covid_dash=debug,tower_http=debug");
    }
}
