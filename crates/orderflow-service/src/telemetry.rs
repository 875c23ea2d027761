//! # Logging Setup
//!
//! ```text
//! RUST_LOG set?  ──yes──► use it as-is
//!      │
//!      no
//!      ▼
//! "<LOG_LEVEL>,orderflow_core=debug,orderflow_db=debug,orderflow_service=debug,sqlx=warn"
//!                                         (LOG_LEVEL defaults to info)
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Crates whose events are always kept at debug.
const CRATE_TARGETS: &[&str] = &["orderflow_core", "orderflow_db", "orderflow_service"];

/// Default filter directives for a log level.
pub fn default_directives(log_level: &str) -> String {
    let crates: Vec<String> = CRATE_TARGETS
        .iter()
        .map(|target| format!("{target}=debug"))
        .collect();
    format!("{},{},sqlx=warn", log_level, crates.join(","))
}

/// Installs the global fmt subscriber.
///
/// Fails if a global subscriber is already set (e.g. called twice).
pub fn init(config: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(
            default_directives("warn"),
            "warn,orderflow_core=debug,orderflow_db=debug,orderflow_service=debug,sqlx=warn"
        );
    }

    #[test]
    fn test_second_init_fails() {
        let config = AppConfig::default();
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
