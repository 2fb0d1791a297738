//! Test logging.
//!
//! Integration test crates install it once per binary:
//!
//! ```ignore
//! #[ctor::ctor]
//! fn setup() {
//!     solspec_common::testing::init_test_logging();
//! }
//! ```

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TEST_LOGGING_INIT: Once = Once::new();

/// Filter level for tests, from `SOLSPEC_TEST_LOG_LEVEL` (default `info`).
pub fn test_log_level() -> String {
    std::env::var("SOLSPEC_TEST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Route tracing output through the test harness writer.
///
/// Safe to call many times; only the first call installs a subscriber, and
/// an already installed global subscriber is left alone.
pub fn init_test_logging() {
    TEST_LOGGING_INIT.call_once(|| {
        let level = test_log_level();
        let filter = EnvFilter::try_new(format!("solspec={level},solspec_common={level}"))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(filter)
            .compact()
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!(check = true, "test_logging_ready");
    }
}
