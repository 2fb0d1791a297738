//! Test support shared by unit tests, integration tests and benches.

mod log;

pub use log::{init_test_logging, test_log_level};
