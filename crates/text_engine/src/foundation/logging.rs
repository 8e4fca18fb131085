//! Logging utilities
//!
//! The library logs through the `log` facade. Applications call [`init`]
//! once at start-up; `RUST_LOG` selects the verbosity.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
pub fn init() {
    env_logger::init();
}

/// Initialize logging for tests, ignoring repeated initialization
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
