//! Test utilities for meshmerge
//!
//! Helpers shared by unit tests and the `tests/` suites:
//! - [`init_test_logging`] for opt-in tracing output
//! - [`fixtures`] with sample manifest fragments written to temporary directories
//!
//! # Example
//!
//! ```rust,no_run
//! use meshmerge_cli::test_utils::{ManifestFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let dir = tempfile::tempdir().unwrap();
//! for fixture in ManifestFixture::sample_set() {
//!     fixture.write_to(dir.path()).unwrap();
//! }
//! ```

pub mod fixtures;

pub use fixtures::ManifestFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` the filter is that
/// level; otherwise `RUST_LOG` is honoured, and without it nothing is logged.
///
/// ```bash
/// RUST_LOG=meshmerge_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
