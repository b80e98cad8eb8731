//! Logging setup shared by unit and integration tests.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Install a stderr subscriber once per test binary.
///
/// `RUST_LOG` selects the level; without it the crate logs at debug.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("postrank=debug"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(env_filter),
        );

        // Another harness may already own the global subscriber
        if subscriber.try_init().is_err() {
            eprintln!("tracing subscriber already set");
        }
        debug!("test setup complete");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_init_then_idempotent() {
        init_test_setup();
        init_test_setup();
    }
}
