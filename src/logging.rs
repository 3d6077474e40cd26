//! Process-wide tracing initialization.
//!
//! Call once at process start. `RUST_LOG` wins over the supplied default
//! filter; repeated calls are no-ops so tests can initialize freely.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the global tracing subscriber.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_harmless() {
        init("info");
        init("debug");
    }
}
