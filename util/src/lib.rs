use std::cell::Cell;

use tracing_subscriber::{fmt, EnvFilter};

/// Simple monotonic id generator for in-process identifiers.
///
/// Ids are never reused, so a stale id can be told apart from a live one.
#[derive(Debug)]
pub struct IdGenerator {
    next: Cell<u64>,
}

impl IdGenerator {
    /// Creates a new generator starting at the provided value.
    pub fn new(start: u64) -> Self {
        Self {
            next: Cell::new(start),
        }
    }

    /// Returns the next id in sequence.
    pub fn next(&self) -> u64 {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. from tests) leaves the first subscriber in place.
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
