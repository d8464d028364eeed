//! Process-wide tracing setup shared by the binaries.

pub mod logging;

pub use logging::{init_with, LogFormat};

/// Install JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    logging::init_with(LogFormat::Json, "info");
}
