//! Compilation Session Configuration for the Tern Native Backend
//!
//! Holds the configuration shared by the library-image loader and the debug
//! info emitter: the serialization ABI version used to read precompiled
//! libraries, the debug level, the output path the compile unit is named
//! after, and the target triple.
//!
//! # Environment Variables
//!
//! - `TERN_ABI_VERSION`: Override the ABI version used to read library headers.
//!   Accepts `major.minor.patch` or a bare major number.
//! - `TERN_DEBUG_INFO`: Override the debug level (`none`, `line-tables`, `full`,
//!   `0`, `1`).
//! - `TERN_TARGET`: Override the target triple.
//! - `RUST_LOG=tern_library=debug`: Enable debug-level tracing output.
//!
//! # Usage
//!
//! ```
//! use tern_session::{AbiVersion, DebugLevel, SessionConfig};
//!
//! let config = SessionConfig::new(AbiVersion::new(1, 4, 0))
//!     .with_debug_level(DebugLevel::Full)
//!     .with_output_path("build/main.o");
//!
//! assert!(config.debug_info_enabled());
//! ```

mod abi;
mod config;

pub use abi::AbiVersion;
pub use config::{ConfigError, DebugLevel, SessionConfig};

use std::sync::Once;

/// Environment variable overriding the library ABI version.
pub const ENV_ABI_VERSION: &str = "TERN_ABI_VERSION";

/// Environment variable overriding the debug level.
pub const ENV_DEBUG_INFO: &str = "TERN_DEBUG_INFO";

/// Environment variable overriding the target triple.
pub const ENV_TARGET: &str = "TERN_TARGET";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=tern_library=debug` or `RUST_LOG=tern_debug=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
