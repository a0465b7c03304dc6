//! Opt-in diagnostics for C hosts.
//!
//! The arena logs through `tracing`. A Rust host installs its own
//! subscriber; a C host that has none can call [`hoard_logging_init`] to
//! get a stderr subscriber filtered by the `HOARD_LOG` environment
//! variable (`EnvFilter` syntax, default `warn`).

use tracing_subscriber::EnvFilter;

use crate::status::HoardStatus;

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "HOARD_LOG";

/// Filter used when `HOARD_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr `tracing` subscriber for hoard diagnostics.
///
/// Safe to call more than once. If the host already installed a global
/// subscriber, that one is kept and this still returns `HOARD_STATUS_OK`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_logging_init() -> i32 {
    ffi_guard!({
        let installed = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(filter_var = LOG_ENV_VAR, "hoard logging initialised");
        }
        HoardStatus::Ok as i32
    })
}
