//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so stdout stays free for scripting. The filter comes
//! from `RUST_LOG` and defaults to [`DEFAULT_FILTER`].

use tracing_subscriber::{EnvFilter, fmt};

use crate::Error;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "bhejo=info";

/// Install the global subscriber, as human-readable text or JSON lines.
///
/// # Errors
///
/// Returns [`Error::Logging`] if a global subscriber is already set.
pub fn init(json: bool) -> Result<(), Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::Logging {
        message: e.to_string(),
    })
}
