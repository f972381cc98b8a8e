//! Log subscriber setup
//!
//! The library only emits `tracing` events under `concord::*` targets. This
//! helper installs a plain fmt subscriber for applications and tests that
//! have none of their own.

use tracing::Level;

/// Install a global fmt subscriber: DEBUG when `verbose`, INFO otherwise.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is left untouched.
pub fn init_tracing(verbose: bool) -> bool {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok()
}
