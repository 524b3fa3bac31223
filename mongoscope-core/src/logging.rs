//! Tracing setup for the desktop shell.
//!
//! The shell calls [`init_logging`] once at startup. The core crate only
//! emits events through `tracing` and never installs a subscriber on its
//! own, so library consumers (and tests) stay free to bring their own.

use crate::Result;
use crate::error::MongoscopeError;
use tracing::Level;

fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global tracing subscriber.
///
/// `verbose` raises the level (0 = INFO, 1 = DEBUG, 2+ = TRACE); `quiet`
/// drops it to ERROR regardless of `verbose`. The global subscriber can
/// only be set once per process, so a second call fails with a
/// [`MongoscopeError::Configuration`] error.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbose, quiet))
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| {
            MongoscopeError::configuration(format!("failed to install tracing subscriber: {e}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbosity() {
        assert_eq!(level_for(0, true), Level::ERROR);
        assert_eq!(level_for(3, true), Level::ERROR);
    }

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(level_for(0, false), Level::INFO);
        assert_eq!(level_for(1, false), Level::DEBUG);
        assert_eq!(level_for(2, false), Level::TRACE);
        assert_eq!(level_for(u8::MAX, false), Level::TRACE);
    }

    #[test]
    fn second_init_reports_configuration_error() {
        // The global subscriber persists for the rest of the process, so
        // both calls live in a single test.
        init_logging(0, false).unwrap();

        let err = init_logging(1, false).unwrap_err();
        assert!(matches!(err, MongoscopeError::Configuration { .. }));
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
