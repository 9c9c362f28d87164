//! Log level selection for the `log` facade.
//!
//! Diagnostics go to stderr so they never interleave with page text on
//! stdout. The binary installs `env_logger` at the level chosen here.

use log::LevelFilter;

/// Map CLI flags to a level: `-q` shows errors only, default shows warnings,
/// each `-v` adds one level up to trace.
pub fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(false, 0), LevelFilter::Warn);
        assert_eq!(level_for(false, 1), LevelFilter::Info);
        assert_eq!(level_for(false, 2), LevelFilter::Debug);
        assert_eq!(level_for(false, 7), LevelFilter::Trace);
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(level_for(true, 2), LevelFilter::Error);
    }
}
