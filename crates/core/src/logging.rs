//! Console logging setup

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Map `-v`/`-q` counts onto a level; quiet wins over verbose
pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::WARN;
    }
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: LevelFilter) -> crate::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| crate::Error::config(format!("failed to install logger: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0, false), LevelFilter::INFO);
        assert_eq!(level_for(1, false), LevelFilter::DEBUG);
        assert_eq!(level_for(4, false), LevelFilter::TRACE);
        assert_eq!(level_for(2, true), LevelFilter::WARN);
    }
}
