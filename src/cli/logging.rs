use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

/// Default filter for a verbosity count: warnings only, `-v` info, `-vv` debug.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "pvectl=warn,warn",
        1 => "pvectl=info,warn",
        _ => "pvectl=debug,warn",
    }
}

/// Initialize the global tracing subscriber, writing to stderr so report lines
/// on stdout stay clean. `RUST_LOG` overrides the verbosity flags.
pub fn init(format: LogFormat, verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    match format {
        LogFormat::Human => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .init();
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(default_filter(0), "pvectl=warn,warn");
        assert_eq!(default_filter(1), "pvectl=info,warn");
        assert_eq!(default_filter(2), "pvectl=debug,warn");
        assert_eq!(default_filter(7), "pvectl=debug,warn");
    }
}
