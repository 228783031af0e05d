//! Logging setup for the nobu CLI.
//!
//! Uses the `tracing` ecosystem with a compact formatter:
//!
//! - `--verbose` enables debug output for the nobu crates, including one line
//!   per pipeline stage applied to a request
//! - `--quiet` limits output to errors
//! - `RUST_LOG` overrides the default filter when neither flag is given
//!
//! ```rust,no_run
//! use nobu_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("dev server starting");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "nobu=debug,nobu_cli=debug,nobu_sfc=debug,tower_http=debug";
const QUIET_FILTER: &str = "nobu=error,nobu_cli=error";
const DEFAULT_FILTER: &str = "nobu=info,nobu_cli=info";

/// Initialize the global tracing subscriber.
///
/// `verbose` wins over `quiet`. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored output should be enabled.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_parse() {
        let _ = EnvFilter::new(VERBOSE_FILTER);
        let _ = EnvFilter::new(QUIET_FILTER);
        let _ = EnvFilter::new(DEFAULT_FILTER);
    }

    #[test]
    fn test_verbose_overrides_quiet() {
        let filter = filter_for(true, true).to_string();
        assert!(filter.contains("debug"));
        assert!(!filter.contains("error"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
