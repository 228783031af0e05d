//! Miette report conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Server(msg) => miette::miette!(
            "Development server failed: {}\n\nHint: Check that the address is free and the root is readable",
            msg
        ),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::InvalidValue { field, value, hint } => miette::miette!(
            code = "nobu::config::invalid_value",
            help = hint,
            "Invalid value for '{}': {}",
            field,
            value
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_report_carries_help() {
        let report = cli_error_to_miette(CliError::Config(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: "0".to_string(),
            hint: "Pick a port between 1 and 65535".to_string(),
        }));
        assert!(report.to_string().contains("'port'"));
        let help = report.help().map(|h| h.to_string());
        assert_eq!(help.as_deref(), Some("Pick a port between 1 and 65535"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = cli_error_to_miette(CliError::FileNotFound("site".into()));
        assert_eq!(report.to_string(), "No such file or directory: site");
    }
}
