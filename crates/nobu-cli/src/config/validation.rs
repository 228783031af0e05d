use crate::config::DevConfig;
use crate::error::{ConfigError, Result};

fn invalid(field: &str, value: &str, hint: impl Into<String>) -> crate::error::CliError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        hint: hint.into(),
    }
    .into()
}

/// Validate a value used as exactly one URL/file path segment.
pub fn validate_path_segment(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "Value cannot be empty"));
    }

    if value == "." || value == ".." {
        return Err(invalid(field, value, "Relative segments are not allowed"));
    }

    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\' | '?' | '#' | '$' | '%') || c.is_whitespace())
    {
        return Err(invalid(
            field,
            value,
            format!("Must be a single path segment (found '{}')", c),
        ));
    }

    Ok(())
}

impl DevConfig {
    /// Validate configuration before the server starts.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(invalid(
                "root",
                &self.root.display().to_string(),
                "Root must be an existing directory",
            ));
        }

        validate_path_segment("depsDir", &self.deps_dir)?;
        validate_path_segment("modulePrefix", &self.module_prefix)?;

        if self.component_ext.starts_with('.') {
            return Err(invalid(
                "componentExt",
                &self.component_ext,
                format!("Leave out the leading dot (use '{}')", self.component_ext.trim_start_matches('.')),
            ));
        }
        if self.component_ext.is_empty()
            || !self.component_ext.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(invalid(
                "componentExt",
                &self.component_ext,
                "Extension must be non-empty and alphanumeric",
            ));
        }

        if self.mode.trim().is_empty() {
            return Err(invalid("mode", &self.mode, "Mode cannot be empty (e.g. 'development')"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> DevConfig {
        DevConfig {
            root: temp.path().to_path_buf(),
            ..DevConfig::default()
        }
    }

    fn invalid_field(result: Result<()>) -> Option<String> {
        match result {
            Err(crate::error::CliError::Config(ConfigError::InvalidValue { field, .. })) => {
                Some(field)
            }
            _ => None,
        }
    }

    #[test]
    fn test_default_config_in_existing_root_is_valid() {
        let temp = TempDir::new().unwrap();
        assert!(config_in(&temp).validate().is_ok());
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let config = DevConfig {
            root: temp.path().join("missing"),
            ..DevConfig::default()
        };
        assert_eq!(invalid_field(config.validate()).as_deref(), Some("root"));
    }

    #[test]
    fn test_module_prefix_must_be_one_segment() {
        let temp = TempDir::new().unwrap();
        let config = DevConfig {
            module_prefix: "@a/b".to_string(),
            ..config_in(&temp)
        };
        assert_eq!(invalid_field(config.validate()).as_deref(), Some("modulePrefix"));
    }

    #[test]
    fn test_deps_dir_rejects_parent() {
        let temp = TempDir::new().unwrap();
        let config = DevConfig {
            deps_dir: "..".to_string(),
            ..config_in(&temp)
        };
        assert_eq!(invalid_field(config.validate()).as_deref(), Some("depsDir"));
    }

    #[test]
    fn test_component_ext_without_dot() {
        let temp = TempDir::new().unwrap();
        let config = DevConfig {
            component_ext: ".vue".to_string(),
            ..config_in(&temp)
        };
        assert_eq!(invalid_field(config.validate()).as_deref(), Some("componentExt"));
    }

    #[test]
    fn test_empty_mode() {
        let temp = TempDir::new().unwrap();
        let config = DevConfig {
            mode: " ".to_string(),
            ..config_in(&temp)
        };
        assert_eq!(invalid_field(config.validate()).as_deref(), Some("mode"));
    }

    #[test]
    fn test_validate_path_segment() {
        assert!(validate_path_segment("x", "@modules").is_ok());
        assert!(validate_path_segment("x", "node_modules").is_ok());
        assert!(validate_path_segment("x", "").is_err());
        assert!(validate_path_segment("x", "a b").is_err());
        assert!(validate_path_segment("x", "$x").is_err());
    }
}
