use crate::cli::ServeArgs;
use crate::config::{DevConfig, CONFIG_FILE_NAME};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::Serialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "NOBU_";

/// CLI flags that were actually given; unset ones are not serialized so
/// they don't mask lower-priority sources.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deps_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    module_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_ext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

impl From<&ServeArgs> for Overrides {
    fn from(args: &ServeArgs) -> Self {
        Self {
            root: args.root.clone(),
            host: args.host,
            port: args.port,
            deps_dir: args.deps_dir.clone(),
            module_prefix: args.module_prefix.clone(),
            component_ext: args.component_ext.clone(),
            mode: args.mode.clone(),
        }
    }
}

impl DevConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &ServeArgs) -> Result<Self> {
        Self::load_with_env(args, env_provider(ENV_PREFIX))
    }

    fn load_with_env(args: &ServeArgs, env: Env) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(DevConfig::default()));

        if let Some(path) = config_file(args)? {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        // NOBU_PORT, NOBU_DEPS_DIR, ...
        figment = figment.merge(env);
        figment = figment.merge(Serialized::defaults(Overrides::from(args)));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE_NAME),
            }
            .into()
        })
    }
}

/// Environment variables under `prefix`, keyed the same way as the config file.
fn env_provider(prefix: &str) -> Env {
    // `map` resets lowercasing, so it has to be turned off last
    Env::prefixed(prefix)
        .ignore(&["config"])
        .map(env_key)
        .lowercase(false)
}

/// `DEPS_DIR` -> `depsDir`
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    let key = key.as_str().to_ascii_lowercase();
    let mut camel = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        match c {
            '_' if !camel.is_empty() => upper = true,
            c if upper => {
                camel.push(c.to_ascii_uppercase());
                upper = false;
            }
            c => camel.push(c),
        }
    }
    Uncased::from(camel)
}

/// An explicit `--config` must exist; the default file is optional.
fn config_file(args: &ServeArgs) -> Result<Option<PathBuf>> {
    if let Some(path) = &args.config {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.clone()).into());
        }
        return Ok(Some(path.clone()));
    }

    let root = args.root.as_deref().unwrap_or_else(|| Path::new("."));
    let default_path = root.join(CONFIG_FILE_NAME);
    Ok(default_path.is_file().then_some(default_path))
}
