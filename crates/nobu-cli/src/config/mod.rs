//! Development server configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and a config file.
//! Priority: CLI > Environment (`NOBU_*`) > `nobu.config.json` > Defaults

mod loading;
mod validation;

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "nobu.config.json";

/// Development server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    /// Directory served as the site root
    pub root: PathBuf,

    /// Address to bind
    pub host: IpAddr,

    /// Port to listen on
    pub port: u16,

    /// Directory under `root` holding installed packages
    pub deps_dir: String,

    /// Path segment for rewritten bare imports (`/@modules/vue`)
    pub module_prefix: String,

    /// Extension, without the dot, of single-file components
    pub component_ext: String,

    /// Literal substituted for `process.env.NODE_ENV`
    pub mode: String,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            deps_dir: "node_modules".to_string(),
            module_prefix: "@modules".to_string(),
            component_ext: "vue".to_string(),
            mode: "development".to_string(),
        }
    }
}

impl DevConfig {
    /// Socket address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// URL printed in the startup banner.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr())
    }

    /// Request path prefix of virtual module paths, e.g. `/@modules/`.
    pub fn module_path_prefix(&self) -> String {
        format!("/{}/", self.module_prefix)
    }

    /// Request path suffix of single-file components, e.g. `.vue`.
    pub fn component_suffix(&self) -> String {
        format!(".{}", self.component_ext)
    }
}
