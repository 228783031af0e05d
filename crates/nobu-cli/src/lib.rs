//! # nobu-cli
//!
//! A no-bundle development server. Project files are served as they are on
//! disk; only what a browser cannot load natively is transformed on the fly:
//!
//! - `.vue` single-file components become ES modules (a script module plus a
//!   separately requested render module)
//! - bare imports such as `from "vue"` are pointed at `/@modules/vue`, which
//!   resolves to the package's ES module entry under `node_modules`
//!
//! ## Architecture
//!
//! - [`cli`]: command-line definition (clap)
//! - [`config`]: layered configuration (figment)
//! - [`dev`]: axum server and the request transform pipeline
//! - [`error`]: error types and miette conversion
//! - [`logger`] / [`ui`]: tracing setup and terminal output
//!
//! ## Example
//!
//! ```rust,no_run
//! use nobu_cli::{cli::ServeArgs, run};
//!
//! # async fn example() -> nobu_cli::error::Result<()> {
//! run(ServeArgs::default()).await
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

use crate::cli::ServeArgs;
use crate::config::DevConfig;
use crate::dev::DevServer;
use crate::error::ResultExt;
use std::sync::Arc;

/// Loads configuration and serves until Ctrl+C.
pub async fn run(args: ServeArgs) -> error::Result<()> {
    let mut config = DevConfig::load(&args)?;
    config.validate()?;
    config.root = std::fs::canonicalize(&config.root).with_path(&config.root)?;
    tracing::debug!(?config, "configuration loaded");

    if !config.host.is_loopback() {
        ui::warning(&format!(
            "Listening on {}: everything under {} is reachable from the network",
            config.host,
            config.root.display()
        ));
    }

    DevServer::new(config, Arc::new(nobu_sfc::VueCompiler))
        .start()
        .await
}
