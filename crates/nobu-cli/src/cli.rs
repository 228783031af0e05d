//! Command-line interface definition for nobu.
//!
//! `nobu [ROOT]` starts the development server. Every server flag is
//! optional so that unset flags fall through to `nobu.config.json`,
//! `NOBU_*` environment variables and finally the built-in defaults.

use clap::{Args, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

/// nobu - a no-bundle development server for Vue components
#[derive(Parser, Debug)]
#[command(
    name = "nobu",
    version,
    about = "A no-bundle development server for Vue single-file components",
    long_about = "nobu serves a project directory as-is and transforms only what the browser\n\
                  cannot load natively: `.vue` components become ES modules and bare imports\n\
                  such as `import { ref } from \"vue\"` are pointed at installed packages."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Logs every pipeline stage applied to each request.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(flatten)]
    pub serve: ServeArgs,
}

/// Options for the development server.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Project root to serve (defaults to the current directory)
    pub root: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory under the root holding installed packages
    #[arg(long, value_name = "DIR")]
    pub deps_dir: Option<String>,

    /// Virtual path segment that bare imports are rewritten under
    #[arg(long, value_name = "SEGMENT")]
    pub module_prefix: Option<String>,

    /// File extension treated as a single-file component
    #[arg(long, value_name = "EXT")]
    pub component_ext: Option<String>,

    /// Value substituted for `process.env.NODE_ENV`
    #[arg(long)]
    pub mode: Option<String>,

    /// Path to a JSON config file (defaults to <ROOT>/nobu.config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
