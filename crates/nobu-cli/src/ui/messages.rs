//! Status lines and the startup banner.

use crate::config::DevConfig;
use owo_colors::OwoColorize;
use std::fmt::Display;

fn line(glyph: impl Display, message: impl Display) {
    eprintln!("{glyph} {message}");
}

/// Print a success message to stderr.
///
/// ```no_run
/// use nobu_cli::ui::success;
///
/// success("Dev server ready");
/// ```
pub fn success(message: &str) {
    line("✓".green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    line("ℹ".blue().bold(), message);
}

/// Print a warning message to stderr, highlighted.
pub fn warning(message: &str) {
    line("⚠".yellow().bold(), message.yellow());
}

/// Print the startup banner for a listening server.
pub fn server_banner(config: &DevConfig) {
    success(&format!(
        "Dev server running at {}",
        config.server_url().cyan().underline()
    ));
    eprintln!("  {} {}", "root   ".dimmed(), config.root.display());
    eprintln!(
        "  {} {}* -> /{}/",
        "modules".dimmed(),
        config.module_path_prefix(),
        config.deps_dir
    );
    eprintln!("  {} {}", "mode   ".dimmed(), config.mode);
    info("Press Ctrl+C to stop");
}
