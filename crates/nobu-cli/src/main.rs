use clap::Parser;
use nobu_cli::cli::Cli;
use nobu_cli::{error, logger};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.quiet, cli.no_color);

    nobu_cli::run(cli.serve)
        .await
        .map_err(error::cli_error_to_miette)
}
