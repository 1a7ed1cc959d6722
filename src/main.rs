use clap::Parser;
use log::*;
use std::process;

use git_release_helper::{Args, command, error::ReleaseHelperError};

fn initialize_logger(debug: bool) -> Result<(), ReleaseHelperError> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("git_release_helper")
        .build();

    // stdout is reserved for the release message
    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    if let Err(err) = command::execute(&cli_args) {
        error!("{err}");
        process::exit(err.exit_code());
    }

    Ok(())
}
