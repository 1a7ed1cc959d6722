//! CLI argument parsing.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::message_format::MessageFormat;

/// Global CLI arguments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, global = true)]
    /// Path to the global configuration file.
    /// Defaults to ~/.git-release-helper/config.yml.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the release tag, collect tickets since the previous tag and
    /// print the release message.
    Release(ReleaseArgs),

    /// Write the default configuration and message templates.
    Init(InitArgs),
}

/// Options for the `release` subcommand.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ReleaseArgs {
    #[arg(long)]
    /// Tag to release. Generated from the configured tag format when omitted.
    pub tag: Option<String>,

    #[arg(long, short, default_value_t = false)]
    /// Skip default branch validation.
    pub force: bool,

    #[arg(long, default_value_t = false)]
    /// Show the configuration file paths and effective settings, then exit.
    pub show_config: bool,

    #[arg(long = "format", value_enum)]
    /// Release message format. Overrides the configuration setting.
    pub message_format: Option<MessageFormat>,

    #[arg(long, default_value_t = false)]
    /// Print the release message without creating the tag.
    pub dry_run: bool,
}

/// Options for the `init` subcommand.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct InitArgs {
    #[arg(long, default_value_t = false)]
    /// Write the project configuration in the current directory instead of
    /// the global one.
    pub project: bool,

    #[arg(long, default_value_t = false)]
    /// Overwrite existing configuration and template files.
    pub force: bool,
}
