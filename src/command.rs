//! Subcommand implementations.
use crate::{
    cli::{Args, Command},
    error::Result,
};

pub mod init;
pub mod release;
pub mod show;

/// Dispatch the parsed CLI arguments to their subcommand.
pub fn execute(args: &Args) -> Result<()> {
    match &args.command {
        Command::Release(release_args) => release::execute(args, release_args),
        Command::Init(init_args) => init::execute(args, init_args),
    }
}
