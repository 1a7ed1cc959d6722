pub mod cli;
pub mod command;
pub mod config;
pub mod crm;
pub mod error;
pub mod placeholder;
pub mod render;
pub mod repo;
pub mod tag;
pub mod ticket;

pub use cli::{Args, Command};
pub use error::{ReleaseHelperError, Result};

#[cfg(test)]
pub mod test_helpers;
