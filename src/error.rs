//! Custom error types for git-release-helper.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors fall into
//! a handful of categories (configuration, repository, template, ticket
//! tracker) and each category maps to its own process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for git-release-helper operations.
#[derive(Error, Debug)]
pub enum ReleaseHelperError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    // Repository errors
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("HEAD is detached: check out a branch before releasing")]
    DetachedHead,

    #[error(
        "Not on a default branch: current branch '{current}', default branches: {}",
        .defaults.join(", ")
    )]
    WrongBranch {
        current: String,
        defaults: Vec<String>,
    },

    #[error(
        "No commits found after {since}: nothing to release, create new commits first"
    )]
    NothingToRelease { since: String },

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    // Template errors
    #[error("Failed to read template {path}: {source}")]
    TemplateError {
        path: PathBuf,
        source: std::io::Error,
    },

    // Ticket tracker errors
    #[error("Ticket tracker request failed: {0}")]
    NetworkError(String),

    #[error("Ticket tracker authentication failed: {0}")]
    AuthenticationError(String),

    // Serialization errors
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),
}

/// Result type alias using ReleaseHelperError
pub type Result<T> = std::result::Result<T, ReleaseHelperError>;

/// Broad error categories surfaced to the user through the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Repository,
    Template,
    Crm,
    Other,
}

impl ReleaseHelperError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create a wrong branch error
    pub fn wrong_branch(
        current: impl Into<String>,
        defaults: &[String],
    ) -> Self {
        Self::WrongBranch {
            current: current.into(),
            defaults: defaults.to_vec(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgs(_)
            | Self::InvalidConfig(_)
            | Self::ConfigParseError { .. } => ErrorKind::Config,
            Self::NotARepository(_)
            | Self::DetachedHead
            | Self::WrongBranch { .. }
            | Self::NothingToRelease { .. }
            | Self::GitError(_) => ErrorKind::Repository,
            Self::TemplateError { .. } => ErrorKind::Template,
            Self::NetworkError(_) | Self::AuthenticationError(_) => {
                ErrorKind::Crm
            }
            Self::YamlError(_) | Self::IoError(_) | Self::LoggerError(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config => 2,
            ErrorKind::Repository => 3,
            ErrorKind::Template => 4,
            ErrorKind::Crm | ErrorKind::Other => 1,
        }
    }
}

// Implement From for reqwest errors (ticket tracker API)
impl From<reqwest::Error> for ReleaseHelperError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status()
            && (status.as_u16() == 401 || status.as_u16() == 403)
        {
            Self::AuthenticationError(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_branch_lists_default_branches() {
        let err = ReleaseHelperError::wrong_branch(
            "feature-x",
            &["main".to_string(), "master".to_string()],
        );

        assert_eq!(
            err.to_string(),
            "Not on a default branch: current branch 'feature-x', default branches: main, master"
        );
    }

    #[test]
    fn exit_codes_follow_error_category() {
        assert_eq!(ReleaseHelperError::invalid_config("x").exit_code(), 2);
        assert_eq!(ReleaseHelperError::invalid_args("x").exit_code(), 2);
        assert_eq!(ReleaseHelperError::DetachedHead.exit_code(), 3);
        assert_eq!(
            ReleaseHelperError::NothingToRelease {
                since: "tag 'v1'".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(
            ReleaseHelperError::TemplateError {
                path: PathBuf::from("markdown.template"),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }
            .exit_code(),
            4
        );
        assert_eq!(
            ReleaseHelperError::NetworkError("down".into()).exit_code(),
            1
        );
    }
}
