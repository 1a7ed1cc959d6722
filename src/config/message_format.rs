//! Output format of the rendered release message.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported release message formats.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[default]
    Markdown,
    Plain,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Markdown => "markdown",
            MessageFormat::Plain => "plain",
        }
    }

    /// Template file name for this format inside the templates directory.
    pub fn template_file_name(&self) -> String {
        format!("{}.template", self.as_str())
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
