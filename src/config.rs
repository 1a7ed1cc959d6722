//! Configuration for git-release-helper.
//!
//! Settings come from YAML files: a global file in the user's home directory
//! and an optional project file in the working directory. Each file is read
//! into a [`ConfigLayer`] whose keys are all optional; project keys override
//! global keys one by one and anything still unset falls back to the
//! built-in defaults. The result is validated into an immutable
//! [`ReleaseConfig`] that is passed explicitly through a run.
use merge::Merge;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    config::{
        crm::{CrmConfig, CrmLayer},
        message_format::MessageFormat,
    },
    error::{ReleaseHelperError, Result},
    tag::TagFormat,
    ticket::TicketExtractor,
};

pub mod crm;
pub mod loader;
pub mod message_format;

/// Branches releases are expected to be cut from.
pub const DEFAULT_BRANCHES: [&str; 2] = ["main", "master"];
/// Expected shape of commit messages, shown as a hint.
pub const DEFAULT_COMMIT_MESSAGE_FORMAT: &str = "TICKET_NAME: Commit message";
/// Regex matching ticket identifiers.
pub const DEFAULT_TICKET_PATTERN: &str = "ALLI-[0-9]+";
/// Tag format used when generating tags.
pub const DEFAULT_TAG_FORMAT: &str = "YYYYMMDD.N";
/// Directory holding `<format>.template` files.
pub const DEFAULT_TEMPLATES_DIR: &str = "~/.git-release-helper/templates";

/// One configuration file's worth of settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Merge)]
pub struct ConfigLayer {
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branches: Option<Vec<String>>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message_format: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_pattern: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_format: Option<String>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_aliases: Option<BTreeMap<String, String>>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_format: Option<MessageFormat>,
    #[merge(strategy = merge::option::overwrite_none)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<String>,
    #[merge(strategy = merge::option::recurse)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crm: Option<CrmLayer>,
}

impl ConfigLayer {
    /// Layer holding every built-in default, as written by `init`.
    pub fn defaults() -> Self {
        Self {
            default_branches: Some(
                DEFAULT_BRANCHES.iter().map(|b| b.to_string()).collect(),
            ),
            commit_message_format: Some(DEFAULT_COMMIT_MESSAGE_FORMAT.into()),
            ticket_pattern: Some(DEFAULT_TICKET_PATTERN.into()),
            tag_format: Some(DEFAULT_TAG_FORMAT.into()),
            project_aliases: Some(BTreeMap::new()),
            message_format: Some(MessageFormat::default()),
            templates_dir: Some(DEFAULT_TEMPLATES_DIR.into()),
            crm: None,
        }
    }

    /// Overlay `self` (higher priority) on top of `lower`.
    pub fn layered_over(mut self, lower: ConfigLayer) -> Self {
        self.merge(lower);
        self
    }

    /// Fill a missing crm api key from the environment.
    pub fn with_env_api_key(mut self, api_key: Option<String>) -> Self {
        if let Some(crm) = self.crm.as_mut()
            && crm.api_key.is_none()
        {
            crm.api_key = api_key;
        }
        self
    }
}

/// Effective, validated settings for a single run.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub default_branches: Vec<String>,
    pub commit_message_format: String,
    pub ticket_pattern: String,
    pub tag_format: String,
    pub message_format: MessageFormat,
    pub templates_dir: PathBuf,
    pub project_aliases: BTreeMap<String, String>,
    pub crm: Option<CrmConfig>,
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Some(rest), Some(home))
            if rest.is_empty() || rest.starts_with('/') =>
        {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

impl ReleaseConfig {
    /// Validate a fully layered configuration. Unset keys take defaults.
    pub fn from_layer(layer: ConfigLayer, home: Option<&Path>) -> Result<Self> {
        let layer = layer.layered_over(ConfigLayer::defaults());

        let default_branches: Vec<String> = layer
            .default_branches
            .unwrap_or_default()
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        if default_branches.is_empty() {
            return Err(ReleaseHelperError::invalid_config(
                "default_branches must list at least one branch",
            ));
        }

        let ticket_pattern = layer
            .ticket_pattern
            .unwrap_or_else(|| DEFAULT_TICKET_PATTERN.into());
        TicketExtractor::new(&ticket_pattern)?;

        let tag_format =
            layer.tag_format.unwrap_or_else(|| DEFAULT_TAG_FORMAT.into());
        TagFormat::parse(&tag_format)?;

        let templates_dir = layer
            .templates_dir
            .unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.into());

        let crm = layer.crm.map(CrmConfig::from_layer).transpose()?;

        Ok(Self {
            default_branches,
            commit_message_format: layer
                .commit_message_format
                .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE_FORMAT.into()),
            ticket_pattern,
            tag_format,
            message_format: layer.message_format.unwrap_or_default(),
            templates_dir: expand_home(&templates_dir, home),
            project_aliases: layer.project_aliases.unwrap_or_default(),
            crm,
        })
    }

    /// Copy of this config rendering messages in `format`.
    pub fn with_message_format(self, format: Option<MessageFormat>) -> Self {
        match format {
            Some(message_format) => Self {
                message_format,
                ..self
            },
            None => self,
        }
    }

    pub fn is_default_branch(&self, branch: &str) -> bool {
        self.default_branches.iter().any(|b| b == branch)
    }

    /// Display name for a repository directory name.
    pub fn project_display_name(&self, repo_name: &str) -> String {
        self.project_aliases
            .get(repo_name)
            .cloned()
            .unwrap_or_else(|| repo_name.to_string())
    }

    /// Layer describing this config, with secrets masked.
    pub fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            default_branches: Some(self.default_branches.clone()),
            commit_message_format: Some(self.commit_message_format.clone()),
            ticket_pattern: Some(self.ticket_pattern.clone()),
            tag_format: Some(self.tag_format.clone()),
            project_aliases: Some(self.project_aliases.clone()),
            message_format: Some(self.message_format),
            templates_dir: Some(self.templates_dir.display().to_string()),
            crm: self.crm.as_ref().map(CrmConfig::to_masked_layer),
        }
    }
}
