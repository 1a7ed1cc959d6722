//! Show configuration command implementation.
use std::path::Path;

use crate::{
    config::{
        ReleaseConfig,
        loader::{self, ConfigPaths},
        message_format::MessageFormat,
    },
    error::Result,
};

fn describe_path(label: &str, path: &Path) -> String {
    let state = if path.exists() { "found" } else { "not found" };
    format!("{label}: {} ({state})", path.display())
}

/// Config file locations followed by the effective settings as YAML.
/// Secrets are masked.
pub fn describe(paths: &ConfigPaths, config: &ReleaseConfig) -> Result<String> {
    let yaml = serde_yaml::to_string(&config.to_layer())?;

    let out = format!(
        "{}\n{}\n\n{yaml}",
        describe_path("Global config", &paths.global),
        describe_path("Project config", &paths.project),
    );

    Ok(out)
}

/// Print the configuration paths and effective settings.
pub fn execute(
    paths: &ConfigPaths,
    message_format: Option<MessageFormat>,
) -> Result<()> {
    let config = loader::load(paths)?.with_message_format(message_format);
    print!("{}", describe(paths, &config)?);
    Ok(())
}
