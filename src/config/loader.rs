//! Locating, reading and writing configuration files.
use log::*;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{ConfigLayer, ReleaseConfig},
    error::{ReleaseHelperError, Result},
};

/// Directory under the home directory holding the global config.
pub const CONFIG_DIR_NAME: &str = ".git-release-helper";
/// Global configuration file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.yml";
/// Project configuration file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".git-release-helper.yml";
/// Environment variable consulted for the crm api key.
pub const API_KEY_ENV_VAR: &str = "JIRA_API_TOKEN";

/// Locations of the configuration files for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub global: PathBuf,
    pub project: PathBuf,
}

/// The user's home directory.
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
}

impl ConfigPaths {
    /// Resolve the config file locations. `global_override` replaces the
    /// default global path; the project file lives in `project_dir`.
    pub fn resolve(
        global_override: Option<&Path>,
        project_dir: &Path,
    ) -> Result<Self> {
        Self::resolve_with_home(
            global_override,
            project_dir,
            home_dir().as_deref(),
        )
    }

    fn resolve_with_home(
        global_override: Option<&Path>,
        project_dir: &Path,
        home: Option<&Path>,
    ) -> Result<Self> {
        let global = match (global_override, home) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(home)) => {
                home.join(CONFIG_DIR_NAME).join(GLOBAL_CONFIG_FILE)
            }
            (None, None) => {
                return Err(ReleaseHelperError::invalid_config(
                    "unable to determine home directory for global config",
                ));
            }
        };

        Ok(Self {
            global,
            project: project_dir.join(PROJECT_CONFIG_FILE),
        })
    }

    /// Resolve paths relative to the process working directory.
    pub fn from_current_dir(global_override: Option<&Path>) -> Result<Self> {
        Self::resolve(global_override, &env::current_dir()?)
    }
}

/// Read one configuration file. Missing files yield `None`; empty files an
/// empty layer.
pub fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    if !path.exists() {
        debug!("configuration file not found: {}", path.display());
        return Ok(None);
    }

    if path.is_dir() {
        return Err(ReleaseHelperError::invalid_config(format!(
            "configuration path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|err| {
        ReleaseHelperError::invalid_config(format!(
            "failed to read configuration file {}: {err}",
            path.display()
        ))
    })?;

    if content.trim().is_empty() {
        return Ok(Some(ConfigLayer::default()));
    }

    let layer: ConfigLayer = serde_yaml::from_str(&content).map_err(|source| {
        ReleaseHelperError::ConfigParseError {
            path: path.to_path_buf(),
            source,
        }
    })?;

    debug!("loaded configuration file: {}", path.display());

    Ok(Some(layer))
}

/// Load the effective configuration: project over global over defaults.
pub fn load(paths: &ConfigPaths) -> Result<ReleaseConfig> {
    load_with(paths, env::var(API_KEY_ENV_VAR).ok(), home_dir().as_deref())
}

pub(crate) fn load_with(
    paths: &ConfigPaths,
    env_api_key: Option<String>,
    home: Option<&Path>,
) -> Result<ReleaseConfig> {
    let global = read_layer(&paths.global)?.unwrap_or_default();

    let layer = match read_layer(&paths.project)? {
        Some(project) => {
            info!("using project configuration: {}", paths.project.display());
            project.layered_over(global)
        }
        None => global,
    };

    ReleaseConfig::from_layer(layer.with_env_api_key(env_api_key), home)
}

/// Write `layer` to `path` as YAML, creating parent directories.
///
/// Existing files are left untouched unless `overwrite` is set; returns
/// whether the file was written.
pub fn write_layer(
    path: &Path,
    layer: &ConfigLayer,
    overwrite: bool,
) -> Result<bool> {
    if path.exists() && !overwrite {
        return Ok(false);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = serde_yaml::to_string(layer)?;
    fs::write(path, content)?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    use super::*;
    use crate::config::message_format::MessageFormat;

    fn paths(dir: &TempDir) -> ConfigPaths {
        ConfigPaths::resolve(
            Some(&dir.path().join("global").join(GLOBAL_CONFIG_FILE)),
            &dir.path().join("project"),
        )
        .unwrap()
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = TempDir::new().unwrap();

        let config = load_with(&paths(&dir), None, None).unwrap();

        assert_eq!(config.default_branches, vec!["main", "master"]);
        assert_eq!(config.message_format, MessageFormat::Markdown);
    }

    #[test]
    fn project_file_overrides_global_file() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);

        write(
            &paths.global,
            "default_branches: [develop]\n\
             ticket_pattern: 'GLOB-[0-9]+'\n\
             message_format: plain\n\
             project_aliases:\n  web: Web App\n",
        );
        write(&paths.project, "ticket_pattern: 'PROJ-[0-9]+'\n");

        let config = load_with(&paths, None, None).unwrap();

        assert_eq!(config.default_branches, vec!["develop"]);
        assert_eq!(config.ticket_pattern, "PROJ-[0-9]+");
        assert_eq!(config.message_format, MessageFormat::Plain);
        assert_eq!(config.project_display_name("web"), "Web App");
    }

    #[test]
    fn empty_file_is_treated_as_empty_layer() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        write(&paths.global, "\n");

        let config = load_with(&paths, None, None).unwrap();

        assert_eq!(config.tag_format, "YYYYMMDD.N");
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        write(&paths.project, "default_branches: [main\n");

        let err = load_with(&paths, None, None).unwrap_err();

        assert!(matches!(err, ReleaseHelperError::ConfigParseError { .. }));
        assert!(err.to_string().contains(PROJECT_CONFIG_FILE));
    }

    #[test]
    fn wrong_value_type_is_config_error() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        write(&paths.global, "message_format: html\n");

        let err = load_with(&paths, None, None).unwrap_err();

        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn crm_api_key_falls_back_to_environment_value() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        write(
            &paths.global,
            "crm:\n  api_url: https://acme.atlassian.net\n  username: me\n",
        );

        let err = load_with(&paths, None, None).unwrap_err();
        assert!(err.to_string().contains("crm.api_key"));

        let config =
            load_with(&paths, Some("from-env".into()), None).unwrap();
        assert_eq!(config.crm.unwrap().connector, "jira");
    }

    #[test]
    fn directory_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let paths = paths(&dir);
        fs::create_dir_all(&paths.project).unwrap();

        let err = load_with(&paths, None, None).unwrap_err();

        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn write_layer_respects_overwrite_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(GLOBAL_CONFIG_FILE);

        assert!(write_layer(&path, &ConfigLayer::defaults(), false).unwrap());

        let custom = ConfigLayer {
            project_aliases: Some(BTreeMap::from([(
                "api".to_string(),
                "API".to_string(),
            )])),
            ..Default::default()
        };
        assert!(!write_layer(&path, &custom, false).unwrap());
        assert_eq!(read_layer(&path).unwrap(), Some(ConfigLayer::defaults()));

        assert!(write_layer(&path, &custom, true).unwrap());
        assert_eq!(read_layer(&path).unwrap(), Some(custom));
    }

    #[test]
    fn resolves_default_global_path_under_home() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");

        let paths =
            ConfigPaths::resolve_with_home(None, dir.path(), Some(&home))
                .unwrap();

        assert_eq!(
            paths.global,
            home.join(".git-release-helper").join("config.yml")
        );
        assert_eq!(paths.project, dir.path().join(PROJECT_CONFIG_FILE));
    }

    #[test]
    fn global_override_wins_over_home() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom.yml");

        let paths =
            ConfigPaths::resolve_with_home(Some(&custom), dir.path(), None)
                .unwrap();

        assert_eq!(paths.global, custom);
    }

    #[test]
    fn missing_home_without_override_is_config_error() {
        let dir = TempDir::new().unwrap();

        let err =
            ConfigPaths::resolve_with_home(None, dir.path(), None).unwrap_err();

        assert!(matches!(err, ReleaseHelperError::InvalidConfig(_)));
        assert!(err.to_string().contains("home directory"));
    }
}
