//! `init` command: write the default configuration and message templates.
use log::*;
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    cli::{Args, InitArgs},
    config::{
        ConfigLayer,
        loader::{self, API_KEY_ENV_VAR, ConfigPaths},
    },
    error::Result,
    render,
};

/// Files touched by an init run.
#[derive(Debug, Default)]
pub struct InitReport {
    pub config_path: PathBuf,
    /// False when an existing config file was kept.
    pub config_written: bool,
    pub templates_dir: PathBuf,
    pub templates_written: Vec<PathBuf>,
}

/// Execute the init command.
pub fn execute(args: &Args, init_args: &InitArgs) -> Result<()> {
    let paths = ConfigPaths::from_current_dir(args.config.as_deref())?;

    initialize(
        &paths,
        init_args.project,
        init_args.force,
        loader::home_dir().as_deref(),
    )?;

    Ok(())
}

/// Write the default config to the global file (or the project file when
/// `project` is set), then write the built-in templates into the
/// configured templates directory.
pub fn initialize(
    paths: &ConfigPaths,
    project: bool,
    overwrite: bool,
    home: Option<&Path>,
) -> Result<InitReport> {
    let config_path = if project {
        paths.project.clone()
    } else {
        paths.global.clone()
    };

    let config_written =
        loader::write_layer(&config_path, &ConfigLayer::defaults(), overwrite)?;

    if config_written {
        info!("wrote configuration: {}", config_path.display());
    } else {
        warn!(
            "configuration already exists, use --force to overwrite: {}",
            config_path.display()
        );
    }

    let config =
        loader::load_with(paths, env::var(API_KEY_ENV_VAR).ok(), home)?;

    let templates_written =
        render::write_default_templates(&config.templates_dir, overwrite)?;

    for path in templates_written.iter() {
        info!("wrote template: {}", path.display());
    }

    if templates_written.is_empty() {
        info!(
            "templates already present in {}",
            config.templates_dir.display()
        );
    }

    Ok(InitReport {
        config_path,
        config_written,
        templates_dir: config.templates_dir,
        templates_written,
    })
}
