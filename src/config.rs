//! Settings for the `cmdtree` binary, loaded in layers
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/cmdtree/cmdtree.toml`
//! 3. Local config: `<working_dir>/.cmdtree.toml`
//! 4. Environment variables: `CMDTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::PackageInfo;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory the command tree is discovered from
    pub commands_dir: Option<PathBuf>,
    /// Program name (defaults to the binary's package name)
    pub name: Option<String>,
    /// Program version reported by `--version`
    pub version: Option<String>,
}

/// Get the XDG config directory for cmdtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cmdtree").map(|dirs| dirs.config_dir().to_path_buf())
}

pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cmdtree.toml"))
}

pub fn local_config_path(working_dir: &Path) -> PathBuf {
    working_dir.join(".cmdtree.toml")
}

impl Settings {
    /// Load settings with layered precedence from the standard locations.
    pub fn load(working_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let global = global_config_path();
        let local = working_dir.map(local_config_path);
        Self::load_from(global.as_deref(), local.as_deref())
    }

    /// Load settings from explicit file locations; absent files are skipped.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        for path in [global, local].into_iter().flatten() {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("CMDTREE")
                .separator("__")
                .try_parsing(false),
        );

        let mut settings: Self = builder.build()?.try_deserialize()?;
        settings.expand_paths();
        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.commands_dir {
            let raw = dir.to_string_lossy();
            if let Ok(expanded) = shellexpand::full(&raw) {
                self.commands_dir = Some(PathBuf::from(expanded.into_owned()));
            }
        }
    }

    /// Host package identity, with settings overriding the compiled values.
    pub fn package(&self, name: &str, version: &str) -> PackageInfo {
        PackageInfo::new(
            self.name.clone().unwrap_or_else(|| name.to_string()),
            Some(self.version.clone().unwrap_or_else(|| version.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(None, Some(&local_config_path(dir.path()))).unwrap();
        assert_eq!(settings.name, None);
        assert_eq!(settings.version, None);
    }

    #[test]
    fn given_global_and_local_config_when_loading_then_local_wins() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        std::fs::write(&global, "name = \"global\"\nversion = \"1.0.0\"\n").unwrap();
        let local = local_config_path(dir.path());
        std::fs::write(&local, "name = \"local\"\n").unwrap();

        let settings = Settings::load_from(Some(&global), Some(&local)).unwrap();

        assert_eq!(settings.name.as_deref(), Some("local"));
        assert_eq!(settings.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn given_tilde_in_commands_dir_when_loading_then_expands_to_home() {
        let dir = TempDir::new().unwrap();
        let local = local_config_path(dir.path());
        std::fs::write(&local, "commands_dir = \"~/commands\"\n").unwrap();

        let settings = Settings::load_from(None, Some(&local)).unwrap();

        let home = std::env::var("HOME").expect("HOME should be set");
        let commands_dir = settings.commands_dir.unwrap();
        assert!(commands_dir.starts_with(&home));
        assert!(!commands_dir.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_settings_when_resolving_package_then_overrides_apply() {
        let settings = Settings {
            name: Some("dnsctl".into()),
            ..Settings::default()
        };
        let package = settings.package("cmdtree", "0.3.0");
        assert_eq!(package.name, "dnsctl");
        assert_eq!(package.version.as_deref(), Some("0.3.0"));
    }
}
