use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::content::ContentSource;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub window: WindowConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub app_name: String,
    pub log_filter: String,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub tick_rate_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ContentConfig {
    pub page: String,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    ///
    /// `path` overrides the user config location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let user_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.exists()),
        };

        let user = match user_path.as_ref() {
            Some(path) => Some(
                fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?,
            ),
            None => None,
        };

        let config = Self::from_layers(user.as_deref())?;
        tracing::debug!(?user_path, "configuration loaded");
        Ok(config)
    }

    /// Merge a user TOML document over the bundled defaults, table by table.
    pub fn from_layers(user: Option<&str>) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;

        if let Some(user) = user {
            let overlay: toml::Table = toml::from_str(user).context("parsing user config")?;
            merge_tables(&mut merged, overlay);
        }

        let mut config: AppConfig = toml::Value::Table(merged).try_into()?;

        // Expand ~ in the page path
        if config.content.page.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.content.page = config
                .content
                .page
                .replacen('~', &home.to_string_lossy(), 1);
        }

        Ok(config)
    }

    pub fn content_source(&self) -> ContentSource {
        let page = self.content.page.trim();
        if page.is_empty() {
            ContentSource::Bundled
        } else {
            ContentSource::File(PathBuf::from(page))
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.window.tick_rate_ms.max(10))
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let incoming = match value {
            toml::Value::Table(incoming) => incoming,
            other => {
                base.insert(key, other);
                continue;
            }
        };

        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }

        base.insert(key, toml::Value::Table(incoming));
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "axion")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_bundled_page() {
        let config = AppConfig::from_layers(None).unwrap();
        assert_eq!(config.general.app_name, "Axion");
        assert_eq!(config.content_source(), ContentSource::Bundled);
        assert_eq!(config.tick_rate(), Duration::from_millis(250));
    }

    #[test]
    fn user_layer_overrides_single_keys() {
        let config = AppConfig::from_layers(Some(
            r#"
[window]
title = "Scratch"

[content]
page = "/srv/axion/page.toml"
"#,
        ))
        .unwrap();

        assert_eq!(config.window.title, "Scratch");
        assert_eq!(config.window.tick_rate_ms, 250);
        assert_eq!(config.general.app_name, "Axion");
        assert_eq!(
            config.content_source(),
            ContentSource::File(PathBuf::from("/srv/axion/page.toml"))
        );
    }

    #[test]
    fn tick_rate_has_a_floor() {
        let config = AppConfig::from_layers(Some("[window]\ntick_rate_ms = 0\n")).unwrap();
        assert_eq!(config.tick_rate(), Duration::from_millis(10));
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(AppConfig::from_layers(Some("[window]\ntick_rate_ms = \"fast\"\n")).is_err());
    }

    #[test]
    fn load_reads_an_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\napp_name = \"Custom\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.general.app_name, "Custom");
        assert_eq!(config.general.log_filter, "axion_host=info,axion=info");
    }

    #[test]
    fn load_fails_for_a_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
