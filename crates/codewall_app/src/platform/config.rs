//! Host configuration loaded from `codewall.ron`.
//!
//! Every field is optional in the file; missing fields take their defaults.
//! The path can be overridden with the `CODEWALL_CONFIG` environment variable,
//! in which case the file must exist.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use codewall_core::{Viewport, DEFAULT_PERMALINK_BASE};
use codewall_engine::{EngineConfig, FetchSettings};
use serde::Deserialize;

use super::logging::LogDestination;

pub const CONFIG_FILENAME: &str = "codewall.ron";
pub const CONFIG_ENV: &str = "CODEWALL_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where `index.html` and `frame.png` are written.
    pub output_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Delay between animation frames.
    pub frame_interval_ms: u64,
    pub font_path: Option<PathBuf>,
    pub display_enabled: bool,
    pub permalink_base: String,
    pub log: LogDestination,
    pub fetch: FetchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            viewport_width: 1280,
            viewport_height: 720,
            frame_interval_ms: 100,
            font_path: None,
            display_enabled: true,
            permalink_base: DEFAULT_PERMALINK_BASE.to_string(),
            log: LogDestination::Both,
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width.max(1),
            height: self.viewport_height.max(1),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.fetch.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.fetch.request_timeout_secs),
                redirect_limit: self.fetch.redirect_limit,
                max_bytes: self.fetch.max_bytes,
                ..FetchSettings::default()
            },
            font_path: self.font_path.clone(),
            display_enabled: self.display_enabled,
        }
    }
}

/// Loads from `$CODEWALL_CONFIG`, else `./codewall.ron` if present, else defaults.
pub fn load() -> anyhow::Result<AppConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_from(Path::new(&path)),
        None => {
            let path = Path::new(CONFIG_FILENAME);
            if path.exists() {
                load_from(path)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn parse(text: &str) -> anyhow::Result<AppConfig> {
    Ok(ron::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_struct_gives_defaults() {
        assert_eq!(parse("()").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config = parse(
            r#"(
                output_dir: "wall",
                viewport_width: 640,
                font_path: Some("/fonts/mono.ttf"),
                log: Terminal,
                fetch: (max_bytes: 1024),
            )"#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("wall"));
        assert_eq!(config.viewport().width, 640);
        assert_eq!(config.viewport().height, 720);
        assert_eq!(config.log, LogDestination::Terminal);
        assert_eq!(config.fetch.max_bytes, 1024);
        assert_eq!(config.fetch.redirect_limit, 5);

        let engine = config.engine_config();
        assert_eq!(engine.fetch.max_bytes, 1024);
        assert_eq!(engine.font_path, Some(PathBuf::from("/fonts/mono.ttf")));
        assert!(engine.display_enabled);
    }

    #[test]
    fn unknown_log_destination_is_an_error() {
        assert!(parse("(log: Syslog)").is_err());
    }

    #[test]
    fn load_from_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "(frame_interval_ms: 40, display_enabled: false)").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(40));
        assert!(!config.engine_config().display_enabled);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from(&dir.path().join("absent.ron")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
