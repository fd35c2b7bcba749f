// Configuration
//
// Loaded in order of precedence:
// 1. Environment variables (highest priority)
// 2. Config file (~/.config/parlor/config.toml)
// 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default delay before the single bootstrap focus retry
const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Delay before the one-shot focus retry when no window is open at start
    pub retry_delay_ms: u64,

    /// Demo mode: run the built-in mock conversation feed
    pub demo_mode: bool,

    /// Feature flags for optional behaviors
    pub features: Features,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            demo_mode: false,
            features: Features::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Feature flags (opt-out: default enabled)
#[derive(Debug, Clone)]
pub struct Features {
    /// Wrap bare URLs in topics and messages in anchors
    pub linkify: bool,

    /// Re-sort panes most-recently-active first after each activation
    pub mru_reorder: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            linkify: true,
            mru_reorder: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    pub level: String,

    /// Also write logs to rotating files
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
    pub file_rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_prefix: "parlor".to_string(),
            file_rotation: LogRotation::Daily,
        }
    }
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    fn as_str(&self) -> &'static str {
        match self {
            LogRotation::Hourly => "hourly",
            LogRotation::Daily => "daily",
            LogRotation::Never => "never",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File format (everything optional, merged over defaults)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub retry_delay_ms: Option<u64>,
    pub demo: Option<bool>,
    pub features: Option<FileFeatures>,
    pub logging: Option<FileLogging>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFeatures {
    pub linkify: Option<bool>,
    pub mru_reorder: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<PathBuf>,
    pub file_prefix: Option<String>,
    pub file_rotation: Option<LogRotation>,
}

impl Config {
    /// Path of the config file (~/.config/parlor/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parlor").join("config.toml"))
    }

    /// Write the default config template if no file exists yet,
    /// so users can discover the available options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let _ = std::fs::write(&path, Config::default().to_toml());
    }

    /// Load config: env > file > defaults
    pub fn from_env() -> Self {
        let file = Self::config_path()
            .filter(|path| path.exists())
            .and_then(|path| match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<FileConfig>(&text) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        // Tracing is not initialized yet at this point
                        eprintln!("Warning: ignoring malformed {}: {}", path.display(), e);
                        None
                    }
                },
                Err(_) => None,
            });

        let mut config = Self::from_sources(file);

        if let Ok(ms) = std::env::var("PARLOR_RETRY_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.retry_delay_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("PARLOR_DEMO") {
            config.demo_mode = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(level) = std::env::var("PARLOR_LOG_LEVEL") {
            config.logging.level = level;
        }

        config
    }

    /// Merge a parsed file config over the defaults
    pub fn from_sources(file: Option<FileConfig>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Config::default();

        let features = file.features.unwrap_or_default();
        let logging = file.logging.unwrap_or_default();

        Self {
            retry_delay_ms: file.retry_delay_ms.unwrap_or(defaults.retry_delay_ms),
            demo_mode: file.demo.unwrap_or(defaults.demo_mode),
            features: Features {
                linkify: features.linkify.unwrap_or(defaults.features.linkify),
                mru_reorder: features.mru_reorder.unwrap_or(defaults.features.mru_reorder),
            },
            logging: LoggingConfig {
                level: logging.level.unwrap_or(defaults.logging.level),
                file_enabled: logging
                    .file_enabled
                    .unwrap_or(defaults.logging.file_enabled),
                file_dir: logging.file_dir.unwrap_or(defaults.logging.file_dir),
                file_prefix: logging.file_prefix.unwrap_or(defaults.logging.file_prefix),
                file_rotation: logging
                    .file_rotation
                    .unwrap_or(defaults.logging.file_rotation),
            },
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Serialize to the commented config file template.
    /// Single source of truth for the file format.
    pub fn to_toml(&self) -> String {
        format!(
            r#"# parlor configuration
# Precedence: environment variables > this file > defaults

# Delay (ms) before the single focus retry when no chat window
# is open yet at startup
retry_delay_ms = {retry}

# Run the built-in mock conversation feed
demo = {demo}

[features]
linkify = {linkify}          # wrap bare URLs in topics/messages in anchors
mru_reorder = {mru}      # keep panes ordered most-recently-active first

[logging]
level = "{level}"
file_enabled = {file_enabled}
file_dir = "{file_dir}"
file_prefix = "{file_prefix}"
file_rotation = "{file_rotation}"   # "hourly", "daily", or "never"
"#,
            retry = self.retry_delay_ms,
            demo = self.demo_mode,
            linkify = self.features.linkify,
            mru = self.features.mru_reorder,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display(),
            file_prefix = self.logging.file_prefix,
            file_rotation = self.logging.file_rotation.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(None);
        assert_eq!(config.retry_delay_ms, 2000);
        assert!(!config.demo_mode);
        assert!(config.features.linkify);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_merges_over_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            retry_delay_ms = 500

            [features]
            linkify = false
            "#,
        )
        .unwrap();

        let config = Config::from_sources(Some(file));
        assert_eq!(config.retry_delay_ms, 500);
        assert!(!config.features.linkify);
        // Untouched values stay at defaults
        assert!(config.features.mru_reorder);
        assert_eq!(config.logging.file_prefix, "parlor");
    }

    #[test]
    fn test_rotation_parses_lowercase() {
        let file: FileConfig = toml::from_str(
            r#"
            [logging]
            file_rotation = "hourly"
            "#,
        )
        .unwrap();
        let config = Config::from_sources(Some(file));
        assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
    }

    #[test]
    fn test_template_round_trips() {
        let config = Config::default();
        let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
        let reparsed = Config::from_sources(Some(file));
        assert_eq!(reparsed.retry_delay_ms, config.retry_delay_ms);
        assert_eq!(reparsed.features.linkify, config.features.linkify);
        assert_eq!(reparsed.logging.file_rotation, config.logging.file_rotation);
    }
}
