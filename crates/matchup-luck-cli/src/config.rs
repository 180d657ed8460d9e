// Configuration loading and parsing (league.toml, settings.toml, credentials.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use matchup_luck_core::{Aggregation, ByePolicy, Direction};
use matchup_luck_espn::EspnCookies;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub luck: LuckSettings,
    /// Category abbreviation → direction, overriding ESPN's reverse flag.
    pub directions: HashMap<String, Direction>,
    pub espn: EspnSettings,
    pub paths: PathSettings,
    pub cache: CacheSettings,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
    #[serde(default)]
    luck: LuckSettings,
    #[serde(default)]
    categories: CategoriesSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub league_id: String,
    pub season: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LuckSettings {
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub bye_policy: ByePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CategoriesSection {
    #[serde(default)]
    directions: HashMap<String, Direction>,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    espn: EspnSettings,
    paths: PathSettings,
    #[serde(default)]
    cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspnSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    pub cache_dir: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub espn_s2: Option<String>,
    pub swid: Option<String>,
}

impl CredentialsConfig {
    /// Both cookies, or `None` when either is missing or blank.
    pub fn cookies(&self) -> Option<EspnCookies> {
        let espn_s2 = self.espn_s2.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let swid = self.swid.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(EspnCookies {
            espn_s2: espn_s2.to_string(),
            swid: swid.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml`,
/// `config/settings.toml`, and (optionally) `config/credentials.toml`,
/// all relative to `base_dir`. Does not copy defaults.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_file: LeagueFile = read_toml(&config_dir.join("league.toml"))?;
    let settings_file: SettingsFile = read_toml(&config_dir.join("settings.toml"))?;

    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        read_toml(&credentials_path)?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        league: league_file.league,
        luck: league_file.luck,
        directions: league_file.categories.directions,
        espn: settings_file.espn,
        paths: settings_file.paths,
        cache: settings_file.cache,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| ConfigError::DefaultsCopyError {
                message: format!("failed to read defaults entry: {e}"),
            })?
            .path();

        let Some(file_name) = path.file_name().filter(|_| path.is_file()) else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if copy_if_absent(&path, &target)? {
            copied.push(target);
        }
    }

    copied.sort();
    Ok(copied)
}

/// Load config relative to the current working directory, copying defaults
/// into `config/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Copy `source` to `target` unless `target` already exists. Creation and
/// the existence check are one atomic `create_new` open.
fn copy_if_absent(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ConfigError::DefaultsCopyError {
                message: format!("failed to create {}: {e}", target.display()),
            })
        }
    };

    let content = std::fs::read(source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read {}: {e}", source.display()),
    })?;
    dest.write_all(&content).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to write {}: {e}", target.display()),
    })?;
    Ok(true)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// League ids are ESPN's numeric identifiers.
pub fn validate_league_id(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("must be a numeric league id, got {value:?}"),
        });
    }
    Ok(())
}

pub fn validate_season(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("must be a four-digit year, got {value:?}"),
        });
    }
    Ok(())
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_league_id("league.league_id", &config.league.league_id)?;
    validate_season("league.season", &config.league.season)?;

    let base_url = config.espn.base_url.trim();
    let host = base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"))
        .unwrap_or_default();
    if host.trim_matches('/').is_empty() {
        return Err(ConfigError::ValidationError {
            field: "espn.base_url".into(),
            message: format!("must be an http(s) URL, got {:?}", config.espn.base_url),
        });
    }

    let path_fields: &[(&str, &str)] = &[
        ("paths.cache_dir", &config.paths.cache_dir),
        ("paths.output_dir", &config.paths.output_dir),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
