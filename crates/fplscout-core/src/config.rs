// Configuration loading and parsing (fplscout.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::player::Position;
use crate::scoring::ScoreWeights;

/// Environment variable consulted when credentials.toml has no API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing config file {path}")]
    FileNotFound { path: PathBuf },

    #[error("{path} is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("bad value for `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("could not populate config/ from defaults/: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub scoring: ScoreWeights,
    pub recommend: RecommendConfig,
    pub news: NewsConfig,
    pub fixtures: FixturesConfig,
    pub llm: LlmConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// fplscout.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire fplscout.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ScoutFile {
    api: ApiConfig,
    #[serde(default)]
    scoring: ScoreWeights,
    recommend: RecommendSection,
    news: NewsConfig,
    fixtures: FixturesConfig,
    llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RecommendSection {
    position: String,
    max_price: f64,
    top_n: usize,
}

/// Default shortlist parameters, overridable per request.
#[derive(Debug, Clone)]
pub struct RecommendConfig {
    pub position: Position,
    pub max_price: f64,
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    pub max_issues: usize,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixturesConfig {
    pub horizon: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub news_max_tokens: u32,
    pub recommend_max_tokens: u32,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/fplscout.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults and does not consult the environment; see
/// `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- fplscout.toml (required) ---
    let scout_path = config_dir.join("fplscout.toml");
    let scout_text = read_file(&scout_path)?;
    let file: ScoutFile = toml::from_str(&scout_text).map_err(|e| ConfigError::ParseError {
        path: scout_path.clone(),
        source: e,
    })?;

    let position = Position::from_str_pos(&file.recommend.position).ok_or_else(|| {
        ConfigError::ValidationError {
            field: "recommend.position".into(),
            message: format!(
                "must be one of GK, DEF, MID, FWD, got {:?}",
                file.recommend.position
            ),
        }
    })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        api: file.api,
        scoring: file.scoring,
        recommend: RecommendConfig {
            position,
            max_price: file.recommend.max_price,
            top_n: file.recommend.top_n,
        },
        news: file.news,
        fixtures: file.fixtures,
        llm: file.llm,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy every file in `defaults/` that is missing from `config/`.
///
/// Existing files are left alone and `*.example` templates are never copied.
/// Returns the paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(copy_error(format!(
                "{} has neither defaults/ nor config/; run from the project root or pass --root",
                base_dir.display()
            )))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let Some(name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if name.to_string_lossy().ends_with(".example") {
            continue;
        }
        let target = config_dir.join(name);
        if copy_if_absent(&source, &target)
            .map_err(|e| copy_error(format!("cannot copy to {}: {e}", target.display())))?
        {
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. Never
/// overwrites: existence check and create are a single `create_new` open.
fn copy_if_absent(source: &Path, target: &Path) -> std::io::Result<bool> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    dest.write_all(&std::fs::read(source)?)?;
    Ok(true)
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Load config relative to the current working directory. See
/// [`load_config_in`].
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_in(&cwd)
}

/// Copy missing defaults into `base_dir/config`, load it, and fall back to
/// `ANTHROPIC_API_KEY` when credentials.toml has no key.
pub fn load_config_in(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    let mut config = load_config_from(base_dir)?;
    if config.credentials.anthropic_api_key.is_none() {
        config.credentials.anthropic_api_key =
            std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.api.base_url.trim().is_empty() {
        return Err(invalid("api.base_url", "must not be empty".into()));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than 0".into()));
    }

    // Expected points must carry weight; the others may be switched off.
    let w = &config.scoring;
    if !(w.expected_points_weight > 0.0) {
        return Err(invalid(
            "scoring.expected_points_weight",
            format!("must be > 0, got {}", w.expected_points_weight),
        ));
    }
    let non_negative: &[(&str, f64)] = &[
        ("scoring.form_weight", w.form_weight),
        ("scoring.transfers_in_weight", w.transfers_in_weight),
    ];
    for (name, val) in non_negative {
        if !(*val >= 0.0) {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    if !(config.recommend.max_price >= 0.0) {
        return Err(invalid(
            "recommend.max_price",
            format!("must be >= 0, got {}", config.recommend.max_price),
        ));
    }

    let counts: &[(&str, u64)] = &[
        ("recommend.top_n", config.recommend.top_n as u64),
        ("news.max_issues", config.news.max_issues as u64),
        ("news.cache_ttl_secs", config.news.cache_ttl_secs),
        ("fixtures.horizon", u64::from(config.fixtures.horizon)),
    ];
    for (name, val) in counts {
        if *val == 0 {
            return Err(invalid(name, "must be > 0".into()));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
