//! Runtime configuration: an optional TOML file overlaid by environment
//! variables. Empty values count as absent everywhere.

use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "fort-flora.toml";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_LOG_FILTER: &str = "fort_flora=info,fort_nexus=info";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read config file {}", path.display()))]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to parse config file {}", path.display()))]
    ParseToml { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    supabase: SupabaseSection,
    groq: GroqSection,
    state_dir: Option<PathBuf>,
    log: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SupabaseSection {
    url: Option<String>,
    anon_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroqSection {
    api_key: Option<String>,
    model: Option<String>,
}

/// Gateway endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Completion service credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` when either the URL or the key is missing.
    pub supabase: Option<SupabaseConfig>,
    /// `None` without an API key.
    pub groq: Option<GroqConfig>,
    /// Where `local-storage.json` and the log file live.
    pub state_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Load from `FORT_FLORA_CONFIG` (or `fort-flora.toml` when present) and
    /// the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        let path = env("FORT_FLORA_CONFIG")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let contents = match path {
            Some(path) => Some((read(&path)?, path)),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Some((read(&path)?, path))
                } else {
                    None
                }
            }
        };

        match contents {
            Some((text, path)) => Self::from_sources(Some(&text), env).context(ParseTomlSnafu { path }),
            None => Self::from_sources(None, env).context(ParseTomlSnafu {
                path: PathBuf::from(DEFAULT_CONFIG_FILE),
            }),
        }
    }

    /// Build from TOML text and an environment lookup. Environment values
    /// win over the file.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, toml::de::Error> {
        let file: FileConfig = match toml_text {
            Some(text) => toml::from_str(text)?,
            None => FileConfig::default(),
        };
        let pick = |key: &str, fallback: Option<String>| present(env(key)).or_else(|| present(fallback));

        let url = pick("SUPABASE_URL", file.supabase.url);
        let anon_key = pick("SUPABASE_ANON_KEY", file.supabase.anon_key);
        let supabase = match (url, anon_key) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        let groq = pick("GROQ_API_KEY", file.groq.api_key).map(|api_key| GroqConfig {
            api_key,
            model: pick("GROQ_MODEL", file.groq.model).unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
        });

        let state_dir = pick(
            "FORT_FLORA_STATE_DIR",
            file.state_dir.map(|dir| dir.to_string_lossy().into_owned()),
        )
        .map(PathBuf::from)
        .unwrap_or_else(default_state_dir);

        let log_filter = pick("FORT_FLORA_LOG", file.log).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            supabase,
            groq,
            state_dir,
            log_filter,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).context(ReadFileSnafu { path })
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".fort-flora"))
        .unwrap_or_else(|| PathBuf::from(".fort-flora"))
}
