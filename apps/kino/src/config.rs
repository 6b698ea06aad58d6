use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};

pub const CONFIG_FILE: &str = "kino.toml";
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8080/";
pub const PRODUCTION_API_URL: &str = "https://reel-movie-api-608b8b4b3a04.herokuapp.com/";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    pub fn default_api_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_API_URL,
            Self::Production => PRODUCTION_API_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile: Profile,
    pub api_url: String,
    pub session_path: PathBuf,
    pub log_filter: String,
}

/// Values given on the command line; they win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub api_url: Option<String>,
    pub session_path: Option<PathBuf>,
    pub production: bool,
}

/// Layers, lowest first: built-in defaults, `kino.toml`, environment, flags.
/// The API URL falls back to the selected profile's endpoint when no layer
/// names one.
#[derive(Debug, Default)]
struct Layered {
    profile: Option<Profile>,
    api_url: Option<String>,
    session_path: Option<PathBuf>,
    log_filter: Option<String>,
}

pub fn load_settings(overrides: &Overrides) -> anyhow::Result<Settings> {
    load_settings_with(overrides, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut layered = Layered::default();

    let (config_path, required) = match &overrides.config_path {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(CONFIG_FILE), false),
    };
    if let Some(file_cfg) = read_config_file(&config_path, required)? {
        apply_file(&mut layered, &file_cfg)?;
    }

    apply_env(&mut layered, &env)?;

    if overrides.production {
        layered.profile = Some(Profile::Production);
    }
    if let Some(v) = &overrides.api_url {
        layered.api_url = Some(v.clone());
    }
    if let Some(v) = &overrides.session_path {
        layered.session_path = Some(v.clone());
    }

    let profile = layered.profile.unwrap_or_default();
    let session_path = match layered.session_path {
        Some(path) => path,
        None => default_session_path()?,
    };

    Ok(Settings {
        profile,
        api_url: layered
            .api_url
            .unwrap_or_else(|| profile.default_api_url().to_string()),
        session_path,
        log_filter: layered
            .log_filter
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
    })
}

fn read_config_file(path: &Path, required: bool) -> anyhow::Result<Option<HashMap<String, String>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config '{}'", path.display()))
        }
    };
    let parsed = toml::from_str::<HashMap<String, String>>(&raw)
        .with_context(|| format!("config '{}' must be a flat table of strings", path.display()))?;
    Ok(Some(parsed))
}

fn apply_file(layered: &mut Layered, file_cfg: &HashMap<String, String>) -> anyhow::Result<()> {
    if let Some(v) = file_cfg.get("profile") {
        layered.profile = Some(parse_profile(v, "kino.toml")?);
    }
    if let Some(v) = file_cfg.get("api_url") {
        layered.api_url = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("session_path") {
        layered.session_path = Some(PathBuf::from(v));
    }
    if let Some(v) = file_cfg.get("log_filter") {
        layered.log_filter = Some(v.clone());
    }
    Ok(())
}

fn apply_env(layered: &mut Layered, env: &impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
    if let Some(v) = env("APP__PROFILE") {
        layered.profile = Some(parse_profile(&v, "APP__PROFILE")?);
    }

    if let Some(v) = env("KINO_API_URL") {
        layered.api_url = Some(v);
    }
    if let Some(v) = env("APP__API_URL") {
        layered.api_url = Some(v);
    }

    if let Some(v) = env("KINO_SESSION_PATH") {
        layered.session_path = Some(PathBuf::from(v));
    }
    if let Some(v) = env("APP__SESSION_PATH") {
        layered.session_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        layered.log_filter = Some(v);
    }
    Ok(())
}

fn parse_profile(raw: &str, source: &str) -> anyhow::Result<Profile> {
    match Profile::parse(raw) {
        Some(profile) => Ok(profile),
        None => bail!("{source}: unknown profile '{raw}' (expected development or production)"),
    }
}

fn default_session_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("unable to resolve local app data dir; set APP__SESSION_PATH"))?;
    Ok(base.join("kino").join("session.json"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
