mod config;
mod run;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use favbadge_core::{FavError, FavResult};

pub use config::{
    BadgeConfig, FavbadgeConfig, OutputConfig, ProvidersConfig, RepositoryConfig, ScraperConfig,
};
pub use run::{
    DEFAULT_LASTFM_PERIOD, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, LASTFM_PERIODS, RunConfig,
    RunOptions, apply_fallback_order, parse_duration, resolve_run, resolve_run_with_env,
};

/// Every key accepted by `config get` / `config set`.
pub const CONFIG_KEYS: [&str; 20] = [
    "providers.youtube_channel_id",
    "providers.lastfm_username",
    "providers.lastfm_period",
    "providers.lastfm_api_key",
    "providers.fallback",
    "scraper.user_agent",
    "scraper.timeout",
    "scraper.chrome_executable",
    "badge.message_color",
    "badge.style",
    "badge.logo",
    "badge.logo_color",
    "badge.logo_size",
    "badge.label_color",
    "badge.color",
    "badge.cache_seconds",
    "repository.remote",
    "repository.filename",
    "repository.scratch_dir",
    "output.simple",
];

pub fn config_path() -> FavResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FavError::Config("home directory not found".to_string()))?;
    Ok(home.join(".favbadge").join("config.toml"))
}

pub fn load_config() -> FavResult<FavbadgeConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> FavResult<FavbadgeConfig> {
    if !path.exists() {
        return Ok(FavbadgeConfig::default());
    }
    let content = fs::read_to_string(path)
        .map_err(|err| FavError::Config(format!("failed to read config: {err}")))?;
    let config = toml::from_str(&content)
        .map_err(|err| FavError::Config(format!("failed to parse config: {err}")))?;
    Ok(config)
}

/// Written when `config edit` opens a file that does not exist yet.
pub const CONFIG_TEMPLATE: &str = r#"# favbadge configuration, command line flags win over these values.

[providers]
# youtube_channel_id = "UC..."
# lastfm_username = "someone"
# lastfm_period = "7day"
# lastfm_api_key = "..."   # LAST_FM_API_KEY takes precedence
# fallback = "youtube,lastfm"

[scraper]
# user_agent = "Mozilla/5.0 ..."
# timeout = "60s"
# chrome_executable = "/usr/bin/chromium"

[badge]
# an empty string drops a default, e.g. logo = ""
# message_color = "mistyrose"
# style = "for-the-badge"
# logo = "youtube-music"
# logo_color = "white"
# logo_size = "auto"
# label_color = "darkred"
# color = "blue"
# cache_seconds = "3600"

[repository]
# remote = "https://github.com/someone/someone.git"
# filename = "README.md"
# scratch_dir = "./repository_to_modify"

[output]
# simple = false
"#;

fn write_config(path: &Path, content: &str) -> FavResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| FavError::Config(format!("failed to create config dir: {err}")))?;
    }
    fs::write(path, content)
        .map_err(|err| FavError::Config(format!("failed to write config: {err}")))
}

pub fn config_exists() -> FavResult<bool> {
    let path = config_path()?;
    Ok(path.exists())
}

pub fn get_config_value(config: &FavbadgeConfig, key_path: &str) -> FavResult<Option<String>> {
    let parts: Vec<&str> = key_path.split('.').collect();
    let providers = &config.providers;
    let scraper = &config.scraper;
    let badge = &config.badge;
    let repository = &config.repository;

    let value = match parts.as_slice() {
        ["providers", "youtube_channel_id"] => providers.youtube_channel_id.clone(),
        ["providers", "lastfm_username"] => providers.lastfm_username.clone(),
        ["providers", "lastfm_period"] => providers.lastfm_period.clone(),
        ["providers", "lastfm_api_key"] => providers.lastfm_api_key.clone(),
        ["providers", "fallback"] => providers.fallback.clone(),
        ["scraper", "user_agent"] => scraper.user_agent.clone(),
        ["scraper", "timeout"] => scraper.timeout.clone(),
        ["scraper", "chrome_executable"] => scraper.chrome_executable.clone(),
        ["badge", "message_color"] => badge.message_color.clone(),
        ["badge", "style"] => badge.style.clone(),
        ["badge", "logo"] => badge.logo.clone(),
        ["badge", "logo_color"] => badge.logo_color.clone(),
        ["badge", "logo_size"] => badge.logo_size.clone(),
        ["badge", "label_color"] => badge.label_color.clone(),
        ["badge", "color"] => badge.color.clone(),
        ["badge", "cache_seconds"] => badge.cache_seconds.clone(),
        ["repository", "remote"] => repository.remote.clone(),
        ["repository", "filename"] => repository.filename.clone(),
        ["repository", "scratch_dir"] => repository.scratch_dir.clone(),
        ["output", "simple"] => config.output.simple.map(|b| b.to_string()),
        _ => return Err(unknown_key(key_path)),
    };
    Ok(value)
}

pub fn set_config_value(key_path: &str, value: &str) -> FavResult<()> {
    let path = config_path()?;
    let content = if path.exists() {
        fs::read_to_string(&path)
            .map_err(|err| FavError::Config(format!("failed to read config: {err}")))?
    } else {
        String::new()
    };

    let updated = set_value_in_document(&content, key_path, value)?;
    write_config(&path, &updated)
}

/// Sets one key inside a TOML document, keeping its comments and layout.
fn set_value_in_document(content: &str, key_path: &str, value: &str) -> FavResult<String> {
    if !CONFIG_KEYS.contains(&key_path) {
        return Err(unknown_key(key_path));
    }
    let (section, key) = key_path
        .split_once('.')
        .ok_or_else(|| unknown_key(key_path))?;

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|err| FavError::Config(format!("failed to parse config: {err}")))?;

    let table = doc
        .as_table_mut()
        .entry(section)
        .or_insert(toml_edit::Item::Table(Default::default()))
        .as_table_mut()
        .ok_or_else(|| FavError::Config(format!("cannot set nested value in '{key_path}'")))?;

    table[key] = if key_path == "output.simple" {
        let flag = value.trim().parse::<bool>().map_err(|_| {
            FavError::Config(format!("'{key_path}' expects true or false, got '{value}'"))
        })?;
        toml_edit::value(flag)
    } else {
        toml_edit::value(value)
    };

    Ok(doc.to_string())
}

fn unknown_key(key_path: &str) -> FavError {
    FavError::Config(format!(
        "unknown config key '{key_path}', known keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

pub fn open_in_editor() -> FavResult<()> {
    let path = config_path()?;
    if !path.exists() {
        write_config(&path, CONFIG_TEMPLATE)?;
    }

    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string());

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .map_err(|err| FavError::Config(format!("failed to open editor '{editor}': {err}")))?;
    if !status.success() {
        return Err(FavError::Config(format!("editor '{editor}' exited with {status}")));
    }

    // catch typos before the next run trips over them
    load_config_from(&path).map(|_| ())
}

fn default_editor() -> &'static str {
    if cfg!(target_os = "windows") {
        "notepad"
    } else {
        "vi"
    }
}
