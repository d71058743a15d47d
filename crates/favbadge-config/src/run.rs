use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use favbadge_badge::BadgeOptions;
use favbadge_core::{
    FavError, FavResult, ProviderKind, ProviderSpec, RepositoryTarget, move_provider_to_index,
    validate_url,
};
use regex::Regex;
use tracing::warn;

use crate::config::FavbadgeConfig;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:140.0) Gecko/20100101 Firefox/140.0";
pub const DEFAULT_TIMEOUT: &str = "60s";
pub const DEFAULT_LASTFM_PERIOD: &str = "7day";
/// Longest accepted timeout, the largest span a signed 64-bit nanosecond count holds.
pub const MAX_TIMEOUT: Duration = Duration::from_nanos(i64::MAX as u64);
pub const LASTFM_PERIODS: [&str; 6] = ["overall", "7day", "1month", "3month", "6month", "12month"];

const DEFAULT_STYLE: &str = "for-the-badge";
const DEFAULT_LOGO: &str = "youtube-music";
const DEFAULT_LABEL_COLOR: &str = "darkred";

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub user_agent: Option<String>,
    pub timeout: Option<String>,
    pub message_color: Option<String>,
    pub style: Option<String>,
    pub logo: Option<String>,
    pub logo_color: Option<String>,
    pub logo_size: Option<String>,
    pub label_color: Option<String>,
    pub color: Option<String>,
    pub cache_seconds: Option<String>,
    pub repository: Option<String>,
    pub filename: Option<String>,
    pub youtube_channel_id: Option<String>,
    /// Channel id passed positionally, the way older releases took it.
    pub legacy_channel_id: Option<String>,
    pub lastfm_username: Option<String>,
    pub lastfm_period: Option<String>,
    pub fallback: Option<String>,
    pub simple: bool,
}

/// Everything one run needs, validated.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub providers: Vec<ProviderSpec>,
    pub user_agent: String,
    pub timeout: Duration,
    pub badge: BadgeOptions,
    pub repository: Option<RepositoryTarget>,
    pub chrome_executable: Option<PathBuf>,
    pub simple: bool,
}

pub fn resolve_run(config: &FavbadgeConfig, options: RunOptions) -> FavResult<RunConfig> {
    resolve_run_with_env(config, options, |key| env::var(key).ok())
}

pub fn resolve_run_with_env<F>(
    config: &FavbadgeConfig,
    options: RunOptions,
    env_var: F,
) -> FavResult<RunConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let env_value = |key: &str| non_blank(env_var(key));

    let repository = resolve_repository(config, &options)?;
    let providers = resolve_providers(config, &options, &env_value)?;

    let user_agent = non_blank(options.user_agent.clone())
        .or_else(|| env_value("FAVBADGE_USER_AGENT"))
        .or_else(|| non_blank(config.scraper.user_agent.clone()))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let timeout = non_blank(options.timeout.clone())
        .or_else(|| env_value("FAVBADGE_TIMEOUT"))
        .or_else(|| non_blank(config.scraper.timeout.clone()))
        .unwrap_or_else(|| DEFAULT_TIMEOUT.to_string());
    let timeout = parse_duration(&timeout)?;

    let simple = options.simple
        || env_value("FAVBADGE_OUTPUT_SIMPLE")
            .map(|value| parse_flag(&value))
            .or(config.output.simple)
            .unwrap_or(false);

    Ok(RunConfig {
        providers,
        user_agent,
        timeout,
        badge: resolve_badge(config, &options),
        repository,
        chrome_executable: non_blank(config.scraper.chrome_executable.clone()).map(PathBuf::from),
        simple,
    })
}

fn resolve_repository(
    config: &FavbadgeConfig,
    options: &RunOptions,
) -> FavResult<Option<RepositoryTarget>> {
    let remote = non_blank(options.repository.clone())
        .or_else(|| non_blank(config.repository.remote.clone()));
    let filename = non_blank(options.filename.clone())
        .or_else(|| non_blank(config.repository.filename.clone()));

    match (remote, filename) {
        (Some(remote), Some(filename)) => {
            // scp-like remotes (git@host:path) are left to git
            if remote.contains("://") {
                validate_url(&remote)?;
            }
            let mut target = RepositoryTarget::new(remote, filename);
            if let Some(scratch_dir) = non_blank(config.repository.scratch_dir.clone()) {
                target = target.with_scratch_dir(scratch_dir);
            }
            Ok(Some(target))
        }
        (None, None) => Ok(None),
        _ => Err(FavError::Config(
            "if the filename is given, the repository must also be given, and vice-versa"
                .to_string(),
        )),
    }
}

fn resolve_providers(
    config: &FavbadgeConfig,
    options: &RunOptions,
    env_value: &dyn Fn(&str) -> Option<String>,
) -> FavResult<Vec<ProviderSpec>> {
    let flag_channel = non_blank(options.youtube_channel_id.clone());
    let legacy_channel = non_blank(options.legacy_channel_id.clone());
    let channel_id = match (flag_channel, legacy_channel) {
        (Some(_), Some(_)) => {
            return Err(FavError::Config(
                "a youtube channel id was given both positionally and with --youtube-channel-id, use --youtube-channel-id only"
                    .to_string(),
            ));
        }
        (Some(channel), None) => Some(channel),
        (None, Some(channel)) => {
            warn!(
                "passing the youtube channel id positionally is deprecated, use --youtube-channel-id"
            );
            Some(channel)
        }
        (None, None) => non_blank(config.providers.youtube_channel_id.clone()),
    };

    let username = non_blank(options.lastfm_username.clone())
        .or_else(|| non_blank(config.providers.lastfm_username.clone()));

    let mut providers = Vec::new();
    if let Some(channel_id) = channel_id {
        providers.push(ProviderSpec::YoutubeChannel { channel_id });
    }
    if let Some(username) = username {
        let api_key = env_value("LAST_FM_API_KEY")
            .or_else(|| non_blank(config.providers.lastfm_api_key.clone()))
            .ok_or_else(|| {
                FavError::Config(
                    "a last.fm username needs an API key in the LAST_FM_API_KEY environment variable"
                        .to_string(),
                )
            })?;
        let period = non_blank(options.lastfm_period.clone())
            .or_else(|| non_blank(config.providers.lastfm_period.clone()))
            .unwrap_or_else(|| DEFAULT_LASTFM_PERIOD.to_string());
        if !LASTFM_PERIODS.contains(&period.as_str()) {
            return Err(FavError::Config(format!(
                "unknown last.fm period \"{period}\", expected one of {}",
                LASTFM_PERIODS.join(", ")
            )));
        }
        providers.push(ProviderSpec::LastFmUser {
            username,
            api_key,
            period,
        });
    }

    if providers.is_empty() {
        return Err(FavError::Config(
            "a last.fm username or a youtube channel id must be given, there is nowhere to take the favorite music from"
                .to_string(),
        ));
    }

    if providers.len() > 1 {
        let fallback = non_blank(options.fallback.clone())
            .or_else(|| non_blank(config.providers.fallback.clone()))
            .ok_or_else(|| {
                FavError::Config(
                    "several providers are configured, give their priority with --fallback, e.g. \"lastfm,youtube\""
                        .to_string(),
                )
            })?;
        apply_fallback_order(&mut providers, &fallback)?;
    }

    Ok(providers)
}

/// Reorders `providers` to follow a comma separated priority list.
pub fn apply_fallback_order(providers: &mut [ProviderSpec], fallback: &str) -> FavResult<()> {
    let order: Vec<&str> = fallback.split(',').map(str::trim).collect();
    if order.len() != providers.len() {
        return Err(FavError::Config(format!(
            "the fallback order \"{fallback}\" must name each of the {} configured providers once",
            providers.len()
        )));
    }

    let mut seen = HashSet::new();
    for (index, name) in order.iter().enumerate() {
        let kind = ProviderKind::parse(name).ok_or_else(|| {
            FavError::Config(format!(
                "unknown provider \"{name}\", valid providers are \"youtube\" and \"lastfm\""
            ))
        })?;
        if !seen.insert(kind) {
            return Err(FavError::Config(format!(
                "provider \"{kind}\" appears twice in the fallback order"
            )));
        }
        move_provider_to_index(providers, kind, index)?;
    }
    Ok(())
}

fn resolve_badge(config: &FavbadgeConfig, options: &RunOptions) -> BadgeOptions {
    let badge = &config.badge;
    BadgeOptions {
        message_color: pick(&options.message_color, &badge.message_color, None),
        style: pick(&options.style, &badge.style, Some(DEFAULT_STYLE)),
        logo: pick(&options.logo, &badge.logo, Some(DEFAULT_LOGO)),
        logo_color: pick(&options.logo_color, &badge.logo_color, None),
        logo_size: pick(&options.logo_size, &badge.logo_size, None),
        label_color: pick(&options.label_color, &badge.label_color, Some(DEFAULT_LABEL_COLOR)),
        color: pick(&options.color, &badge.color, None),
        cache_seconds: pick(&options.cache_seconds, &badge.cache_seconds, None),
    }
}

/// First value that was given at all; an explicit empty string switches the option off.
fn pick(flag: &Option<String>, file: &Option<String>, default: Option<&str>) -> Option<String> {
    flag.clone()
        .or_else(|| file.clone())
        .or_else(|| default.map(str::to_string))
        .and_then(|value| non_blank(Some(value)))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn parse_flag(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes"
}

/// Parses durations such as `60s`, `1m30s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> FavResult<Duration> {
    let input = input.trim();
    let invalid = || {
        FavError::Config(format!(
            "invalid timeout \"{input}\", use a duration like 60s, 1m30s or 500ms"
        ))
    };

    if let Ok(seconds) = input.parse::<u64>() {
        return bounded(Duration::from_secs(seconds), input);
    }

    let regex = Regex::new(r"(\d+(?:\.\d+)?)(ms|h|m|s)").map_err(|_| invalid())?;
    let mut consumed = 0;
    let mut total_millis = 0f64;
    for captures in regex.captures_iter(input) {
        let whole = captures.get(0).ok_or_else(invalid)?;
        if whole.start() != consumed {
            return Err(invalid());
        }
        consumed = whole.end();
        let amount: f64 = captures[1].parse().map_err(|_| invalid())?;
        let unit_millis = match &captures[2] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            _ => return Err(invalid()),
        };
        total_millis += amount * unit_millis;
    }
    if consumed == 0 || consumed != input.len() {
        return Err(invalid());
    }
    if total_millis > MAX_TIMEOUT.as_millis() as f64 {
        return Err(too_long(input));
    }
    bounded(Duration::from_millis(total_millis.round() as u64), input)
}

fn bounded(duration: Duration, input: &str) -> FavResult<Duration> {
    if duration.is_zero() {
        return Err(FavError::Config(format!(
            "timeout \"{input}\" must be longer than zero"
        )));
    }
    if duration > MAX_TIMEOUT {
        return Err(too_long(input));
    }
    Ok(duration)
}

fn too_long(input: &str) -> FavError {
    FavError::Config(format!(
        "timeout \"{input}\" is too long, the maximum is {}h",
        MAX_TIMEOUT.as_secs() / 3600
    ))
}
