use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub youtube_channel_id: Option<String>,
    pub lastfm_username: Option<String>,
    pub lastfm_period: Option<String>,
    pub lastfm_api_key: Option<String>,
    /// Comma separated priority list, e.g. `"lastfm,youtube"`.
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScraperConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<String>,
    pub chrome_executable: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BadgeConfig {
    pub message_color: Option<String>,
    pub style: Option<String>,
    pub logo: Option<String>,
    pub logo_color: Option<String>,
    pub logo_size: Option<String>,
    pub label_color: Option<String>,
    pub color: Option<String>,
    pub cache_seconds: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RepositoryConfig {
    pub remote: Option<String>,
    pub filename: Option<String>,
    pub scratch_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub simple: Option<bool>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { simple: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FavbadgeConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub badge: BadgeConfig,
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}
