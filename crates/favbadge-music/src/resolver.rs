use std::time::Duration;

use async_trait::async_trait;
use favbadge_core::{FavError, FavResult, FetchResult, ProviderSpec};
use reqwest::Client;
use tracing::{info, warn};

use crate::api::lastfm::LastFmClient;
use crate::scraper::ScraperSession;
use crate::scraper::browser::BrowserLauncher;

/// Fetches the favorite track for a single provider entry.
#[async_trait]
pub trait FavoriteSource: Send + Sync {
    async fn fetch(&self, provider: &ProviderSpec) -> FavResult<FetchResult>;
}

/// Routes each provider entry to the Last.fm client or the channel scraper.
pub struct ProviderDispatcher<L> {
    lastfm: LastFmClient,
    scraper: ScraperSession<L>,
    user_agent: String,
    timeout: Duration,
}

impl<L: BrowserLauncher> ProviderDispatcher<L> {
    pub fn new(client: Client, launcher: L, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            lastfm: LastFmClient::new(client),
            scraper: ScraperSession::new(launcher),
            user_agent: user_agent.into(),
            timeout,
        }
    }
}

#[async_trait]
impl<L: BrowserLauncher> FavoriteSource for ProviderDispatcher<L> {
    async fn fetch(&self, provider: &ProviderSpec) -> FavResult<FetchResult> {
        match provider {
            ProviderSpec::YoutubeChannel { channel_id } => {
                info!(
                    "fetching the favorite music of channel {channel_id} from YouTube Music (timeout {:?})",
                    self.timeout
                );
                self.scraper
                    .scrape(channel_id, &self.user_agent, self.timeout)
                    .await
            }
            ProviderSpec::LastFmUser {
                username,
                api_key,
                period,
            } => {
                info!("fetching the top track of {username} from last.fm ({period})");
                self.lastfm.fetch_top(username, period, api_key).await
            }
        }
    }
}

/// Tries each provider in order and returns the first success.
///
/// Failures are logged and the next provider is tried; once every provider
/// has failed the last error is returned wrapped in `NoProviderSucceeded`.
pub async fn resolve<S>(source: &S, providers: &[ProviderSpec]) -> FavResult<FetchResult>
where
    S: FavoriteSource + ?Sized,
{
    let mut last_error = None;
    for provider in providers {
        match source.fetch(provider).await {
            Ok(result) => return Ok(result),
            Err(err) => {
                warn!("failed to fetch from {}: {err}", provider.kind());
                last_error = Some(err);
            }
        }
    }
    match last_error {
        Some(err) => Err(FavError::NoProviderSucceeded(Box::new(err))),
        None => Err(FavError::Config("no provider configured".to_string())),
    }
}
