pub mod browser;
#[cfg(feature = "chromium")]
pub mod chromium;

use std::time::Duration;

use favbadge_core::{FavError, FavResult, FetchResult, ScrapeState, validate_url};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use crate::parsers::youtube::parse_channel_id;
use browser::{BrowserDriver, BrowserLauncher, LaunchOptions};

pub const MUSIC_CHANNEL_BASE: &str = "https://music.youtube.com/channel/";
pub const VIDEO_ORIGIN: &str = "https://youtube.com/";

const REJECT_COOKIES: &str = r#"[aria-label="Reject all"]"#;
const FIRST_RESULT_LINK: &str = "div#contents.style-scope.ytmusic-shelf-renderer a";
const FIRST_RESULT_AUTHOR: &str = "div#contents.style-scope.ytmusic-shelf-renderer .flex-column a";
const OFFICIAL_VIDEO_SUFFIX: &str = "(Official Video)";
const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TrackName,
    TrackLink,
    ArtistName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeAction {
    Navigate { url: String },
    Click { selector: String },
    ReadText { selector: String, field: Field },
    ReadAttribute { selector: String, name: String, field: Field },
}

/// One browser action and the stage it is attributed to if the deadline hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeStep {
    pub stage: ScrapeState,
    pub action: ScrapeAction,
}

impl ScrapeStep {
    fn new(stage: ScrapeState, action: ScrapeAction) -> Self {
        Self { stage, action }
    }
}

/// The fixed script for reading the top entry of a channel's music shelf.
pub fn channel_steps(channel_id: &str) -> Vec<ScrapeStep> {
    vec![
        ScrapeStep::new(
            ScrapeState::LoadingChannel,
            ScrapeAction::Navigate {
                url: format!("{MUSIC_CHANNEL_BASE}{channel_id}"),
            },
        ),
        ScrapeStep::new(
            ScrapeState::DenyingCookies,
            ScrapeAction::Click {
                selector: REJECT_COOKIES.to_string(),
            },
        ),
        ScrapeStep::new(
            ScrapeState::ScrapingFavoriteMusic,
            ScrapeAction::ReadText {
                selector: FIRST_RESULT_LINK.to_string(),
                field: Field::TrackName,
            },
        ),
        ScrapeStep::new(
            ScrapeState::ScrapingFavoriteMusic,
            ScrapeAction::ReadAttribute {
                selector: FIRST_RESULT_LINK.to_string(),
                name: "href".to_string(),
                field: Field::TrackLink,
            },
        ),
        ScrapeStep::new(
            ScrapeState::ScrapingFavoriteMusic,
            ScrapeAction::ReadText {
                selector: FIRST_RESULT_AUTHOR.to_string(),
                field: Field::ArtistName,
            },
        ),
    ]
}

#[derive(Debug, Default)]
struct Extracted {
    track_name: Option<String>,
    track_link: Option<String>,
    artist_name: Option<String>,
}

impl Extracted {
    fn set(&mut self, field: Field, value: String) {
        match field {
            Field::TrackName => self.track_name = Some(value),
            Field::TrackLink => self.track_link = Some(value),
            Field::ArtistName => self.artist_name = Some(value),
        }
    }

    fn into_result(self) -> FavResult<FetchResult> {
        let (Some(raw_name), Some(href), Some(artist_name)) =
            (self.track_name, self.track_link, self.artist_name)
        else {
            return Err(FavError::Browser(
                "scrape finished without extracting every field".to_string(),
            ));
        };
        let track_url = format!("{VIDEO_ORIGIN}{href}");
        validate_url(&track_url)?;
        let result = FetchResult {
            track_name: clean_track_name(&raw_name),
            track_url,
            artist_name,
        };
        match result.blank_field() {
            Some(field) => Err(FavError::Browser(format!(
                "the favorite music shelf has an empty {field}"
            ))),
            None => Ok(result),
        }
    }
}

pub fn clean_track_name(raw: &str) -> String {
    raw.replace(OFFICIAL_VIDEO_SUFFIX, "").trim().to_string()
}

async fn run_steps<D: BrowserDriver>(
    driver: &mut D,
    steps: &[ScrapeStep],
    state: &mut ScrapeState,
) -> FavResult<Extracted> {
    let mut extracted = Extracted::default();
    for step in steps {
        *state = step.stage;
        debug!(stage = %step.stage, action = ?step.action, "scrape step");
        match &step.action {
            ScrapeAction::Navigate { url } => driver.navigate(url).await?,
            ScrapeAction::Click { selector } => driver.click(selector).await?,
            ScrapeAction::ReadText { selector, field } => {
                let text = driver.read_text(selector).await?;
                extracted.set(*field, text);
            }
            ScrapeAction::ReadAttribute {
                selector,
                name,
                field,
            } => match driver.read_attribute(selector, name).await? {
                Some(value) => extracted.set(*field, value),
                None => return Err(FavError::MissingLinkAttribute),
            },
        }
    }
    Ok(extracted)
}

/// Reads the favorite music of a YouTube Music channel through a browser.
///
/// The channel must have "Enable public stats" turned on, otherwise the shelf
/// never renders and the scrape runs into its deadline.
pub struct ScraperSession<L> {
    launcher: L,
}

impl<L: BrowserLauncher> ScraperSession<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    pub async fn scrape(
        &self,
        channel_id: &str,
        user_agent: &str,
        timeout_after: Duration,
    ) -> FavResult<FetchResult> {
        let channel_id = parse_channel_id(channel_id)?;
        let deadline = Instant::now().checked_add(timeout_after).ok_or_else(|| {
            FavError::InvalidInput(format!("timeout {timeout_after:?} is too large"))
        })?;
        let mut state = ScrapeState::LoadingChannel;

        let options = LaunchOptions {
            user_agent: user_agent.to_string(),
            language: "en".to_string(),
        };
        let mut driver = match timeout_at(deadline, self.launcher.launch(&options)).await {
            Ok(driver) => driver?,
            Err(_) => return Err(FavError::Timeout { stage: state }),
        };

        let steps = channel_steps(&channel_id);
        let outcome = timeout_at(deadline, run_steps(&mut driver, &steps, &mut state)).await;

        match timeout(CLOSE_GRACE, driver.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!("failed to close browser session: {err}"),
            Err(_) => warn!("browser session did not close within {CLOSE_GRACE:?}"),
        }

        match outcome {
            Ok(extracted) => extracted?.into_result(),
            Err(_) => Err(FavError::Timeout { stage: state }),
        }
    }
}
