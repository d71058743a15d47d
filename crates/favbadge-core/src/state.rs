use std::fmt;

use serde::{Deserialize, Serialize};

/// Progress of a channel scrape, recorded so a timeout can say where it stopped.
///
/// Only moves forward within one scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScrapeState {
    LoadingChannel,
    DenyingCookies,
    ScrapingFavoriteMusic,
}

impl ScrapeState {
    pub fn hint(&self) -> &'static str {
        match self {
            ScrapeState::LoadingChannel => {
                "loading the channel took too long, is YouTube Music reachable from this machine?"
            }
            ScrapeState::DenyingCookies => {
                "could not click \"Reject all\" in the cookie banner, the page layout may have changed"
            }
            ScrapeState::ScrapingFavoriteMusic => {
                "the page loaded but no favorite music was found, is \"Enable public stats\" turned on for the channel?"
            }
        }
    }
}

impl fmt::Display for ScrapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScrapeState::LoadingChannel => "loading the channel",
            ScrapeState::DenyingCookies => "denying cookies",
            ScrapeState::ScrapingFavoriteMusic => "scraping the favorite music",
        };
        f.write_str(label)
    }
}
