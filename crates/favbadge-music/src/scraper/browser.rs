use async_trait::async_trait;
use favbadge_core::FavResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub user_agent: String,
    pub language: String,
}

/// Starts browser sessions for the scraper.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Driver: BrowserDriver;

    async fn launch(&self, options: &LaunchOptions) -> FavResult<Self::Driver>;
}

/// The page operations the scraper needs.
///
/// Element lookups wait until the element shows up; the caller bounds the wait
/// with its deadline.
#[async_trait]
pub trait BrowserDriver: Send {
    async fn navigate(&mut self, url: &str) -> FavResult<()>;

    async fn click(&mut self, selector: &str) -> FavResult<()>;

    async fn read_text(&mut self, selector: &str) -> FavResult<String>;

    /// `Ok(None)` means the element exists but has no such attribute.
    async fn read_attribute(&mut self, selector: &str, name: &str) -> FavResult<Option<String>>;

    /// Tears the session down. Called once, whatever the scrape outcome.
    async fn close(&mut self) -> FavResult<()>;
}
