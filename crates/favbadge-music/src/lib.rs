pub mod api;
pub mod parsers;
mod resolver;
pub mod scraper;

pub use api::lastfm::LastFmClient;
pub use resolver::{FavoriteSource, ProviderDispatcher, resolve};
pub use scraper::ScraperSession;
#[cfg(feature = "chromium")]
pub use scraper::chromium::ChromiumLauncher;
