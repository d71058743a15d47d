mod error;
mod provider;
mod result;
mod state;
mod target;

pub use error::{FavError, FavResult};
pub use provider::{ProviderKind, ProviderSpec, move_provider_to_index};
pub use result::FetchResult;
pub use state::ScrapeState;
pub use target::{DEFAULT_SCRATCH_DIR, RepositoryTarget};

pub fn validate_url(url: &str) -> FavResult<()> {
    url::Url::parse(url).map_err(|err| FavError::InvalidInput(format!("invalid url: {err}")))?;
    Ok(())
}
