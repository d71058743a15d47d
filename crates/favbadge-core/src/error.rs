use thiserror::Error;

use crate::state::ScrapeState;

#[derive(Debug, Error)]
pub enum FavError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream error: status={status} body={body}")]
    UpstreamHttp { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("timeout while {stage}: {}", stage.hint())]
    Timeout { stage: ScrapeState },
    #[error("attribute 'href' not found on the favorite music link")]
    MissingLinkAttribute,
    #[error("browser error: {0}")]
    Browser(String),
    #[error("no provider succeeded, last error: {0}")]
    NoProviderSucceeded(#[source] Box<FavError>),
    #[error("insertion marker not found in {0}")]
    MarkerNotFound(String),
    #[error("version control error: {0}")]
    VersionControl(String),
    #[error("io error: {0}")]
    Io(String),
}

pub type FavResult<T> = Result<T, FavError>;
