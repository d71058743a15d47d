use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FavError, FavResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Youtube,
    LastFm,
}

impl ProviderKind {
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "youtube" | "youtube-music" | "youtube_music" | "youtubemusic" | "ytmusic" => {
                Some(ProviderKind::Youtube)
            }
            "lastfm" | "last.fm" | "last-fm" | "last_fm" => Some(ProviderKind::LastFm),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Youtube => f.write_str("youtube"),
            ProviderKind::LastFm => f.write_str("lastfm"),
        }
    }
}

/// Where to look for the favorite music. Position in a list is priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderSpec {
    YoutubeChannel {
        channel_id: String,
    },
    LastFmUser {
        username: String,
        api_key: String,
        period: String,
    },
}

impl ProviderSpec {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderSpec::YoutubeChannel { .. } => ProviderKind::Youtube,
            ProviderSpec::LastFmUser { .. } => ProviderKind::LastFm,
        }
    }
}

/// Swaps the first provider of `kind` into `index`.
///
/// This is a single swap, not a re-sort: the provider previously at `index`
/// takes the old slot of the moved one.
pub fn move_provider_to_index(
    providers: &mut [ProviderSpec],
    kind: ProviderKind,
    index: usize,
) -> FavResult<()> {
    if index >= providers.len() {
        return Err(FavError::Config(format!(
            "cannot move {kind} to position {index}, only {} providers configured",
            providers.len()
        )));
    }
    let current = providers
        .iter()
        .position(|provider| provider.kind() == kind)
        .ok_or_else(|| {
            FavError::Config(format!(
                "provider \"{kind}\" is listed in the fallback order but is not configured"
            ))
        })?;
    providers.swap(current, index);
    Ok(())
}
