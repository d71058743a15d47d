use serde::{Deserialize, Serialize};

/// A favorite track as reported by one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub track_name: String,
    pub track_url: String,
    pub artist_name: String,
}

impl FetchResult {
    /// Name of the first field that is empty or only whitespace.
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("track name", &self.track_name),
            ("track url", &self.track_url),
            ("artist name", &self.artist_name),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

#[cfg(test)]
mod tests {
    use super::FetchResult;

    fn result(track_name: &str, track_url: &str, artist_name: &str) -> FetchResult {
        FetchResult {
            track_name: track_name.to_string(),
            track_url: track_url.to_string(),
            artist_name: artist_name.to_string(),
        }
    }

    #[test]
    fn complete_result_has_no_blank_field() {
        assert_eq!(result("Song", "https://x/y", "Band").blank_field(), None);
    }

    #[test]
    fn whitespace_counts_as_blank() {
        assert_eq!(result("  ", "https://x/y", "Band").blank_field(), Some("track name"));
        assert_eq!(result("Song", "", "Band").blank_field(), Some("track url"));
        assert_eq!(result("Song", "https://x/y", "\n").blank_field(), Some("artist name"));
    }
}
