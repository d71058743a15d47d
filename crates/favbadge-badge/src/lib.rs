use favbadge_core::FetchResult;
use serde::{Deserialize, Serialize};

const BADGE_BASE: &str = "https://img.shields.io/badge/Favorite%20music-";
const DEFAULT_MESSAGE_COLOR: &str = "mistyrose";

/// Style attributes passed through to shields.io.
///
/// A `None` field is left out of the query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeOptions {
    pub message_color: Option<String>,
    pub style: Option<String>,
    pub logo: Option<String>,
    pub logo_color: Option<String>,
    pub logo_size: Option<String>,
    pub label_color: Option<String>,
    pub color: Option<String>,
    pub cache_seconds: Option<String>,
}

impl BadgeOptions {
    fn query_pairs(&self) -> [(&'static str, Option<&str>); 7] {
        [
            ("style", self.style.as_deref()),
            ("logo", self.logo.as_deref()),
            ("logoColor", self.logo_color.as_deref()),
            ("logoSize", self.logo_size.as_deref()),
            ("labelColor", self.label_color.as_deref()),
            ("color", self.color.as_deref()),
            ("cacheSeconds", self.cache_seconds.as_deref()),
        ]
    }
}

/// Escapes the handful of characters shields.io cannot take raw in a path segment.
///
/// This is deliberately not full percent-encoding.
pub fn escape_segment(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '?' => escaped.push_str("%3F"),
            '"' => escaped.push_str("%22"),
            ' ' => escaped.push_str("%20"),
            '&' => escaped.push_str("%26"),
            '=' => escaped.push_str("%3D"),
            '\\' => escaped.push_str("%5C"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn build_badge_url(track_name: &str, artist_name: &str, options: &BadgeOptions) -> String {
    let message_color = options
        .message_color
        .as_deref()
        .unwrap_or(DEFAULT_MESSAGE_COLOR);
    let query: String = options
        .query_pairs()
        .iter()
        .filter_map(|(key, value)| value.map(|value| format!("{key}={value}&")))
        .collect();
    format!(
        "{BADGE_BASE}{}%20by%20{}-{message_color}?{query}",
        escape_segment(track_name),
        escape_segment(artist_name),
    )
}

pub fn badge_url_for(result: &FetchResult, options: &BadgeOptions) -> String {
    build_badge_url(&result.track_name, &result.artist_name, options)
}

/// The markdown line written into documents: the badge image linking to the track.
pub fn badge_markup(image_url: &str, track_link: &str) -> String {
    format!("[<img src=\"{image_url}\"/>]({track_link})")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_options() -> BadgeOptions {
        BadgeOptions {
            message_color: Some("white".to_string()),
            style: Some("for-the-badge".to_string()),
            logo: Some("youtube-music".to_string()),
            logo_color: Some("red".to_string()),
            logo_size: Some("auto".to_string()),
            label_color: Some("darkred".to_string()),
            color: Some("blue".to_string()),
            cache_seconds: Some("3600".to_string()),
        }
    }

    #[test]
    fn defaults_to_mistyrose_without_options() {
        let url = build_badge_url("Song", "Band", &BadgeOptions::default());
        assert_eq!(
            url,
            "https://img.shields.io/badge/Favorite%20music-Song%20by%20Band-mistyrose?"
        );
    }

    #[test]
    fn appends_every_option_in_fixed_order() {
        let url = build_badge_url("Song", "Band", &all_options());
        assert_eq!(
            url,
            "https://img.shields.io/badge/Favorite%20music-Song%20by%20Band-white?\
             style=for-the-badge&logo=youtube-music&logoColor=red&logoSize=auto&\
             labelColor=darkred&color=blue&cacheSeconds=3600&"
        );
    }

    #[test]
    fn absent_options_leave_no_separator() {
        let options = BadgeOptions {
            logo: Some("lastdotfm".to_string()),
            cache_seconds: Some("60".to_string()),
            ..BadgeOptions::default()
        };
        let url = build_badge_url("Song", "Band", &options);
        assert!(url.ends_with("-mistyrose?logo=lastdotfm&cacheSeconds=60&"));
    }

    #[test]
    fn escapes_each_special_character_once() {
        assert_eq!(escape_segment("A&B"), "A%26B");
        assert_eq!(
            escape_segment("why? \"x\"=y\\z"),
            "why%3F%20%22x%22%3Dy%5Cz"
        );
    }

    #[test]
    fn escaping_leaves_plain_text_alone() {
        assert_eq!(escape_segment("Bohemian_Rhapsody-1975"), "Bohemian_Rhapsody-1975");
        assert_eq!(escape_segment("%20"), "%20");
    }

    #[test]
    fn escapes_both_track_and_artist() {
        let url = build_badge_url("Rock & Roll", "AC/DC", &BadgeOptions::default());
        assert!(url.contains("-Rock%20%26%20Roll%20by%20AC/DC-"));
    }

    #[test]
    fn markup_wraps_image_in_link() {
        assert_eq!(
            badge_markup("https://img.example/badge", "https://youtube.com/watch?v=1"),
            "[<img src=\"https://img.example/badge\"/>](https://youtube.com/watch?v=1)"
        );
    }
}
