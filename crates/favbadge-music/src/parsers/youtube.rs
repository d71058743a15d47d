use favbadge_core::{FavError, FavResult};
use regex::Regex;
use url::Url;

/// Accepts either a bare channel id or a channel URL on youtube.com / music.youtube.com.
pub fn parse_channel_id(input: &str) -> FavResult<String> {
    let input = input.trim();
    let id_pattern = Regex::new(r"^[A-Za-z0-9_-]+$")
        .map_err(|err| FavError::InvalidInput(format!("channel id pattern: {err}")))?;
    if id_pattern.is_match(input) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input)
        .map_err(|_| FavError::InvalidInput(format!("not a channel id or url: {input}")))?;
    let domain = url.domain().unwrap_or_default();
    if !matches!(
        domain,
        "youtube.com" | "www.youtube.com" | "music.youtube.com" | "m.youtube.com"
    ) {
        return Err(FavError::InvalidInput(format!(
            "not a youtube channel url: {input}"
        )));
    }

    let mut segments = url.path_segments().into_iter().flatten();
    match (segments.next(), segments.next()) {
        (Some("channel"), Some(id)) if id_pattern.is_match(id) => Ok(id.to_string()),
        _ => Err(FavError::InvalidInput(format!(
            "youtube url does not point to a channel: {input}"
        ))),
    }
}
