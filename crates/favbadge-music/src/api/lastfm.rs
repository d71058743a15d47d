use favbadge_core::{FavError, FavResult, FetchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Client for `user.getTopTracks`.
///
/// See <https://www.last.fm/api/show/user.getTopTracks> for the error codes
/// that show up in the body of a failed request.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    client: Client,
    base_url: String,
}

impl LastFmClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch_top(
        &self,
        username: &str,
        period: &str,
        api_key: &str,
    ) -> FavResult<FetchResult> {
        debug!(username, period, "requesting last.fm top track");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("method", "user.gettoptracks"),
                ("user", username),
                ("period", period),
                ("api_key", api_key),
                ("limit", "1"),
                ("format", "json"),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| FavError::Network(format!("last.fm request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FavError::UpstreamHttp { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|err| FavError::Network(format!("last.fm response read failed: {err}")))?;
        parse_top_track(&body)
    }
}

pub fn parse_top_track(body: &str) -> FavResult<FetchResult> {
    let payload: TopTracksResponse = serde_json::from_str(body)
        .map_err(|err| FavError::Decode(format!("last.fm response parse failed: {err}")))?;
    let track = payload
        .toptracks
        .track
        .into_iter()
        .next()
        .ok_or_else(|| FavError::Decode("last.fm returned no tracks for this period".to_string()))?;
    let result = FetchResult {
        track_name: track.name,
        track_url: track.url,
        artist_name: track.artist.name,
    };
    match result.blank_field() {
        Some(field) => Err(FavError::Decode(format!(
            "last.fm top track has an empty {field}"
        ))),
        None => Ok(result),
    }
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    toptracks: TopTracks,
}

#[derive(Debug, Deserialize)]
struct TopTracks {
    track: Vec<LastFmTrack>,
}

#[derive(Debug, Deserialize)]
struct LastFmTrack {
    name: String,
    url: String,
    artist: LastFmArtist,
}

#[derive(Debug, Deserialize)]
struct LastFmArtist {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const TOP_TRACKS: &str = r#"{
        "toptracks": {
            "track": [{
                "name": "  Windowlicker ",
                "url": "https://www.last.fm/music/Aphex+Twin/_/Windowlicker",
                "artist": {"name": "Aphex Twin", "mbid": ""},
                "playcount": "42"
            }],
            "@attr": {"user": "someone", "page": "1"}
        }
    }"#;

    /// Serves one canned HTTP response and hands back the request line it saw.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buffer = vec![0u8; 4096];
            let read = socket.read(&mut buffer).await.unwrap();
            let request = String::from_utf8_lossy(&buffer[..read]).to_string();
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{addr}/2.0/"), handle)
    }

    #[test]
    fn parses_first_track_verbatim() {
        let result = parse_top_track(TOP_TRACKS).unwrap();
        assert_eq!(result.track_name, "  Windowlicker ");
        assert_eq!(
            result.track_url,
            "https://www.last.fm/music/Aphex+Twin/_/Windowlicker"
        );
        assert_eq!(result.artist_name, "Aphex Twin");
    }

    #[test]
    fn unexpected_shape_is_decode_error() {
        let result = parse_top_track(r#"{"error": 6, "message": "User not found"}"#);
        assert!(matches!(result, Err(FavError::Decode(_))));
    }

    #[test]
    fn empty_track_list_is_decode_error() {
        let result = parse_top_track(r#"{"toptracks": {"track": []}}"#);
        match result {
            Err(FavError::Decode(msg)) => assert!(msg.contains("no tracks")),
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn blank_track_fields_are_decode_errors() {
        let blank_name = r#"{"toptracks": {"track": [
            {"name": " ", "url": "https://www.last.fm/x", "artist": {"name": "Band"}}
        ]}}"#;
        match parse_top_track(blank_name) {
            Err(FavError::Decode(msg)) => assert!(msg.contains("track name")),
            other => panic!("Expected Decode error, got {other:?}"),
        }

        let blank_artist = r#"{"toptracks": {"track": [
            {"name": "Song", "url": "https://www.last.fm/x", "artist": {"name": ""}}
        ]}}"#;
        assert!(matches!(parse_top_track(blank_artist), Err(FavError::Decode(_))));
    }

    #[tokio::test]
    async fn fetch_top_sends_expected_query() {
        let (base_url, server) = serve_once("200 OK", TOP_TRACKS).await;
        let client = LastFmClient::with_base_url(Client::new(), base_url);

        let result = client.fetch_top("someone", "7day", "secret").await.unwrap();
        assert_eq!(result.artist_name, "Aphex Twin");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /2.0/?"));
        assert!(request_line.contains("method=user.gettoptracks"));
        assert!(request_line.contains("user=someone"));
        assert!(request_line.contains("period=7day"));
        assert!(request_line.contains("api_key=secret"));
        assert!(request_line.contains("limit=1"));
        assert!(request_line.contains("format=json"));
    }

    #[tokio::test]
    async fn non_success_status_keeps_body() {
        let (base_url, server) =
            serve_once("403 Forbidden", r#"{"error":10,"message":"Invalid API key"}"#).await;
        let client = LastFmClient::with_base_url(Client::new(), base_url);

        let result = client.fetch_top("someone", "7day", "bad").await;
        match result {
            Err(FavError::UpstreamHttp { status, body }) => {
                assert_eq!(status, 403);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("Expected UpstreamHttp error, got {other:?}"),
        }
        server.await.unwrap();
    }
}
