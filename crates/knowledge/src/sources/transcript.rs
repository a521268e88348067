//! YouTube transcripts.
//!
//! The watch page of a video embeds its caption tracks as JSON
//! (`"captionTracks":[{"baseUrl":..,"languageCode":..,"kind":..}]`). The
//! chosen track's `baseUrl` answers with timedtext XML of the form
//! `<transcript><text start=".." dur="..">..</text>..`. Entry texts are
//! unescaped and joined with single spaces.

use super::SourceError;
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Default video site base URL
pub const DEFAULT_TRANSCRIPT_URL: &str = "https://www.youtube.com";

const REQUEST_TIMEOUT_SECS: u64 = 20;

const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

fn video_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[?&]v=|youtu\.be/|/embed/|/shorts/)([0-9A-Za-z_-]{11})(?:$|[^0-9A-Za-z_-])")
            .expect("video id pattern is valid")
    })
}

fn text_entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").expect("text entry pattern is valid")
    })
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pull the 11-character video ID out of a URL, or accept a bare ID.
///
/// Recognises `...watch?v=<id>`, `youtu.be/<id>`, `/embed/<id>` and
/// `/shorts/<id>` forms.
pub fn extract_video_id(url_or_id: &str) -> Result<String, SourceError> {
    let input = url_or_id.trim();

    if let Some(captures) = video_id_pattern().captures(input) {
        return Ok(captures[1].to_string());
    }
    if is_video_id(input) {
        return Ok(input.to_string());
    }

    Err(SourceError::InvalidVideoId(input.to_string()))
}

/// One entry of a watch page's `captionTracks` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    #[serde(rename = "languageCode")]
    pub language_code: String,

    /// `"asr"` for generated captions, absent for uploaded ones
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Caption tracks listed in a watch page, or `None` when it lists none.
pub fn caption_tracks(watch_page: &str) -> Option<Vec<CaptionTrack>> {
    let start = watch_page.find(CAPTION_TRACKS_KEY)? + CAPTION_TRACKS_KEY.len();
    let mut values = serde_json::Deserializer::from_str(&watch_page[start..])
        .into_iter::<Vec<CaptionTrack>>();

    match values.next() {
        Some(Ok(tracks)) if !tracks.is_empty() => Some(tracks),
        Some(Err(e)) => {
            tracing::warn!("Malformed caption track list: {}", e);
            None
        }
        _ => None,
    }
}

/// Pick the track for `language`: uploaded captions first, then generated
/// ones, then whatever the video has.
pub fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches = |t: &&CaptionTrack| t.language_code == language;
    tracks
        .iter()
        .filter(matches)
        .find(|t| !t.is_generated())
        .or_else(|| tracks.iter().find(matches))
        .or_else(|| tracks.first())
}

/// Whether a watch page reports the video as missing, private or removed.
fn is_unplayable(watch_page: &str) -> bool {
    ["\"status\":\"ERROR\"", "\"status\":\"LOGIN_REQUIRED\"", "\"status\":\"UNPLAYABLE\""]
        .iter()
        .any(|marker| watch_page.contains(marker))
}

/// Fetches caption tracks and flattens them into plain text.
#[derive(Debug, Clone)]
pub struct TranscriptFetcher {
    client: Client,
    base_url: String,
    language: String,
}

impl Default for TranscriptFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPT_URL, "en")
    }
}

impl TranscriptFetcher {
    pub fn new(base_url: &str, language: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }

    /// Fetch the transcript of `video_id` as one string.
    #[tracing::instrument(skip(self), fields(language = %self.language))]
    pub async fn fetch(&self, video_id: &str) -> Result<String, SourceError> {
        let watch_url = format!("{}/watch", self.base_url);
        tracing::debug!("Fetching watch page from {}", watch_url);

        let request = self
            .client
            .get(&watch_url)
            .query(&[("v", video_id)])
            .header(header::ACCEPT_LANGUAGE, self.language.as_str());
        let page = self.get_text(request).await?;

        let Some(tracks) = caption_tracks(&page) else {
            if is_unplayable(&page) {
                return Err(SourceError::VideoUnavailable);
            }
            return Err(SourceError::TranscriptUnavailable);
        };
        let track = pick_track(&tracks, &self.language).ok_or(SourceError::TranscriptUnavailable)?;

        tracing::debug!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Fetching caption track"
        );

        let track_url = if track.base_url.starts_with('/') {
            format!("{}{}", self.base_url, track.base_url)
        } else {
            track.base_url.clone()
        };
        let body = self.get_text(self.client.get(&track_url)).await?;

        let text = parse_timedtext(&body);
        if text.is_empty() {
            return Err(SourceError::TranscriptUnavailable);
        }

        tracing::info!(chars = text.chars().count(), "Fetched transcript");
        Ok(text)
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, SourceError> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::TranscriptFetch(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::GONE => return Err(SourceError::VideoUnavailable),
            StatusCode::FORBIDDEN => return Err(SourceError::TranscriptUnavailable),
            status => {
                return Err(SourceError::TranscriptFetch(format!(
                    "video site answered {}",
                    status
                )))
            }
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::TranscriptFetch(e.to_string()))
    }
}

/// Flatten timedtext XML into space-separated caption text.
pub fn parse_timedtext(xml: &str) -> String {
    text_entry_pattern()
        .captures_iter(xml)
        .map(|c| unescape(&c[1]))
        .map(|entry| entry.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode XML entities. Caption bodies are often escaped twice
/// (`&amp;#39;`), so `&amp;` is decoded before and after the others.
fn unescape(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#10;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_from_short_and_embed_urls() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?start=3").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_ignores_host_and_other_paths() {
        assert_eq!(
            extract_video_id("https://youtubekids.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        assert!(extract_video_id("https://example.com/abcdefghijk").is_err());
        assert!(extract_video_id("https://youtu.be/dQw4w9WgXcQtoolong").is_err());
    }

    #[test]
    fn test_extract_bare_id() {
        assert_eq!(extract_video_id("  a_b-C1d2E3f ").unwrap(), "a_b-C1d2E3f");
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(matches!(
            extract_video_id("not a video"),
            Err(SourceError::InvalidVideoId(_))
        ));
        assert!(extract_video_id("short").is_err());
        assert!(extract_video_id("").is_err());
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.5" dur="2.1">Hello &amp;amp; welcome</text>
<text start="2.6" dur="1.9">it&amp;#39;s a
test</text>
<text start="4.5" dur="1.0"></text>
<text start="5.5" dur="1.0">&lt;music&gt;</text>
</transcript>"#;
        assert_eq!(parse_timedtext(xml), "Hello & welcome it's a test <music>");
    }

    #[test]
    fn test_parse_empty_track() {
        assert_eq!(parse_timedtext(""), "");
        assert_eq!(parse_timedtext("<transcript></transcript>"), "");
    }

    fn watch_page(tracks_json: &str) -> String {
        format!(
            r#"<html><script>var ytInitialPlayerResponse = {{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{}}}}}}};</script></html>"#,
            tracks_json
        )
    }

    const TRACKS: &str = r#"[{"baseUrl":"/api/timedtext?v=dQw4w9WgXcQ&lang=de","languageCode":"de"},{"baseUrl":"/api/timedtext?v=dQw4w9WgXcQ&lang=en&kind=asr","languageCode":"en","kind":"asr"},{"baseUrl":"/api/timedtext?v=dQw4w9WgXcQ&lang=en","languageCode":"en"}]"#;

    /// Serve canned `(path prefix, status, body)` responses on a local port.
    async fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = routes
                    .iter()
                    .find(|(prefix, _, _)| path.starts_with(prefix))
                    .map(|(_, status, body)| (*status, body.clone()))
                    .unwrap_or((404, String::new()));

                let response = format!(
                    "HTTP/1.1 {} OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    #[test]
    fn test_caption_tracks_from_watch_page() {
        let tracks = caption_tracks(&watch_page(TRACKS)).unwrap();

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].language_code, "de");
        assert_eq!(tracks[1].kind.as_deref(), Some("asr"));
        assert_eq!(tracks[2].base_url, "/api/timedtext?v=dQw4w9WgXcQ&lang=en");
    }

    #[test]
    fn test_caption_tracks_missing_or_empty() {
        assert_eq!(caption_tracks("<html>no captions here</html>"), None);
        assert_eq!(caption_tracks(&watch_page("[]")), None);
    }

    #[test]
    fn test_pick_track_prefers_uploaded_captions() {
        let tracks = caption_tracks(&watch_page(TRACKS)).unwrap();

        assert_eq!(pick_track(&tracks, "en"), Some(&tracks[2]));
        assert_eq!(pick_track(&tracks, "de"), Some(&tracks[0]));
        assert_eq!(pick_track(&tracks, "fr"), Some(&tracks[0]));
        assert_eq!(pick_track(&tracks[1..2], "en"), Some(&tracks[1]));
        assert_eq!(pick_track(&[], "en"), None);
    }

    #[tokio::test]
    async fn test_fetch_follows_caption_track() {
        let xml = r#"<transcript><text start="0" dur="1">Never gonna</text><text start="1" dur="1">give you up</text></transcript>"#;
        let base = serve(vec![
            ("/watch", 200, watch_page(TRACKS)),
            ("/api/timedtext?v=dQw4w9WgXcQ&lang=en", 200, xml.to_string()),
        ])
        .await;

        let text = TranscriptFetcher::new(&base, "en")
            .fetch("dQw4w9WgXcQ")
            .await
            .unwrap();
        assert_eq!(text, "Never gonna give you up");
    }

    #[tokio::test]
    async fn test_fetch_video_without_captions() {
        let page = r#"<html>{"playabilityStatus":{"status":"OK"}}</html>"#.to_string();
        let base = serve(vec![("/watch", 200, page)]).await;

        let err = TranscriptFetcher::new(&base, "en")
            .fetch("dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::TranscriptUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_unplayable_video() {
        let page = r#"<html>{"playabilityStatus":{"status":"ERROR","reason":"Video unavailable"}}</html>"#
            .to_string();
        let base = serve(vec![("/watch", 200, page)]).await;

        let err = TranscriptFetcher::new(&base, "en")
            .fetch("dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::VideoUnavailable);
    }

    #[tokio::test]
    async fn test_fetch_empty_track_is_unavailable() {
        let base = serve(vec![
            ("/watch", 200, watch_page(TRACKS)),
            ("/api/timedtext", 200, String::new()),
        ])
        .await;

        let err = TranscriptFetcher::new(&base, "en")
            .fetch("dQw4w9WgXcQ")
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::TranscriptUnavailable);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_fetch_error() {
        let fetcher = TranscriptFetcher::new("http://127.0.0.1:9", "en");
        let err = fetcher.fetch("dQw4w9WgXcQ").await.unwrap_err();
        assert!(matches!(err, SourceError::TranscriptFetch(_)));
    }
}
