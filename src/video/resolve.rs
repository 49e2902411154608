//! Live video page → HLS manifest URL.
//!
//! The watch page usually embeds the player response; when it does not, the
//! page tokens are scraped and the player API is queried directly.

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Why a video source could not be turned into a playable manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    BadId,
    Http(String),
    MissingTokens,
    MalformedJson(String),
    Unplayable { status: String, reason: String },
    MissingManifest,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::BadId => write!(f, "bad video URL or id"),
            ResolutionError::Http(err) => write!(f, "http error: {err}"),
            ResolutionError::MissingTokens => {
                write!(f, "missing api key or client version in page")
            }
            ResolutionError::MalformedJson(err) => write!(f, "malformed player response: {err}"),
            ResolutionError::Unplayable { status, reason } => {
                write!(f, "player status: {status} {reason}")
            }
            ResolutionError::MissingManifest => write!(f, "no hls manifest url"),
        }
    }
}

impl std::error::Error for ResolutionError {}

/// Turns a station's video source into a URL the decoder can open.
pub trait ManifestResolver: Send + Sync {
    fn resolve(&self, source: &str) -> Result<String, ResolutionError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlayerResponse {
    streaming_data: StreamingData,
    playability_status: PlayabilityStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StreamingData {
    hls_manifest_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayabilityStatus {
    status: String,
    reason: String,
}

/// Page tokens needed for the player API fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageTokens {
    pub(crate) api_key: String,
    pub(crate) client_version: String,
    pub(crate) signature_timestamp: u64,
}

/// Resolver for YouTube watch, live and short links.
pub struct YouTubeResolver {
    agent: ureq::Agent,
}

impl Default for YouTubeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl YouTubeResolver {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(HTTP_TIMEOUT).build(),
        }
    }

    fn fetch_watch_page(&self, id: &str) -> Result<String, ResolutionError> {
        let url = format!("https://www.youtube.com/watch?v={id}&hl=en");
        self.agent
            .get(&url)
            .set("User-Agent", USER_AGENT)
            .set("Accept-Language", ACCEPT_LANGUAGE)
            .call()
            .map_err(|err| ResolutionError::Http(err.to_string()))?
            .into_string()
            .map_err(|err| ResolutionError::Http(err.to_string()))
    }

    fn query_player(&self, id: &str, tokens: &PageTokens) -> Result<String, ResolutionError> {
        let url = format!(
            "https://www.youtube.com/youtubei/v1/player?key={}",
            tokens.api_key
        );
        let body = self
            .agent
            .post(&url)
            .set("User-Agent", USER_AGENT)
            .set("Accept-Language", ACCEPT_LANGUAGE)
            .send_json(player_request(id, tokens))
            .map_err(|err| ResolutionError::Http(err.to_string()))?
            .into_string()
            .map_err(|err| ResolutionError::Http(err.to_string()))?;
        manifest_from_player_api(&body)
    }
}

impl ManifestResolver for YouTubeResolver {
    fn resolve(&self, source: &str) -> Result<String, ResolutionError> {
        let id = extract_video_id(source).ok_or(ResolutionError::BadId)?;
        let html = self.fetch_watch_page(&id)?;
        if let Some(url) = manifest_from_page(&html) {
            return Ok(url);
        }
        let tokens = page_tokens(&html)?;
        self.query_player(&id, &tokens)
    }
}

/// Video id from a watch URL (`?v=`), a path-style URL (`/live/ID`,
/// `/embed/ID`), a `youtu.be` short link, or a bare id.
pub fn extract_video_id(source: &str) -> Option<String> {
    let source = source.trim();
    if source.is_empty() {
        return None;
    }
    if source.contains("youtube.com") {
        let without_fragment = source.split('#').next().unwrap_or(source);
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (without_fragment, None),
        };
        let from_query = query.and_then(|query| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, value)| *key == "v" && !value.is_empty())
                .map(|(_, value)| value.to_string())
        });
        if from_query.is_some() {
            return from_query;
        }
        let after_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
        let route = after_scheme.split_once('/').map_or("", |(_, rest)| rest);
        return route
            .trim_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
    }
    if let Some(index) = source.find("youtu.be/") {
        let rest = source[index + "youtu.be/".len()..].trim_matches('/');
        let id = rest.split('?').next().unwrap_or_default();
        return (!id.is_empty()).then(|| id.to_string());
    }
    Some(source.to_string())
}

/// The brace-balanced `{...}` block that follows the first occurrence of `name`.
pub(crate) fn extract_json_block<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let start = html.find(name)?;
    let open = start + html[start..].find('{')?;
    let mut depth = 0usize;
    for (offset, byte) in html.as_bytes()[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&html[open..=open + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// First capture group of `pattern` in `text`.
pub(crate) fn find_first(pattern: &str, text: &str) -> Option<String> {
    let regex = Regex::new(pattern).ok()?;
    regex
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
}

/// Manifest URL from the player response embedded in the watch page.
pub(crate) fn manifest_from_page(html: &str) -> Option<String> {
    let block = extract_json_block(html, "ytInitialPlayerResponse")?;
    let response: PlayerResponse = serde_json::from_str(block).ok()?;
    let url = response.streaming_data.hls_manifest_url;
    (!url.is_empty()).then_some(url)
}

pub(crate) fn page_tokens(html: &str) -> Result<PageTokens, ResolutionError> {
    let api_key = find_first(r#""INNERTUBE_API_KEY":"([^"]+)""#, html);
    let client_version = find_first(r#""INNERTUBE_CLIENT_VERSION":"([^"]+)""#, html);
    let (Some(api_key), Some(client_version)) = (api_key, client_version) else {
        return Err(ResolutionError::MissingTokens);
    };
    let signature_timestamp = find_first(r#""STS":([0-9]+)"#, html)
        .and_then(|sts| sts.parse().ok())
        .unwrap_or(0);
    Ok(PageTokens {
        api_key,
        client_version,
        signature_timestamp,
    })
}

pub(crate) fn player_request(id: &str, tokens: &PageTokens) -> serde_json::Value {
    let mut body = json!({
        "videoId": id,
        "context": {
            "client": {
                "clientName": "WEB",
                "clientVersion": tokens.client_version,
                "hl": "en",
                "gl": "US",
                "utcOffsetMinutes": 0,
            }
        },
        "racyCheckOk": true,
        "contentCheckOk": true,
    });
    if tokens.signature_timestamp > 0 {
        body["playbackContext"] = json!({
            "contentPlaybackContext": {
                "signatureTimestamp": tokens.signature_timestamp,
            }
        });
    }
    body
}

pub(crate) fn manifest_from_player_api(body: &str) -> Result<String, ResolutionError> {
    let response: PlayerResponse = serde_json::from_str(body)
        .map_err(|err| ResolutionError::MalformedJson(err.to_string()))?;
    let url = response.streaming_data.hls_manifest_url;
    if !url.is_empty() {
        return Ok(url);
    }
    let status = response.playability_status;
    if status.status != "OK" {
        return Err(ResolutionError::Unplayable {
            status: status.status,
            reason: status.reason,
        });
    }
    Err(ResolutionError::MissingManifest)
}
