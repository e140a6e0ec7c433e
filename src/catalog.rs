use reqwest::Client;
use serde::Deserialize;

use crate::types::{Track, deserialize_id};

const API_BASE: &str = "https://api.soundcloud.com";
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("SOUNDCLOUD_CLIENT_ID not set")]
    MissingClientId,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("SoundCloud HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawUser {
    username: Option<String>,
}

#[derive(Deserialize)]
struct RawTrack {
    #[serde(default, deserialize_with = "deserialize_id")]
    id: String,
    title: Option<String>,
    user: Option<RawUser>,
    duration: Option<u64>,
    genre: Option<String>,
    bpm: Option<f64>,
    key: Option<String>,
    playback_count: Option<u64>,
    likes_count: Option<u64>,
    permalink_url: Option<String>,
}

impl From<RawTrack> for Track {
    fn from(raw: RawTrack) -> Self {
        Track {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            artist: raw
                .user
                .and_then(|user| user.username)
                .unwrap_or_else(|| "Unknown".to_string()),
            duration_ms: raw.duration.unwrap_or(0),
            genre: raw.genre.filter(|genre| !genre.trim().is_empty()),
            bpm: raw.bpm,
            key: raw.key.filter(|key| !key.trim().is_empty()),
            playback_count: raw.playback_count.unwrap_or(0),
            likes_count: raw.likes_count.unwrap_or(0),
            permalink_url: raw.permalink_url,
        }
    }
}

/// Search responses are either a bare array or a `collection` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSearchResponse {
    Bare(Vec<RawTrack>),
    Paged { collection: Vec<RawTrack> },
}

pub struct SoundCloudClient {
    http: Client,
    client_id: String,
}

impl SoundCloudClient {
    pub fn new(http: Client, client_id: impl Into<String>) -> Self {
        Self {
            http,
            client_id: client_id.into(),
        }
    }

    /// Client configured from `SOUNDCLOUD_CLIENT_ID`.
    pub fn from_env() -> Result<Self, CatalogError> {
        let client_id = crate::config::soundcloud_client_id()?;
        Ok(Self::new(Client::new(), client_id))
    }

    /// Resolve a public track page URL to its metadata.
    pub async fn resolve(&self, track_url: &str) -> Result<Track, CatalogError> {
        let url = resolve_url(track_url, &self.client_id);
        let body = self.get_text(&url).await?;
        let track = decode_track(&body)?;
        tracing::debug!(id = %track.id, title = %track.title, "resolved track");
        Ok(track)
    }

    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<Track>, CatalogError> {
        let url = search_url(query, limit, &self.client_id);
        let body = self.get_text(&url).await?;
        let tracks = decode_search(&body)?;
        tracing::debug!(query, count = tracks.len(), "search returned");
        Ok(tracks)
    }

    /// Resolve each URL in order, skipping the ones that fail.
    pub async fn resolve_all(&self, track_urls: &[String]) -> Vec<Track> {
        let mut tracks = Vec::with_capacity(track_urls.len());
        for track_url in track_urls {
            match self.resolve(track_url).await {
                Ok(track) => {
                    tracing::info!("Found: {} by {}", track.title, track.artist);
                    tracks.push(track);
                }
                Err(e) => tracing::warn!(url = %track_url, "skipping track: {e}"),
            }
        }
        tracks
    }

    async fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(CatalogError::Status {
                status: resp.status().as_u16(),
                url: redact_client_id(url),
            });
        }
        Ok(resp.text().await?)
    }
}

fn resolve_url(track_url: &str, client_id: &str) -> String {
    format!(
        "{API_BASE}/resolve?url={}&client_id={}",
        urlencoding(track_url),
        urlencoding(client_id)
    )
}

fn search_url(query: &str, limit: u32, client_id: &str) -> String {
    format!(
        "{API_BASE}/tracks?q={}&client_id={}&limit={limit}",
        urlencoding(query),
        urlencoding(client_id)
    )
}

fn redact_client_id(url: &str) -> String {
    match url.find("client_id=") {
        Some(start) => {
            let value_start = start + "client_id=".len();
            let value_end = url[value_start..]
                .find('&')
                .map_or(url.len(), |offset| value_start + offset);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}

fn decode_track(body: &str) -> Result<Track, CatalogError> {
    let raw: RawTrack = serde_json::from_str(body)?;
    Ok(raw.into())
}

fn decode_search(body: &str) -> Result<Vec<Track>, CatalogError> {
    let raw = match serde_json::from_str(body)? {
        RawSearchResponse::Bare(tracks) => tracks,
        RawSearchResponse::Paged { collection } => collection,
    };
    Ok(raw.into_iter().map(Track::from).collect())
}

fn urlencoding(s: &str) -> String {
    use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
    const SET: &AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'~');
    utf8_percent_encode(s, SET).to_string()
}
