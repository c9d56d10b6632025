//! Image Resolver (stock-photo search) and image fetching.

use crate::deck::{ImageData, ImageKind};
use crate::error::Result;
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use slidegen_common::{ConfigError, DeckConfig};
use std::io::Cursor;

/// Substituted whenever no usable image URL was resolved.
pub const PLACEHOLDER_URL: &str = "https://via.placeholder.com/300x200?text=No+Image";

/// Appended to every raw search result URL.
pub const DISPLAY_SIZE_SUFFIX: &str = "&w=1600&dpr=2";

/// Keep `url` if it looks like an HTTP(S) URL, otherwise use the placeholder.
pub fn sanitize_image_url(url: Option<&str>) -> &str {
    match url {
        Some(u) if u.starts_with("http") => u,
        _ => PLACEHOLDER_URL,
    }
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// URL of the first matching photo, or `None` when nothing usable came
    /// back. Failures are logged, never returned.
    async fn first_image_url(&self, query: &str) -> Option<String>;

    /// One lookup per query, strictly in order. Absent queries stay absent.
    async fn resolve_all(&self, queries: &[Option<&str>]) -> Vec<Option<String>> {
        let mut urls = Vec::with_capacity(queries.len());
        for query in queries {
            let url = match query {
                Some(q) => self.first_image_url(q).await,
                None => None,
            };
            urls.push(url);
        }
        urls
    }
}

#[async_trait]
pub trait ImageFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    urls: ResultUrls,
}

#[derive(Debug, Deserialize)]
struct ResultUrls {
    raw: String,
}

/// Pull the first raw URL out of a photo-search response body.
pub fn parse_search_response(body: &str) -> Option<String> {
    match serde_json::from_str::<SearchResponse>(body) {
        Ok(resp) => resp
            .results
            .into_iter()
            .next()
            .map(|r| format!("{}{DISPLAY_SIZE_SUFFIX}", r.urls.raw)),
        Err(e) => {
            tracing::warn!("Malformed photo search response: {e}");
            None
        }
    }
}

/// Unsplash photo search, authenticated with the access key as `client_id`.
pub struct UnsplashClient {
    http: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    pub fn from_config(config: &DeckConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            http: reqwest::Client::new(),
            access_key: config.image_api_key()?.to_string(),
            base_url: config.image_base_url.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search/photos", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn first_image_url(&self, query: &str) -> Option<String> {
        let resp = self
            .http
            .get(self.search_url())
            .query(&[("client_id", self.access_key.as_str()), ("query", query)])
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Photo search for '{query}' failed: {e}");
                return None;
            }
        };

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!("Photo search for '{query}' returned http {status}");
            return None;
        }

        match resp.text().await {
            Ok(body) => {
                let url = parse_search_response(&body);
                if url.is_none() {
                    tracing::debug!("No photo found for '{query}'");
                }
                url
            }
            Err(e) => {
                tracing::warn!("Reading photo search body for '{query}' failed: {e}");
                None
            }
        }
    }
}

/// Plain HTTP GET of image bytes.
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetch for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("image fetch http {status} for {url}").into());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl ImageData {
    /// Sniff the format; PNG/JPEG/GIF are kept verbatim, anything else the
    /// decoder understands is re-encoded as PNG.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let kind = match image::guess_format(&bytes)? {
            image::ImageFormat::Png => Some(ImageKind::Png),
            image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            image::ImageFormat::Gif => Some(ImageKind::Gif),
            _ => None,
        };

        match kind {
            Some(kind) => Ok(Self { bytes, kind }),
            None => {
                let decoded = image::load_from_memory(&bytes)?;
                let mut png = Vec::new();
                decoded.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
                Ok(Self {
                    bytes: png,
                    kind: ImageKind::Png,
                })
            }
        }
    }

    /// Built-in 300x200 light gray PNG, used when even the placeholder URL
    /// can't be fetched.
    pub fn placeholder() -> Result<Self> {
        let canvas = image::RgbImage::from_pixel(300, 200, image::Rgb([220, 220, 220]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
        Ok(Self {
            bytes: png,
            kind: ImageKind::Png,
        })
    }
}

/// Resolved URL to embeddable bytes. Returns the data and whether a
/// placeholder had to stand in.
pub async fn load_image(fetcher: &dyn ImageFetch, resolved: Option<&str>) -> Result<(ImageData, bool)> {
    let url = sanitize_image_url(resolved);
    let substituted = url == PLACEHOLDER_URL;

    let fetched = match fetcher.fetch(url).await {
        Ok(bytes) => ImageData::from_bytes(bytes),
        Err(e) => Err(e),
    };

    match fetched {
        Ok(data) => Ok((data, substituted)),
        Err(e) => {
            tracing::warn!("Using built-in placeholder for {url}: {e}");
            Ok((ImageData::placeholder()?, true))
        }
    }
}
