/// Submission image download and decoding
///
/// Images are fetched with a plain GET (no auth headers), the whole body is
/// read into memory and decoded with the format sniffed from its content.

use async_trait::async_trait;
use image::RgbaImage;
use std::time::Duration;
use tokio::task;
use tracing::debug;

use crate::error::ReviewError;

/// Retrieves a raster image for a stored URL
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RgbaImage, ReviewError>;
}

/// HTTP(S) fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the client; `timeout: None` waits forever for slow hosts
    pub fn new(timeout: Option<Duration>) -> Result<Self, ReviewError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| ReviewError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RgbaImage, ReviewError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReviewError::fetch(url, describe(&e)))?;

        if !response.status().is_success() {
            return Err(ReviewError::fetch(
                url,
                format!("server returned status {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ReviewError::fetch(url, format!("failed to read body: {}", e)))?;

        debug!("Downloaded {} bytes from {}", body.len(), url);

        // Spawn blocking because decoding large photos is CPU-intensive
        let owned_url = url.to_string();
        task::spawn_blocking(move || decode_image(&body, &owned_url)).await?
    }
}

/// Decode an in-memory image of any supported format
pub fn decode_image(bytes: &[u8], url: &str) -> Result<RgbaImage, ReviewError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ReviewError::fetch(url, format!("undecodable image: {}", e)))?;
    Ok(image.to_rgba8())
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("failed to connect: {}", err)
    } else {
        err.to_string()
    }
}
