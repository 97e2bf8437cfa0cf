use image::RgbaImage;
use std::path::PathBuf;
use tokio::task;
use tracing::info;

use crate::error::ReviewError;

/// Load the static base map from disk
///
/// Runs on the blocking pool because large PNG maps take a while to decode.
pub async fn load_base_map(path: PathBuf) -> Result<RgbaImage, ReviewError> {
    task::spawn_blocking(move || -> Result<RgbaImage, ReviewError> {
        let map = image::open(&path)
            .map_err(|e| ReviewError::base_map(path.display().to_string(), e.to_string()))?
            .to_rgba8();

        info!(
            "🗺️  Loaded base map {} ({}x{})",
            path.display(),
            map.width(),
            map.height()
        );
        Ok(map)
    })
    .await?
}
