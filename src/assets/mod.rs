/// Image assets shown to the reviewer
///
/// This module handles:
/// - Downloading and decoding submission images (fetcher.rs)
/// - Loading the static base map for location submissions (map.rs)

pub mod fetcher;
pub mod map;

pub use fetcher::{AssetFetcher, HttpFetcher};
pub use map::load_base_map;
