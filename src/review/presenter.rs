use async_trait::async_trait;
use image::RgbaImage;
use std::fmt;

use crate::error::ReviewError;
use crate::state::data::KeyPress;

/// Panel titles
pub const MAP_TITLE: &str = "UW Campus Map with Location";
pub const LOCATION_TITLE: &str = "Location Image";
pub const POSTER_TITLE: &str = "Poster";

/// One titled image shown to the reviewer
#[derive(Clone)]
pub struct Panel {
    pub title: String,
    pub image: RgbaImage,
}

impl Panel {
    pub fn new(title: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            title: title.into(),
            image,
        }
    }
}

// Keep pixel buffers out of debug output
impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("title", &self.title)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// Shows panels to the reviewer and waits for a single key.
///
/// Implementations clear the previous iteration's panels before showing new
/// ones, and fail with `ReviewError::Display` if the reviewer goes away.
#[async_trait]
pub trait Presenter: Send {
    async fn present(&mut self, panels: Vec<Panel>) -> Result<KeyPress, ReviewError>;
}
