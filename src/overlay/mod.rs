/// Map marker overlay for location submissions
///
/// Draws where a submission claims the photo was taken onto a copy of the
/// campus map:
/// - a filled marker disc with a contrasting ring
/// - a crosshair through the marker centre
/// - a coordinate label above and to the right, kept inside the image
///
/// Tall maps are then scaled down to fit the review window.

pub mod draw;
pub mod label;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::config::CoordinateScale;
use crate::state::data::Coordinates;
use draw::{fill_disc, fill_rect, fill_ring};
use label::{draw_text, text_size};

pub const MARKER_RADIUS: i64 = 35;
pub const RING_RADIUS: i64 = 40;
pub const RING_WIDTH: i64 = 4;
pub const CROSSHAIR_HALF_LENGTH: i64 = 25;
pub const CROSSHAIR_WIDTH: i64 = 4;

/// Label offset from the marker centre (right and up)
pub const LABEL_OFFSET: i64 = 30;
/// Minimum distance between the label and the left/right image edges
pub const LABEL_MARGIN_X: i64 = 10;
/// Minimum distance between the label and the top image edge
pub const LABEL_MIN_TOP: i64 = 30;
/// Background padding around the label text
pub const LABEL_PADDING: i64 = 5;

/// Maps taller than this are downscaled for display
pub const DISPLAY_MAX_HEIGHT: u32 = 800;

/// Marker pixels stay within this magnitude so huge or infinite stored
/// coordinates land far off the map instead of overflowing the drawing maths
const MARKER_PIXEL_LIMIT: f64 = i32::MAX as f64;

const MARKER_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const CONTRAST_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Label text bounds in map pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

#[cfg(test)]
impl LabelBox {
    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }
}

/// Pixel position of the marker: `(round(fx * W), round(fy * H))`
pub fn marker_pixel(
    width: u32,
    height: u32,
    coords: Coordinates,
    scale: CoordinateScale,
) -> (i64, i64) {
    let to_pixel = |value: f64, extent: u32| {
        (scale.normalize(value) * extent as f64)
            .round()
            .clamp(-MARKER_PIXEL_LIMIT, MARKER_PIXEL_LIMIT) as i64
    };
    (to_pixel(coords.x, width), to_pixel(coords.y, height))
}

/// Place the label right of and above the marker, clamped so it stays at
/// least `LABEL_MARGIN_X` from the sides, `LABEL_MIN_TOP` from the top, and
/// inside the bottom edge.
pub fn place_label(
    width: u32,
    height: u32,
    marker: (i64, i64),
    text: (u32, u32),
) -> LabelBox {
    let (px, py) = marker;
    let text_w = text.0 as i64;
    let text_h = text.1 as i64;

    let left = (px + LABEL_OFFSET)
        .min(width as i64 - text_w - LABEL_MARGIN_X)
        .max(LABEL_MARGIN_X);
    let top = (py - LABEL_OFFSET - text_h)
        .min(height as i64 - text_h)
        .max(LABEL_MIN_TOP);

    LabelBox {
        left,
        top,
        width: text_w,
        height: text_h,
    }
}

/// Size after fitting into `DISPLAY_MAX_HEIGHT`, preserving aspect ratio
pub fn display_size(width: u32, height: u32) -> (u32, u32) {
    if height <= DISPLAY_MAX_HEIGHT {
        return (width, height);
    }

    let scale = DISPLAY_MAX_HEIGHT as f64 / height as f64;
    let scaled_width = (width as f64 * scale).round().max(1.0) as u32;
    (scaled_width, DISPLAY_MAX_HEIGHT)
}

/// Coordinate values as shown on the label, one decimal place
pub fn label_text(coords: Coordinates, scale: CoordinateScale) -> String {
    match scale {
        CoordinateScale::Fraction => format!("({:.1}, {:.1})", coords.x, coords.y),
        CoordinateScale::Percent => format!("({:.1}%, {:.1}%)", coords.x, coords.y),
    }
}

/// Render the marker overlay onto a copy of `base_map`
///
/// The base map is left untouched, so repeated calls never accumulate markers.
pub fn render(base_map: &RgbaImage, coords: Coordinates, scale: CoordinateScale) -> RgbaImage {
    let (width, height) = base_map.dimensions();
    let (px, py) = marker_pixel(width, height, coords, scale);

    let mut canvas = base_map.clone();

    // Marker and ring
    fill_disc(&mut canvas, px, py, MARKER_RADIUS, MARKER_COLOR);
    fill_ring(&mut canvas, px, py, RING_RADIUS, RING_WIDTH, CONTRAST_COLOR);

    // Crosshair
    let arm = CROSSHAIR_HALF_LENGTH * 2 + 1;
    let half_width = CROSSHAIR_WIDTH / 2;
    fill_rect(
        &mut canvas,
        px - CROSSHAIR_HALF_LENGTH,
        py - half_width,
        arm,
        CROSSHAIR_WIDTH,
        CONTRAST_COLOR,
    );
    fill_rect(
        &mut canvas,
        px - half_width,
        py - CROSSHAIR_HALF_LENGTH,
        CROSSHAIR_WIDTH,
        arm,
        CONTRAST_COLOR,
    );

    // Label on an opaque background
    let text = label_text(coords, scale);
    let label = place_label(width, height, (px, py), text_size(&text));
    fill_rect(
        &mut canvas,
        label.left - LABEL_PADDING,
        label.top - LABEL_PADDING,
        label.width + LABEL_PADDING * 2,
        label.height + LABEL_PADDING * 2,
        CONTRAST_COLOR,
    );
    draw_text(&mut canvas, &text, label.left, label.top, MARKER_COLOR);

    let (display_width, display_height) = display_size(width, height);
    if (display_width, display_height) == (width, height) {
        canvas
    } else {
        imageops::resize(&canvas, display_width, display_height, FilterType::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn at(x: f64, y: f64) -> Coordinates {
        Coordinates { x, y }
    }

    #[test]
    fn test_marker_pixel_fraction() {
        let cases = [
            ((1000, 500), (0.5, 0.25), (500, 125)),
            ((301, 199), (0.333, 0.667), (100, 133)),
            ((640, 480), (0.0, 1.0), (0, 480)),
            ((1234, 987), (0.9999, 0.0001), (1234, 0)),
        ];

        for ((w, h), (fx, fy), expected) in cases {
            assert_eq!(
                marker_pixel(w, h, at(fx, fy), CoordinateScale::Fraction),
                expected,
                "map {}x{} at ({}, {})",
                w,
                h,
                fx,
                fy
            );
        }
    }

    #[test]
    fn test_marker_pixel_percent() {
        assert_eq!(
            marker_pixel(1000, 500, at(50.0, 25.0), CoordinateScale::Percent),
            (500, 125)
        );
        // The same stored values read as fractions land far outside the map
        assert_eq!(
            marker_pixel(1000, 500, at(50.0, 25.0), CoordinateScale::Fraction),
            (50_000, 12_500)
        );
    }

    #[test]
    fn test_label_right_of_and_above_marker() {
        let label = place_label(1200, 900, (300, 300), (160, 16));
        assert_eq!(
            label,
            LabelBox {
                left: 330,
                top: 254,
                width: 160,
                height: 16
            }
        );
    }

    #[test]
    fn test_label_always_within_bounds() {
        let (width, height) = (1200u32, 900u32);
        let text = (224, 16);
        let positions = [-500, -1, 0, 5, 29, 30, 60, 450, 899, 900, 1170, 1199, 1200, 5000];

        for &px in &positions {
            for &py in &positions {
                let label = place_label(width, height, (px, py), text);
                assert!(label.left >= LABEL_MARGIN_X, "left at marker ({}, {})", px, py);
                assert!(
                    label.right() <= width as i64 - LABEL_MARGIN_X,
                    "right at marker ({}, {})",
                    px,
                    py
                );
                assert!(label.top >= LABEL_MIN_TOP, "top at marker ({}, {})", px, py);
                assert!(label.bottom() <= height as i64, "bottom at marker ({}, {})", px, py);
            }
        }
    }

    #[test]
    fn test_display_size() {
        assert_eq!(display_size(1000, 800), (1000, 800));
        assert_eq!(display_size(1000, 300), (1000, 300));
        assert_eq!(display_size(1200, 1600), (600, 800));

        let (w, h) = display_size(1917, 1333);
        assert_eq!(h, DISPLAY_MAX_HEIGHT);
        let ratio_in = 1917.0 / 1333.0;
        let ratio_out = w as f64 / h as f64;
        assert!((ratio_in - ratio_out).abs() < 1.0 / h as f64);
    }

    #[test]
    fn test_label_text() {
        assert_eq!(label_text(at(0.5, 0.4), CoordinateScale::Fraction), "(0.5, 0.4)");
        assert_eq!(
            label_text(at(50.0, 12.34), CoordinateScale::Percent),
            "(50.0%, 12.3%)"
        );
    }

    #[test]
    fn test_render_draws_marker_without_touching_base() {
        let base = RgbaImage::from_pixel(400, 300, GRAY);
        let out = render(&base, at(0.5, 0.5), CoordinateScale::Fraction);

        assert_eq!(out.dimensions(), (400, 300));
        // Disc centre is covered by the crosshair, disc body is red
        assert_eq!(out.get_pixel(200, 150), &CONTRAST_COLOR);
        assert_eq!(out.get_pixel(200 - 30, 150 - 10), &MARKER_COLOR);
        // Crosshair arm
        assert_eq!(out.get_pixel(200 + 20, 150), &CONTRAST_COLOR);
        // Gap between disc and ring shows the map
        assert_eq!(out.get_pixel(200 - 37, 150), &GRAY);
        // Ring
        assert_eq!(out.get_pixel(200 - 40, 150), &CONTRAST_COLOR);

        assert!(base.pixels().all(|p| *p == GRAY));
    }

    #[test]
    fn test_render_percent_matches_fraction() {
        let base = RgbaImage::from_pixel(400, 300, GRAY);
        let from_percent = render(&base, at(50.0, 50.0), CoordinateScale::Percent);
        let from_fraction = render(&base, at(0.5, 0.5), CoordinateScale::Fraction);

        // Same marker, only the label text differs
        assert_eq!(from_percent.get_pixel(170, 140), from_fraction.get_pixel(170, 140));
        assert_eq!(from_percent.get_pixel(170, 140), &MARKER_COLOR);
    }

    #[test]
    fn test_render_does_not_accumulate() {
        let base = RgbaImage::from_pixel(400, 300, GRAY);
        let _first = render(&base, at(0.2, 0.2), CoordinateScale::Fraction);
        let second = render(&base, at(0.8, 0.8), CoordinateScale::Fraction);

        // The first marker centre (80, 60) is untouched in the second render
        assert_eq!(second.get_pixel(80 - 20, 60 + 10), &GRAY);
    }

    #[test]
    fn test_render_downscales_tall_maps() {
        let base = RgbaImage::from_pixel(300, 1200, GRAY);
        let out = render(&base, at(0.5, 0.5), CoordinateScale::Fraction);
        assert_eq!(out.dimensions(), (200, 800));
    }

    #[test]
    fn test_render_off_map_marker() {
        let base = RgbaImage::from_pixel(400, 300, GRAY);
        // Percent-style values read as fractions put the marker off the map
        let out = render(&base, at(50.0, 50.0), CoordinateScale::Fraction);
        assert_eq!(out.dimensions(), (400, 300));
        assert_eq!(out.get_pixel(200, 150), &GRAY);

        // The label is still clamped into the bottom-right corner
        let label = place_label(400, 300, (20_000, 15_000), text_size("(50.0, 50.0)"));
        assert_eq!((label.left, label.top), (198, 284));
        assert_eq!(out.get_pixel(194, 290), &CONTRAST_COLOR);
    }

    #[test]
    fn test_marker_pixel_is_bounded() {
        let limit = i32::MAX as i64;
        assert_eq!(
            marker_pixel(400, 300, at(1e17, 0.5), CoordinateScale::Fraction),
            (limit, 150)
        );
        assert_eq!(
            marker_pixel(400, 300, at(f64::NEG_INFINITY, f64::INFINITY), CoordinateScale::Percent),
            (-limit, limit)
        );
    }

    #[test]
    fn test_render_absurd_coordinates() {
        let base = RgbaImage::from_pixel(400, 300, GRAY);
        let cases = [
            (at(1e17, 0.5), CoordinateScale::Fraction),
            (at(0.5, -1e17), CoordinateScale::Fraction),
            (at(f64::NEG_INFINITY, 50.0), CoordinateScale::Percent),
            (at(f64::INFINITY, f64::INFINITY), CoordinateScale::Percent),
        ];

        for (coords, scale) in cases {
            let out = render(&base, coords, scale);
            assert_eq!(out.dimensions(), (400, 300), "{:?}", coords);
            // Marker is off the map, so the centre shows the base map
            assert_eq!(out.get_pixel(200, 150), &GRAY, "{:?}", coords);
        }
    }
}
