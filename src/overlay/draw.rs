/// Clipped raster primitives
///
/// Coordinates are signed so shapes centred outside the image (e.g. a marker
/// from out-of-range coordinates) draw whatever part is visible.

use image::{Rgba, RgbaImage};

/// Fill an axis-aligned rectangle
pub fn fill_rect(
    canvas: &mut RgbaImage,
    left: i64,
    top: i64,
    width: i64,
    height: i64,
    color: Rgba<u8>,
) {
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = left.saturating_add(width).min(canvas.width() as i64);
    let y1 = top.saturating_add(height).min(canvas.height() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Fill a solid disc of `radius` around `(cx, cy)`
pub fn fill_disc(canvas: &mut RgbaImage, cx: i64, cy: i64, radius: i64, color: Rgba<u8>) {
    fill_annulus(canvas, cx, cy, 0, radius, color);
}

/// Draw a ring of `thickness` pixels centred on the circle of `radius`
pub fn fill_ring(
    canvas: &mut RgbaImage,
    cx: i64,
    cy: i64,
    radius: i64,
    thickness: i64,
    color: Rgba<u8>,
) {
    let inner = radius - thickness / 2;
    let outer = inner + thickness;
    fill_annulus(canvas, cx, cy, inner, outer, color);
}

/// Pixels whose distance `d` from the centre satisfies `inner <= d <= outer`
/// (upper bound exclusive for rings, inclusive for discs)
fn fill_annulus(
    canvas: &mut RgbaImage,
    cx: i64,
    cy: i64,
    inner: i64,
    outer: i64,
    color: Rgba<u8>,
) {
    let width = canvas.width() as i64;
    let height = canvas.height() as i64;
    let inner_sq = inner * inner;
    let outer_sq = outer * outer;

    let (x0, x1) = (cx.saturating_sub(outer).max(0), cx.saturating_add(outer).min(width - 1));
    let (y0, y1) = (cy.saturating_sub(outer).max(0), cy.saturating_add(outer).min(height - 1));

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x - cx;
            let dy = y - cy;
            let dist_sq = dx * dx + dy * dy;
            let inside = if inner == 0 {
                dist_sq <= outer_sq
            } else {
                dist_sq >= inner_sq && dist_sq < outer_sq
            };
            if inside {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
