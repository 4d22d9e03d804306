//! Production diff engine: per-pixel YIQ color distance with anti-aliasing
//! detection, after the pixelmatch algorithm (Mapbox). Color distance per
//! "Measuring perceived color difference using YIQ NTSC transmission color
//! space in mobile applications" (Kotsarenko & Ramos); anti-aliasing
//! detection per "Anti-aliased Pixel and Intensity Slope Detector"
//! (Vysniauskas, 2009).

use image::{Rgba, RgbaImage};

use crate::compare::{DiffEngine, DiffOutput};
use crate::config::CompareConfig;

/// Maximum possible pixel delta under the YIQ difference metric.
const MAX_YIQ_DELTA: f64 = 35215.0;

pub struct PixelmatchEngine;

impl DiffEngine for PixelmatchEngine {
    fn name(&self) -> &'static str {
        "pixelmatch"
    }

    fn diff(&self, left: &RgbaImage, right: &RgbaImage, config: &CompareConfig) -> DiffOutput {
        let (width, height) = left.dimensions();
        let max_delta = MAX_YIQ_DELTA * (config.color_threshold as f64).powi(2);

        // RgbaImage::new zeroes the buffer, which is exactly the transparent
        // background the mask mode wants.
        let mut out = RgbaImage::new(width, height);
        let mut mismatched: u64 = 0;

        for y in 0..height {
            for x in 0..width {
                let p1 = *left.get_pixel(x, y);
                let p2 = *right.get_pixel(x, y);
                let delta = color_delta(p1, p2, false);

                if delta.abs() <= max_delta {
                    // Matched pixel: dimmed grayscale of the left image,
                    // unless only the mask was requested.
                    if !config.diff_mask_only {
                        out.put_pixel(x, y, gray_pixel(p1, config.blend_alpha as f64));
                    }
                    continue;
                }

                if !config.include_anti_aliasing
                    && (antialiased(left, x, y, right) || antialiased(right, x, y, left))
                {
                    // Anti-aliasing artifact: painted but never counted,
                    // and left out of the mask entirely.
                    if !config.diff_mask_only {
                        out.put_pixel(x, y, config.anti_alias_color.rgba());
                    }
                    continue;
                }

                // A negative delta means the pixel got darker left-to-right.
                let color = if delta < 0.0 {
                    config.diff_color_alt
                } else {
                    config.diff_color
                };
                out.put_pixel(x, y, color.rgba());
                mismatched += 1;
            }
        }

        DiffOutput {
            mismatched_pixels: mismatched,
            diff_image: out,
        }
    }
}

fn gray_pixel(pixel: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    let luma = rgb2y(r as f64, g as f64, b as f64);
    let val = blend(luma, alpha * a as f64 / 255.0) as u8;
    Rgba([val, val, val, 255])
}

/// Whether the pixel at (x, y) looks like an anti-aliasing artifact of
/// `img1`: among its neighbors there are both darker and brighter pixels,
/// few equal ones, and the extreme neighbor sits in a flat region of both
/// images.
fn antialiased(img1: &RgbaImage, x: u32, y: u32, img2: &RgbaImage) -> bool {
    let (width, height) = img1.dimensions();
    let on_edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
    let mut equal: u8 = if on_edge { 1 } else { 0 };

    let mut min = 0.0;
    let mut max = 0.0;
    let (mut min_x, mut min_y) = (0, 0);
    let (mut max_x, mut max_y) = (0, 0);

    let center = *img1.get_pixel(x, y);

    for ax in x.saturating_sub(1)..=(x + 1).min(width - 1) {
        for ay in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            if ax == x && ay == y {
                continue;
            }

            // Brightness-only delta between the center and this neighbor.
            let delta = color_delta(center, *img1.get_pixel(ax, ay), true);

            if delta == 0.0 {
                equal += 1;
                // More than two equal siblings: definitely not anti-aliasing.
                if equal > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                (min_x, min_y) = (ax, ay);
            } else if delta > max {
                max = delta;
                (max_x, max_y) = (ax, ay);
            }
        }
    }

    // Needs both darker and brighter neighbors to be a slope.
    if min == 0.0 || max == 0.0 {
        return false;
    }

    // The extreme neighbor must sit in a flat region of both images.
    (has_many_siblings(img1, min_x, min_y) && has_many_siblings(img2, min_x, min_y))
        || (has_many_siblings(img1, max_x, max_y) && has_many_siblings(img2, max_x, max_y))
}

/// Whether the pixel at (x, y) has 3+ adjacent pixels of exactly its color.
fn has_many_siblings(img: &RgbaImage, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let on_edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
    let mut equal: u8 = if on_edge { 1 } else { 0 };

    let center = *img.get_pixel(x, y);

    for ax in x.saturating_sub(1)..=(x + 1).min(width - 1) {
        for ay in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            if ax == x && ay == y {
                continue;
            }
            if center == *img.get_pixel(ax, ay) {
                equal += 1;
            }
            if equal > 2 {
                return true;
            }
        }
    }

    false
}

/// Perceived color difference of two straight-alpha RGBA pixels. With
/// `y_only` the brightness delta is returned directly; otherwise the full
/// YIQ distance, with the sign encoding whether the pixel darkened
/// (negative) or lightened (positive).
fn color_delta(p1: Rgba<u8>, p2: Rgba<u8>, y_only: bool) -> f64 {
    if p1 == p2 {
        return 0.0;
    }

    let [mut r1, mut g1, mut b1, a1] = p1.0.map(f64::from);
    let [mut r2, mut g2, mut b2, a2] = p2.0.map(f64::from);

    if a1 < 255.0 {
        let a = a1 / 255.0;
        r1 = blend(r1, a);
        g1 = blend(g1, a);
        b1 = blend(b1, a);
    }
    if a2 < 255.0 {
        let a = a2 / 255.0;
        r2 = blend(r2, a);
        g2 = blend(g2, a);
        b2 = blend(b2, a);
    }

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);

    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 { -delta } else { delta }
}

/// Blend a semi-transparent channel value with a white background.
fn blend(c: f64, a: f64) -> f64 {
    255.0 + (c - 255.0) * a
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}
