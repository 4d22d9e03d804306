use image::{RgbaImage, imageops::FilterType};
use thiserror::Error;

/// A supplied image could not be decoded. Fatal to the comparison run:
/// no diff raster or result is produced.
#[derive(Debug, Error)]
#[error("failed to decode image: {0}")]
pub struct DecodeError(#[from] image::ImageError);

/// Decode arbitrary image bytes and resample them onto the fixed
/// `dimension x dimension` comparison grid (bilinear).
///
/// Aspect ratio is intentionally not preserved: both axes are forced to
/// `dimension` so the two sides of a comparison are always directly
/// comparable pixel-for-pixel. Distortion is the accepted cost.
pub fn normalize(bytes: &[u8], dimension: u32) -> Result<RgbaImage, DecodeError> {
    let decoded = image::load_from_memory(bytes)?;
    Ok(image::imageops::resize(
        &decoded.to_rgba8(),
        dimension,
        dimension,
        FilterType::Triangle,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid_png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, color);
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn output_is_exactly_n_by_n() {
        let png = solid_png(37, 91, Rgba([10, 20, 30, 255]));
        for n in [1u32, 4, 16, 128] {
            let raster = normalize(&png, n).unwrap();
            assert_eq!(raster.dimensions(), (n, n));
            assert_eq!(raster.as_raw().len(), (n * n * 4) as usize);
        }
    }

    #[test]
    fn aspect_ratio_is_not_preserved() {
        // A 64x8 image still lands on a square grid.
        let png = solid_png(64, 8, Rgba([200, 100, 50, 255]));
        let raster = normalize(&png, 16).unwrap();
        assert_eq!(raster.dimensions(), (16, 16));
    }

    #[test]
    fn same_bytes_normalize_identically() {
        let png = solid_png(50, 33, Rgba([1, 2, 3, 255]));
        let a = normalize(&png, 10).unwrap();
        let b = normalize(&png, 10).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn solid_color_survives_resampling() {
        let png = solid_png(30, 30, Rgba([9, 99, 199, 255]));
        let raster = normalize(&png, 8).unwrap();
        assert!(raster.pixels().all(|p| *p == Rgba([9, 99, 199, 255])));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(normalize(b"definitely not an image", 16).is_err());
    }
}
