pub mod classify;
pub mod pixelmatch;

use image::RgbaImage;

use crate::config::CompareConfig;

pub use self::classify::CompareResult;
pub use self::pixelmatch::PixelmatchEngine;

/// Output of one engine invocation: the mismatch count and the rendered
/// diff raster (same dimensions and byte layout as the inputs).
pub struct DiffOutput {
    pub mismatched_pixels: u64,
    pub diff_image: RgbaImage,
}

/// The pixel-level comparison primitive.
///
/// Implementations must be deterministic and pure: the same two rasters
/// and config always produce the same count and raster. The rest of the
/// pipeline (classification, tests) relies on this. Any algorithm may sit
/// behind this boundary.
pub trait DiffEngine {
    fn name(&self) -> &'static str;

    fn diff(&self, left: &RgbaImage, right: &RgbaImage, config: &CompareConfig) -> DiffOutput;
}

/// Adapter entry point. The normalizer guarantees equal dimensions by
/// construction, so a mismatch here is a programming error, not a
/// recoverable condition.
pub fn run(
    engine: &dyn DiffEngine,
    left: &RgbaImage,
    right: &RgbaImage,
    config: &CompareConfig,
) -> DiffOutput {
    assert_eq!(
        left.dimensions(),
        right.dimensions(),
        "raster dimensions must match before diffing"
    );
    engine.diff(left, right, config)
}
