use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::compare::{self, CompareResult, DiffEngine, PixelmatchEngine};
use crate::config::{self, CliOverrides, CompareConfig};
use crate::config::resolve::EnvOverrides;
use crate::normalize;
use crate::report::terminal;

/// `pixgrade compare` — resolve settings, normalize both sides, diff,
/// classify, write the diff PNG, and print the result card.
pub async fn compare(
    left: PathBuf,
    right: PathBuf,
    output: PathBuf,
    overrides: CliOverrides,
) -> Result<()> {
    let settings = config::load().merged(&EnvOverrides::from_env(), &overrides);
    let resolved = CompareConfig::resolve(&settings);

    // The CLI analog of the original's save-on-change: persist the merged
    // record once resolution has succeeded, and never let a write failure
    // abort the comparison.
    if overrides.any() {
        if let Err(e) = config::save(&settings) {
            warn!(error = %e, "failed to persist settings");
        }
    }

    let result = run_pipeline(&left, &right, &output, &resolved).await?;
    terminal::print_result(&result, &output);
    Ok(())
}

/// The comparison pipeline proper: both sides are decoded and resampled
/// concurrently, then diffed once both rasters exist. All-or-nothing — a
/// decode failure on either side aborts with no partial result.
pub(crate) async fn run_pipeline(
    left: &Path,
    right: &Path,
    output: &Path,
    config: &CompareConfig,
) -> Result<CompareResult> {
    let dimension = config.sample_dimension;
    let (left_raster, right_raster) = tokio::try_join!(
        load_side(left.to_path_buf(), dimension),
        load_side(right.to_path_buf(), dimension),
    )?;

    let engine = PixelmatchEngine;
    debug!(engine = engine.name(), dimension, "running diff");
    let diff = compare::run(&engine, &left_raster, &right_raster, config);

    diff.diff_image
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let total_pixels = u64::from(dimension) * u64::from(dimension);
    Ok(CompareResult::new(diff.mismatched_pixels, total_pixels))
}

/// Read + decode + resample one side. Runs on the blocking pool; the two
/// sides share nothing, so they can proceed in parallel.
async fn load_side(path: PathBuf, dimension: u32) -> Result<RgbaImage> {
    tokio::task::spawn_blocking(move || -> Result<RgbaImage> {
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raster = normalize::normalize(&bytes, dimension)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        Ok(raster)
    })
    .await
    .context("Decode task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use image::Rgba;

    fn write_solid_png(path: &Path, w: u32, h: u32, color: Rgba<u8>) {
        image::RgbaImage::from_pixel(w, h, color)
            .save(path)
            .unwrap();
    }

    fn config_with_dimension(n: u32) -> CompareConfig {
        let settings = Settings {
            sample_dimension: n.to_string(),
            ..Settings::default()
        };
        CompareConfig::resolve(&settings)
    }

    #[tokio::test]
    async fn self_comparison_is_very_similar() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("a.png");
        let out = dir.path().join("diff.png");
        write_solid_png(&img, 33, 21, Rgba([180, 40, 90, 255]));

        let result = run_pipeline(&img, &img, &out, &config_with_dimension(4))
            .await
            .unwrap();
        assert_eq!(result.mismatched_pixels, 0);
        assert_eq!(result.total_pixels, 16);
        assert_eq!(result.diff_percent, 0.0);
        assert_eq!(result.category.label, "Very similar");
    }

    #[tokio::test]
    async fn disjoint_colors_are_very_different() {
        let dir = tempfile::tempdir().unwrap();
        let black = dir.path().join("black.png");
        let white = dir.path().join("white.png");
        let out = dir.path().join("diff.png");
        // Different source dimensions on purpose; normalization evens them out.
        write_solid_png(&black, 40, 40, Rgba([0, 0, 0, 255]));
        write_solid_png(&white, 64, 32, Rgba([255, 255, 255, 255]));

        let result = run_pipeline(&black, &white, &out, &config_with_dimension(10))
            .await
            .unwrap();
        assert_eq!(result.mismatched_pixels, result.total_pixels);
        assert_eq!(result.diff_percent, 100.0);
        assert_eq!(result.category.label, "Very different");
    }

    #[tokio::test]
    async fn diff_png_is_a_standalone_image_at_grid_size() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        let out = dir.path().join("diff.png");
        write_solid_png(&a, 20, 20, Rgba([0, 0, 0, 255]));
        write_solid_png(&b, 20, 20, Rgba([255, 255, 255, 255]));

        run_pipeline(&a, &b, &out, &config_with_dimension(12))
            .await
            .unwrap();

        let reloaded = image::open(&out).unwrap();
        assert_eq!(reloaded.width(), 12);
        assert_eq!(reloaded.height(), 12);
    }

    #[tokio::test]
    async fn undecodable_input_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        let out = dir.path().join("diff.png");
        write_solid_png(&good, 10, 10, Rgba([1, 2, 3, 255]));
        std::fs::write(&bad, b"not an image").unwrap();

        let result = run_pipeline(&good, &bad, &out, &config_with_dimension(8)).await;
        assert!(result.is_err());
        assert!(!out.exists(), "no partial diff output on failure");
    }

    #[tokio::test]
    async fn missing_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let out = dir.path().join("diff.png");
        write_solid_png(&good, 10, 10, Rgba([1, 2, 3, 255]));

        let missing = dir.path().join("nope.png");
        assert!(run_pipeline(&good, &missing, &out, &config_with_dimension(8))
            .await
            .is_err());
    }
}
