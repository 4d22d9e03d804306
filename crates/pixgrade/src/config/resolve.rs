use image::Rgba;
use tracing::warn;

use super::Settings;

pub const SAMPLE_DIMENSION_CEILING: u32 = 4096;

const DEFAULT_SAMPLE_DIMENSION: u32 = 128;
const DEFAULT_COLOR_THRESHOLD: f32 = 0.3;
const DEFAULT_BLEND_ALPHA: f32 = 0.1;

fn parse_unit_interval(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

fn parse_sample_dimension(s: &str) -> Result<u32, String> {
    let v: u32 = s.parse().map_err(|e| format!("{e}"))?;
    if v == 0 {
        return Err("must be at least 1".to_string());
    }
    if v > SAMPLE_DIMENSION_CEILING {
        return Err(format!("must be at most {SAMPLE_DIMENSION_CEILING}, got {v}"));
    }
    Ok(v)
}

/// Settings overridden from the CLI. Range-checked at parse time — bad
/// interactive input should error loudly, unlike persisted input which
/// falls back to defaults.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct CliOverrides {
    /// Comparison grid size N; both images are resampled to NxN
    #[arg(long, value_parser = parse_sample_dimension)]
    pub sample_dimension: Option<u32>,

    /// Color matching threshold (0.0-1.0); smaller is more sensitive
    #[arg(long = "threshold", value_parser = parse_unit_interval)]
    pub color_threshold: Option<f32>,

    /// Count anti-aliased pixels as differences
    #[arg(long = "include-aa", value_name = "BOOL")]
    pub include_anti_aliasing: Option<bool>,

    /// Opacity of unchanged pixels in the diff image (0.0-1.0)
    #[arg(long = "alpha", value_parser = parse_unit_interval)]
    pub blend_alpha: Option<f32>,

    /// Color for anti-aliased pixels (#RRGGBB)
    #[arg(long = "aa-color")]
    pub anti_alias_color: Option<String>,

    /// Color for mismatched pixels (#RRGGBB)
    #[arg(long)]
    pub diff_color: Option<String>,

    /// Color for mismatched pixels that darkened instead of lightened (#RRGGBB)
    #[arg(long)]
    pub diff_color_alt: Option<String>,

    /// Draw only the mismatches, over a transparent background
    #[arg(long = "diff-mask", value_name = "BOOL")]
    pub diff_mask_only: Option<bool>,
}

impl CliOverrides {
    /// True when the user changed at least one setting on the command line.
    pub fn any(&self) -> bool {
        self.sample_dimension.is_some()
            || self.color_threshold.is_some()
            || self.include_anti_aliasing.is_some()
            || self.blend_alpha.is_some()
            || self.anti_alias_color.is_some()
            || self.diff_color.is_some()
            || self.diff_color_alt.is_some()
            || self.diff_mask_only.is_some()
    }
}

/// Raw overrides taken from the environment. These enter the same
/// parse-or-fallback path as the settings file.
#[derive(Clone, Debug, Default)]
pub struct EnvOverrides {
    pub sample_dimension: Option<String>,
    pub color_threshold: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            sample_dimension: std::env::var("PIXGRADE_SAMPLE_DIMENSION").ok(),
            color_threshold: std::env::var("PIXGRADE_COLOR_THRESHOLD").ok(),
        }
    }
}

impl Settings {
    /// CLI > env > file > defaults: overlay the env and CLI layers onto the
    /// loaded record, producing the effective raw settings for this run.
    pub fn merged(mut self, env: &EnvOverrides, cli: &CliOverrides) -> Settings {
        if let Some(v) = &env.sample_dimension {
            self.sample_dimension = v.clone();
        }
        if let Some(v) = &env.color_threshold {
            self.color_threshold = v.clone();
        }

        if let Some(v) = cli.sample_dimension {
            self.sample_dimension = v.to_string();
        }
        if let Some(v) = cli.color_threshold {
            self.color_threshold = v.to_string();
        }
        if let Some(v) = cli.include_anti_aliasing {
            self.include_anti_aliasing = v;
        }
        if let Some(v) = cli.blend_alpha {
            self.blend_alpha = v.to_string();
        }
        if let Some(v) = &cli.anti_alias_color {
            self.anti_alias_color = v.clone();
        }
        if let Some(v) = &cli.diff_color {
            self.diff_color = v.clone();
        }
        if let Some(v) = &cli.diff_color_alt {
            self.diff_color_alt = v.clone();
        }
        if let Some(v) = cli.diff_mask_only {
            self.diff_mask_only = v;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

/// Fully typed, validated comparison configuration. Immutable for the
/// duration of one comparison run; a fresh one is resolved per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    pub sample_dimension: u32,
    pub color_threshold: f32,
    pub include_anti_aliasing: bool,
    pub blend_alpha: f32,
    pub anti_alias_color: Rgb,
    pub diff_color: Rgb,
    pub diff_color_alt: Rgb,
    pub diff_mask_only: bool,
}

impl CompareConfig {
    /// Pure function of the raw record: parse every field, substituting the
    /// documented default (and logging) on any malformed value. Never fails.
    pub fn resolve(settings: &Settings) -> Self {
        Self {
            sample_dimension: resolve_dimension(&settings.sample_dimension),
            color_threshold: resolve_unit(
                &settings.color_threshold,
                "color_threshold",
                DEFAULT_COLOR_THRESHOLD,
            ),
            include_anti_aliasing: settings.include_anti_aliasing,
            blend_alpha: resolve_unit(&settings.blend_alpha, "blend_alpha", DEFAULT_BLEND_ALPHA),
            anti_alias_color: resolve_color(&settings.anti_alias_color, "anti_alias_color"),
            diff_color: resolve_color(&settings.diff_color, "diff_color"),
            diff_color_alt: resolve_color(&settings.diff_color_alt, "diff_color_alt"),
            diff_mask_only: settings.diff_mask_only,
        }
    }
}

/// Comparison cost and memory are O(N²), so values above the ceiling are
/// clamped rather than trusted; anything unparseable or < 1 takes the default.
fn resolve_dimension(raw: &str) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => {
            warn!(
                raw,
                default = DEFAULT_SAMPLE_DIMENSION,
                "invalid sample_dimension, using default"
            );
            DEFAULT_SAMPLE_DIMENSION
        }
        Ok(n) if n > SAMPLE_DIMENSION_CEILING => {
            warn!(
                raw,
                ceiling = SAMPLE_DIMENSION_CEILING,
                "sample_dimension above ceiling, clamping"
            );
            SAMPLE_DIMENSION_CEILING
        }
        Ok(n) => n,
    }
}

fn resolve_unit(raw: &str, name: &str, default: f32) -> f32 {
    match raw.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => {
            warn!(field = name, raw, %default, "invalid setting, using default");
            default
        }
    }
}

fn resolve_color(raw: &str, name: &str) -> Rgb {
    match hex_to_rgb(raw) {
        Some(rgb) => rgb,
        None => {
            warn!(field = name, raw, "malformed hex color, using white");
            Rgb::WHITE
        }
    }
}

/// `#RRGGBB` (case-insensitive, `#` optional) to an RGB triple.
fn hex_to_rgb(raw: &str) -> Option<Rgb> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    // from_str_radix alone is too permissive (it admits a leading sign).
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}
