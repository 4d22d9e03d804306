pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use self::resolve::{CliOverrides, CompareConfig};
pub use self::template::{settings_file_exists, write_template};

pub(crate) const CONFIG_DIR: &str = ".pixgrade";
const SETTINGS_FILE: &str = "settings.toml";

/// The raw persisted settings record, as written to `.pixgrade/settings.toml`.
///
/// Numeric fields are kept as strings and colors as `#RRGGBB` hex strings;
/// typed parsing (with per-field fallback to defaults) happens in
/// [`resolve::CompareConfig::resolve`]. Booleans are real TOML booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_dimension: String,
    pub color_threshold: String,
    pub include_anti_aliasing: bool,
    pub blend_alpha: String,
    pub anti_alias_color: String,
    pub diff_color: String,
    pub diff_color_alt: String,
    pub diff_mask_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_dimension: "128".to_string(),
            color_threshold: "0.3".to_string(),
            include_anti_aliasing: false,
            blend_alpha: "0.1".to_string(),
            anti_alias_color: "#ffff00".to_string(),
            diff_color: "#ff0000".to_string(),
            diff_color_alt: "#00ff00".to_string(),
            diff_mask_only: false,
        }
    }
}

pub(crate) fn settings_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(SETTINGS_FILE)
}

/// Load the settings file. Never fails: a missing file, a missing key, or
/// an unparseable file all fall back to the built-in defaults.
pub fn load() -> Settings {
    load_from(&settings_path())
}

fn load_from(path: &Path) -> Settings {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Settings::default();
        }
    };
    match toml::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable settings file, using defaults");
            Settings::default()
        }
    }
}

/// Persist the raw settings record, creating `.pixgrade/` if needed.
pub fn save(settings: &Settings) -> Result<()> {
    save_to(&settings_path(), settings)
}

fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
