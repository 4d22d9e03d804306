use std::path::Path;

use anyhow::{Context, Result};

use super::CONFIG_DIR;

/// Hand-crafted settings template written by `pixgrade init`.
/// Every key is optional; deleting one (or the whole file) falls back to
/// the defaults shown here.
const SETTINGS_TEMPLATE: &str = r##"# pixgrade settings
# Numeric values are strings; an unparseable value falls back to its default.

sample_dimension = "128"       # comparison grid NxN; cost grows with the square (max 4096)
color_threshold = "0.3"        # 0.0-1.0; smaller is more sensitive
include_anti_aliasing = false  # count anti-aliased pixels as differences
blend_alpha = "0.1"            # opacity of unchanged pixels in the diff image
anti_alias_color = "#ffff00"   # anti-aliased pixels in the diff image
diff_color = "#ff0000"         # mismatched pixels
diff_color_alt = "#00ff00"     # mismatched pixels that darkened instead of lightened
diff_mask_only = false         # draw only mismatches, transparent elsewhere
"##;

pub fn settings_file_exists() -> bool {
    super::settings_path().exists()
}

/// Write the commented template (not `toml::to_string_pretty`) so users can
/// see what each knob does.
pub fn write_template() -> Result<()> {
    let dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(dir).context("Failed to create .pixgrade directory")?;
    let path = super::settings_path();
    std::fs::write(&path, SETTINGS_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn template_parses_to_defaults() {
        let settings: Settings = toml::from_str(SETTINGS_TEMPLATE).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
