use anyhow::{Result, bail};

use crate::config;

/// `pixgrade init` — write .pixgrade/settings.toml with the defaults.
/// With `--force` this also serves as the "reset options" affordance.
pub fn init(force: bool) -> Result<()> {
    if !force && config::settings_file_exists() {
        bail!(".pixgrade/settings.toml already exists (use --force to reset to defaults)");
    }

    config::write_template()?;

    let verb = if force { "Reset" } else { "Created" };
    println!("{verb} .pixgrade/settings.toml");
    Ok(())
}
