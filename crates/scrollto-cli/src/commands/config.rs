use std::io::Write;
use std::path::Path;

use anyhow::{bail, Result};

use scrollto_core::AppConfig;

/// Print the effective configuration, or write it to `path` with `init`
pub fn run(
    config: &AppConfig,
    path: &Path,
    init: bool,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    if !init {
        writeln!(out, "# {}", path.display())?;
        write!(out, "{}", config.to_toml()?)?;
        return Ok(());
    }

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    config.save_to(path)?;
    writeln!(out, "Wrote configuration to {}", path.display())?;

    Ok(())
}
