//! Configuration file scaffolding

use anyhow::{bail, Context, Result};
use glue_compiler::config::{presets, GeneratorConfig};
use std::path::Path;
use tracing::info;

pub fn init_config_command(output: &Path, preset: Option<&str>) -> Result<()> {
    let config = match preset {
        None => GeneratorConfig::default(),
        Some("jsapi") => presets::jsapi_libdom(),
        Some("duktape") => presets::duktape_libdom(),
        Some(other) => bail!("unknown preset {:?}, expected jsapi or duktape", other),
    };

    if output.exists() {
        bail!("{} already exists", output.display());
    }

    config
        .to_file(output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());
    Ok(())
}
