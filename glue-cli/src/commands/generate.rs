//! Binding generation command

use glue_compiler::{Generator, GeneratorConfig, GeneratorError};
use std::path::{Path, PathBuf};
use tracing::info;

/// Command-line overrides for the generator configuration
pub struct GenerateOptions<'a> {
    pub config: Option<&'a Path>,
    pub idl_paths: Vec<PathBuf>,
    pub backend: Option<String>,
    pub dump_webidl: bool,
    pub verbose: bool,
}

pub fn generate_command(
    binding: &Path,
    output: Option<&Path>,
    options: GenerateOptions<'_>,
) -> Result<(), GeneratorError> {
    let mut config = match options.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    };
    config.merge(GeneratorConfig {
        idl_paths: options.idl_paths,
        backend: options.backend,
        dump_webidl: options.dump_webidl,
        verbose: options.verbose,
    });

    let generator = Generator::new(config)?;

    let report = match output {
        Some(path) => generator.generate_file(binding, path)?,
        None => generator.generate(binding, &mut std::io::stdout().lock())?,
    };

    info!(
        "{} binding for {}: {} bytes in {:?}",
        report.backend,
        report.interface,
        report.bytes_written(),
        report.total_time
    );
    Ok(())
}
