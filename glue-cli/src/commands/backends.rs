//! Backend listing

use anyhow::Result;
use glue_compiler::BackendFactory;

pub fn backends_command() -> Result<()> {
    for name in BackendFactory::available_backends() {
        let backend = BackendFactory::create_backend(name)
            .ok_or_else(|| anyhow::anyhow!("backend {} is listed but unavailable", name))?;
        let target = backend.target_info();
        println!(
            "{:<10} {:<12} type {:<12} .{}",
            target.name, target.engine, target.binding_type, target.file_extension
        );
    }
    Ok(())
}
