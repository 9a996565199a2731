//! Tree display command

use anyhow::{bail, Context, Result};
use glue_compiler::{Generator, GeneratorConfig};
use glue_parser::{dump, parse_with_metadata, Node, SourceLanguage};
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn dump_command(
    input: &Path,
    webidl: bool,
    format: &str,
    config: Option<&Path>,
    idl_paths: Vec<PathBuf>,
) -> Result<()> {
    if webidl {
        let mut generator_config = match config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };
        generator_config.merge(GeneratorConfig {
            idl_paths,
            ..GeneratorConfig::default()
        });
        let source = Generator::new(generator_config)?.load(input)?;
        return print_tree(source.webidl_ast(), format);
    }

    let text = std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let parsed = parse_with_metadata(&text, SourceLanguage::from_path(input))
        .with_context(|| format!("parsing {}", input.display()))?;
    debug!("parsed {} as {:?} in {:?}", input.display(), parsed.language, parsed.parse_time);

    print_tree(parsed.ast.as_deref(), format)
}

fn print_tree(list: Option<&Node>, format: &str) -> Result<()> {
    match format {
        "tree" => print!("{}", dump::dump(list)),
        "json" => println!("{}", serde_json::to_string_pretty(&dump::to_json(list))?),
        other => bail!("unknown format {:?}, expected tree or json", other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dump_formats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.idl");
        std::fs::write(&path, "interface A { attribute long x; };").unwrap();

        assert!(dump_command(&path, false, "tree", None, Vec::new()).is_ok());
        assert!(dump_command(&path, false, "json", None, Vec::new()).is_ok());
        assert!(dump_command(&path, false, "yaml", None, Vec::new()).is_err());
    }

    #[test]
    fn test_dump_referenced_webidl() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.idl"), "interface A {};").unwrap();
        let binding = dir.path().join("a.bnd");
        std::fs::write(&binding, "webidlfile \"a.idl\"; binding a { interface A; }").unwrap();

        assert!(dump_command(&binding, true, "tree", None, Vec::new()).is_ok());
        assert!(dump_command(&dir.path().join("none.bnd"), true, "tree", None, Vec::new()).is_err());
    }
}
