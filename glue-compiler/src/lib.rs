//! glue binding generator
//!
//! Turns a binding description plus the WebIDL it references into C glue
//! code for a JavaScript engine. The work happens in stages: build the
//! binding descriptor, then run the emission passes of the selected backend
//! against one output sink. Each stage has its own exit status.

pub mod backend;
pub mod binding;
pub mod config;
pub mod duktape;
pub mod jsapi;
pub mod loader;
pub mod pipeline;
pub mod resolve;

// Re-export main types
pub use backend::{BackendFactory, BackendTarget, BindingBackend, EmitError};
pub use binding::{Binding, BindingError, BindingSource, PrivateField};
pub use config::{ConfigError, GeneratorConfig};
pub use loader::{FsLoader, LoadError, MemoryLoader, WebIdlLoader};
pub use pipeline::{GenerateError, GenerationReport, Stage, StageError};
pub use resolve::{resolve, DefinitionKind, InterfaceMembers, ResolveError};

use glue_parser::{dump::dump, parse_binding, ParseError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Generator errors
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown backend: {name}")]
    UnknownBackend { name: String },

    #[error("Error reading binding {path:?}: {source}")]
    ReadBinding { path: PathBuf, source: std::io::Error },

    #[error("Error parsing binding {path:?}: {source}")]
    ParseBinding { path: PathBuf, source: ParseError },

    #[error("Error opening output {path:?}: {source}")]
    OpenOutput { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl GeneratorError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            GeneratorError::Config(_) | GeneratorError::UnknownBackend { .. } => 1,
            GeneratorError::ReadBinding { .. } | GeneratorError::ParseBinding { .. } => 2,
            GeneratorError::OpenOutput { .. } => 3,
            GeneratorError::Generate(e) => e.exit_code(),
        }
    }
}

/// Builder for fluent configuration
pub struct GeneratorBuilder {
    config: GeneratorConfig,
}

impl GeneratorBuilder {
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    pub fn idl_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.idl_paths.push(path.into());
        self
    }

    pub fn backend(mut self, name: &str) -> Self {
        self.config.backend = Some(name.to_string());
        self
    }

    pub fn dump_webidl(mut self, enabled: bool) -> Self {
        self.config.dump_webidl = enabled;
        self
    }

    pub fn verbose(mut self, enabled: bool) -> Self {
        self.config.verbose = enabled;
        self
    }

    pub fn build(self) -> std::result::Result<Generator, ConfigError> {
        Generator::new(self.config)
    }
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main generator interface
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Read and parse a binding file, then build its descriptor
    pub fn load(&self, binding_path: &Path) -> Result<BindingSource> {
        let text = std::fs::read_to_string(binding_path).map_err(|source| GeneratorError::ReadBinding {
            path: binding_path.to_path_buf(),
            source,
        })?;
        let binding_ast = parse_binding(&text).map_err(|source| GeneratorError::ParseBinding {
            path: binding_path.to_path_buf(),
            source,
        })?;

        let mut loader = FsLoader::new(self.config.idl_paths.clone());
        if let Some(dir) = binding_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            loader = loader.with_base_dir(dir);
        }

        let source = pipeline::load(binding_ast, &loader)?;
        if self.config.dump_webidl {
            debug!("WebIDL AST:\n{}", dump(source.webidl_ast()));
        }
        Ok(source)
    }

    /// Configured backend, else the one named by the binding's `type`, else jsapi
    pub fn select_backend(&self, source: &BindingSource) -> Result<Box<dyn BindingBackend>> {
        let name = match (&self.config.backend, source.binding_type()) {
            (Some(name), _) => name.as_str(),
            (None, Some(binding_type)) => {
                return BackendFactory::for_binding_type(binding_type).ok_or_else(|| {
                    GeneratorError::UnknownBackend {
                        name: binding_type.to_string(),
                    }
                })
            }
            (None, None) => "jsapi",
        };
        BackendFactory::create_backend(name).ok_or_else(|| GeneratorError::UnknownBackend {
            name: name.to_string(),
        })
    }

    /// Run the emission passes for an already loaded descriptor
    pub fn emit(
        &self,
        source: BindingSource,
        backend: &dyn BindingBackend,
        sink: &mut dyn Write,
    ) -> Result<GenerationReport> {
        let mut binding = Binding::new(sink, source);
        Ok(pipeline::run(&mut binding, backend)?)
    }

    /// Generate the binding described by `binding_path` into `sink`
    pub fn generate(&self, binding_path: &Path, sink: &mut dyn Write) -> Result<GenerationReport> {
        let source = self.load(binding_path)?;
        let backend = self.select_backend(&source)?;
        self.emit(source, backend.as_ref(), sink)
    }

    /// Generate into a file, created only once the descriptor has loaded
    pub fn generate_file(&self, binding_path: &Path, output_path: &Path) -> Result<GenerationReport> {
        let source = self.load(binding_path)?;
        let backend = self.select_backend(&source)?;

        let file = File::create(output_path).map_err(|source| GeneratorError::OpenOutput {
            path: output_path.to_path_buf(),
            source,
        })?;
        let mut sink = BufWriter::new(file);
        let report = self.emit(source, backend.as_ref(), &mut sink)?;
        info!("wrote {}", output_path.display());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_generator_builder() {
        let generator = GeneratorBuilder::new()
            .idl_path("idl")
            .backend("duktape")
            .verbose(true)
            .build()
            .unwrap();

        assert_eq!(generator.config().idl_paths, vec![PathBuf::from("idl")]);
        assert_eq!(generator.config().backend.as_deref(), Some("duktape"));
        assert!(generator.config().verbose);
        assert!(GeneratorBuilder::new().backend("v8").build().is_err());
    }

    #[test]
    fn test_backend_selection() {
        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let source = |text: &str| BindingSource::new(parse_binding(text).unwrap(), None).unwrap();

        let typed = source("binding b { type duk_libdom; interface B; }");
        assert_eq!(generator.select_backend(&typed).unwrap().name(), "duktape");

        let untyped = source("binding b { interface B; }");
        assert_eq!(generator.select_backend(&untyped).unwrap().name(), "jsapi");

        let unknown = source("binding b { type lua_libdom; interface B; }");
        let err = generator.select_backend(&unknown).err().unwrap();
        assert_eq!(err.exit_code(), 1);

        let forced = GeneratorBuilder::new().backend("jsapi").build().unwrap();
        assert_eq!(forced.select_backend(&typed).unwrap().name(), "jsapi");
    }

    #[test]
    fn test_exit_codes_for_early_failures() {
        let dir = TempDir::new().unwrap();
        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let mut out = Vec::new();

        let missing = dir.path().join("missing.bnd");
        let err = generator.generate(&missing, &mut out).unwrap_err();
        assert!(matches!(err, GeneratorError::ReadBinding { .. }));
        assert_eq!(err.exit_code(), 2);

        let bad = write(&dir, "bad.bnd", "binding {");
        assert_eq!(generator.generate(&bad, &mut out).unwrap_err().exit_code(), 2);

        let unloadable = write(&dir, "nofile.bnd", "webidlfile \"gone.idl\"; binding b { interface B; }");
        assert_eq!(generator.generate(&unloadable, &mut out).unwrap_err().exit_code(), 4);
        assert!(out.is_empty());
    }

    #[test]
    fn test_generate_file_finds_webidl_next_to_binding() {
        let dir = TempDir::new().unwrap();
        write(&dir, "node.idl", "interface Node { attribute long depth; };");
        let binding = write(
            &dir,
            "node.bnd",
            "webidlfile \"node.idl\"; binding node { type js_libdom; interface Node; }",
        );
        let output = dir.path().join("node.c");

        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let report = generator.generate_file(&binding, &output).unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(report.bytes_written(), text.len() as u64);
        assert!(text.contains("JSAPI_PS(depth"));
    }

    #[test]
    fn test_output_not_created_when_load_fails() {
        let dir = TempDir::new().unwrap();
        let binding = write(&dir, "b.bnd", "hdrcomment \"only\";");
        let output = dir.path().join("b.c");

        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let err = generator.generate_file(&binding, &output).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(!output.exists());

        let unwritable = dir.path().join("no-such-dir").join("b.c");
        let ok_binding = write(&dir, "ok.bnd", "binding b { interface B; }");
        let err = generator.generate_file(&ok_binding, &unwritable).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
