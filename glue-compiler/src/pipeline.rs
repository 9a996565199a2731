//! Generation pipeline: descriptor construction followed by the emission passes

use crate::{
    backend::{BindingBackend, EmitError},
    binding::{Binding, BindingError, BindingSource},
    loader::WebIdlLoader,
};
use glue_parser::NodeList;
use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LoadBinding,
    HeaderComment,
    Preamble,
    PrivateDeclaration,
    ClassDescriptor,
    OperatorBodies,
    PropertyBodies,
    FunctionSpec,
    PropertySpec,
    Constructors,
}

impl Stage {
    /// The emission passes, in the order they write to the sink
    pub const EMISSION: [Stage; 9] = [
        Stage::HeaderComment,
        Stage::Preamble,
        Stage::PrivateDeclaration,
        Stage::ClassDescriptor,
        Stage::OperatorBodies,
        Stage::PropertyBodies,
        Stage::FunctionSpec,
        Stage::PropertySpec,
        Stage::Constructors,
    ];

    /// Process exit status when this stage fails
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::LoadBinding => 4,
            Stage::HeaderComment => 5,
            Stage::Preamble => 6,
            Stage::PrivateDeclaration => 7,
            Stage::ClassDescriptor => 8,
            Stage::OperatorBodies => 9,
            Stage::PropertyBodies => 10,
            Stage::FunctionSpec => 11,
            Stage::PropertySpec => 12,
            Stage::Constructors => 13,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::LoadBinding => "load binding",
            Stage::HeaderComment => "header comment",
            Stage::Preamble => "preamble",
            Stage::PrivateDeclaration => "private declaration",
            Stage::ClassDescriptor => "class descriptor",
            Stage::OperatorBodies => "operator bodies",
            Stage::PropertyBodies => "property bodies",
            Stage::FunctionSpec => "function spec",
            Stage::PropertySpec => "property spec",
            Stage::Constructors => "constructors",
        }
    }

    fn emit(self, backend: &dyn BindingBackend, out: &mut dyn Write, source: &BindingSource) -> Result<(), EmitError> {
        match self {
            Stage::LoadBinding => Ok(()),
            Stage::HeaderComment => backend.header_comment(out, source),
            Stage::Preamble => backend.preamble(out, source),
            Stage::PrivateDeclaration => backend.private_declaration(out, source),
            Stage::ClassDescriptor => backend.class_descriptor(out, source),
            Stage::OperatorBodies => backend.operator_bodies(out, source),
            Stage::PropertyBodies => backend.property_bodies(out, source),
            Stage::FunctionSpec => backend.function_spec(out, source),
            Stage::PropertySpec => backend.property_spec(out, source),
            Stage::Constructors => backend.constructors(out, source),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a stage failed
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// A failed run: the stage that failed and its cause
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct GenerateError {
    pub stage: Stage,
    pub source: StageError,
}

impl GenerateError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.stage.exit_code()
    }
}

/// Pipeline stage result
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub duration: Duration,
    pub bytes_written: u64,
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub backend: &'static str,
    pub interface: String,
    pub stages: Vec<StageReport>,
    pub total_time: Duration,
}

impl GenerationReport {
    pub fn bytes_written(&self) -> u64 {
        self.stages.iter().map(|s| s.bytes_written).sum()
    }
}

/// Sink wrapper that counts bytes per stage
struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    fn take_count(&mut self) -> u64 {
        std::mem::take(&mut self.written)
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Build the binding descriptor (stage 4)
pub fn load(binding_ast: NodeList, loader: &dyn WebIdlLoader) -> Result<BindingSource, GenerateError> {
    let start = Instant::now();
    let source = BindingSource::load(binding_ast, loader).map_err(|e| GenerateError::new(Stage::LoadBinding, e))?;
    debug!("stage {} finished in {:?}", Stage::LoadBinding, start.elapsed());
    Ok(source)
}

/// Run every emission pass in order against the binding's sink
///
/// The first failing pass aborts the run; whatever was already written
/// stays in the sink.
pub fn run(binding: &mut Binding<'_>, backend: &dyn BindingBackend) -> Result<GenerationReport, GenerateError> {
    let total_start = Instant::now();
    let (sink, source) = binding.split();
    let mut out = CountingWriter::new(sink);
    let mut stages = Vec::with_capacity(Stage::EMISSION.len());

    for stage in Stage::EMISSION {
        let start = Instant::now();
        stage
            .emit(backend, &mut out, source)
            .map_err(|e| GenerateError::new(stage, e))?;

        let report = StageReport {
            stage,
            duration: start.elapsed(),
            bytes_written: out.take_count(),
        };
        debug!(
            "stage {} wrote {} bytes in {:?}",
            stage, report.bytes_written, report.duration
        );
        stages.push(report);
    }

    out.flush().map_err(|e| GenerateError::new(Stage::Constructors, EmitError::from(e)))?;

    let report = GenerationReport {
        backend: backend.name(),
        interface: source.interface().to_string(),
        stages,
        total_time: total_start.elapsed(),
    };
    info!(
        "generated {} binding for {} ({} bytes)",
        report.backend,
        report.interface,
        report.bytes_written()
    );
    Ok(report)
}

/// Load, then emit into `sink`
pub fn generate(
    binding_ast: NodeList,
    loader: &dyn WebIdlLoader,
    backend: &dyn BindingBackend,
    sink: &mut dyn Write,
) -> Result<GenerationReport, GenerateError> {
    let source = load(binding_ast, loader)?;
    let mut binding = Binding::new(sink, source);
    run(&mut binding, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendFactory, BackendTarget, Result as EmitResult};
    use crate::loader::MemoryLoader;
    use glue_parser::parse_binding;

    /// Backend whose `fail_at` pass errors after writing a marker
    struct Failing {
        fail_at: Stage,
    }

    impl Failing {
        fn pass(&self, stage: Stage, out: &mut dyn Write) -> EmitResult<()> {
            writeln!(out, "{}", stage)?;
            if stage == self.fail_at {
                return Err(EmitError::Io(io::Error::new(io::ErrorKind::Other, "boom")));
            }
            Ok(())
        }
    }

    impl BindingBackend for Failing {
        fn target_info(&self) -> BackendTarget {
            BackendTarget {
                name: "failing",
                binding_type: "none",
                engine: "none",
                file_extension: "txt",
            }
        }
        fn header_comment(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::HeaderComment, out)
        }
        fn preamble(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::Preamble, out)
        }
        fn private_declaration(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::PrivateDeclaration, out)
        }
        fn class_descriptor(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::ClassDescriptor, out)
        }
        fn operator_bodies(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::OperatorBodies, out)
        }
        fn property_bodies(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::PropertyBodies, out)
        }
        fn function_spec(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::FunctionSpec, out)
        }
        fn property_spec(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::PropertySpec, out)
        }
        fn constructors(&self, out: &mut dyn Write, _: &BindingSource) -> EmitResult<()> {
            self.pass(Stage::Constructors, out)
        }
    }

    fn bare_source() -> BindingSource {
        BindingSource::new(parse_binding("binding b { interface B; }").unwrap(), None).unwrap()
    }

    #[test]
    fn test_exit_codes_are_distinct_and_ordered() {
        let codes: Vec<i32> = std::iter::once(Stage::LoadBinding)
            .chain(Stage::EMISSION)
            .map(Stage::exit_code)
            .collect();
        assert_eq!(codes, (4..=13).collect::<Vec<_>>());
    }

    #[test]
    fn test_each_failing_pass_reports_its_stage() {
        for fail_at in Stage::EMISSION {
            let mut out = Vec::new();
            let mut binding = Binding::new(&mut out, bare_source());
            let err = run(&mut binding, &Failing { fail_at }).unwrap_err();
            assert_eq!(err.stage, fail_at);
            assert_eq!(err.exit_code(), fail_at.exit_code());
            drop(binding);

            // earlier passes stay in the sink, later ones never run
            let written = String::from_utf8(out).unwrap();
            let expected: Vec<String> = Stage::EMISSION
                .iter()
                .take_while(|s| **s != fail_at)
                .chain(std::iter::once(&fail_at))
                .map(|s| s.to_string())
                .collect();
            assert_eq!(written.lines().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn test_report_counts_bytes_per_stage() {
        let mut out = Vec::new();
        let mut binding = Binding::new(&mut out, bare_source());
        let report = run(&mut binding, &Failing { fail_at: Stage::LoadBinding }).unwrap();
        assert_eq!(report.backend, "failing");
        assert_eq!(report.interface, "B");
        assert_eq!(report.stages.len(), 9);
        assert_eq!(report.stages[0].bytes_written, "header comment\n".len() as u64);
        drop(binding);
        assert_eq!(report.bytes_written(), out.len() as u64);
    }

    #[test]
    fn test_load_failure_is_stage_four() {
        let backend = BackendFactory::create_backend("jsapi").unwrap();
        let mut out = Vec::new();
        let ast = parse_binding("hdrcomment \"no binding\";").unwrap();
        let err = generate(ast, &MemoryLoader::new(), backend.as_ref(), &mut out).unwrap_err();
        assert_eq!(err.stage, Stage::LoadBinding);
        assert_eq!(err.exit_code(), 4);
        assert!(matches!(err.source, StageError::Binding(BindingError::NoBindingNode)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_interface_fails_at_operator_bodies() {
        let backend = BackendFactory::create_backend("jsapi").unwrap();
        let mut out = Vec::new();
        let ast = parse_binding(r#"webidlfile "a.idl"; binding b { interface Nope; }"#).unwrap();
        let loader = MemoryLoader::new().with_file("a.idl", "interface Other {};");
        let err = generate(ast, &loader, backend.as_ref(), &mut out).unwrap_err();
        assert_eq!(err.stage, Stage::OperatorBodies);
        assert_eq!(err.exit_code(), 9);
        assert!(err.to_string().contains("Unable to find interface Nope"));
    }
}
