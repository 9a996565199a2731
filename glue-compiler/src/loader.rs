//! Locating and parsing the WebIDL files a binding refers to

use glue_parser::{
    ast::{Node, NodeKind, NodeList},
    query::for_each,
    AstError, ParseError, WebIdlDocument,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// WebIDL loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("WebIDL file {reference:?} not found (searched {searched:?})")]
    NotFound {
        reference: String,
        searched: Vec<PathBuf>,
    },

    #[error("I/O error for {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error parsing WebIDL file {reference:?}: {source}")]
    Parse {
        reference: String,
        source: ParseError,
    },

    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Source of WebIDL text for a `webidlfile` reference
pub trait WebIdlLoader {
    fn read(&self, reference: &str) -> Result<String, LoadError>;
}

/// Loads WebIDL from disk
///
/// References are tried as given when absolute, then against each search
/// directory in order, then against the binding file's own directory.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    search_paths: Vec<PathBuf>,
    base_dir: Option<PathBuf>,
}

impl FsLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            base_dir: None,
        }
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Find the file a reference names
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, LoadError> {
        let path = Path::new(reference);
        let candidates: Vec<PathBuf> = if path.is_absolute() {
            vec![path.to_path_buf()]
        } else {
            self.search_paths
                .iter()
                .chain(self.base_dir.iter())
                .map(|dir| dir.join(path))
                .collect()
        };

        match candidates.iter().find(|candidate| candidate.is_file()) {
            Some(found) => Ok(found.clone()),
            None => Err(LoadError::NotFound {
                reference: reference.to_string(),
                searched: candidates,
            }),
        }
    }
}

impl WebIdlLoader for FsLoader {
    fn read(&self, reference: &str) -> Result<String, LoadError> {
        let path = self.resolve(reference)?;
        debug!("reading WebIDL {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })
    }
}

/// In-memory WebIDL sources keyed by reference
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, reference: &str, source: &str) -> Self {
        self.insert(reference, source);
        self
    }

    pub fn insert(&mut self, reference: &str, source: &str) {
        self.files.insert(reference.to_string(), source.to_string());
    }
}

impl WebIdlLoader for MemoryLoader {
    fn read(&self, reference: &str) -> Result<String, LoadError> {
        self.files.get(reference).cloned().ok_or_else(|| LoadError::NotFound {
            reference: reference.to_string(),
            searched: Vec::new(),
        })
    }
}

/// Parse every `webidlfile` of a binding tree, in order, into one WebIDL tree
pub fn load_webidl(binding_ast: Option<&Node>, loader: &dyn WebIdlLoader) -> Result<NodeList, LoadError> {
    let mut document = WebIdlDocument::new();

    for_each(binding_ast, NodeKind::WebIdlFile, |node| {
        let reference = node.text()?;
        let source = loader.read(reference)?;
        document
            .parse_str(&source)
            .map_err(|source| LoadError::Parse {
                reference: reference.to_string(),
                source,
            })
    })?;

    debug!("loaded {} WebIDL definition(s)", document.len());
    Ok(document.into_ast())
}
