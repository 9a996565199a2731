//! Binding descriptor: everything the emission passes read, plus the sink

use crate::backend::EmitError;
use crate::loader::{load_webidl, LoadError, WebIdlLoader};
use glue_parser::{
    ast::{Node, NodeKind, NodeList},
    query::{each_kind, find_kind},
    AstError,
};
use std::io::Write;
use tracing::debug;

/// Errors building a binding descriptor
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error("no binding block in binding description")]
    NoBindingNode,

    #[error("binding block has no name")]
    MissingName,

    #[error("binding {binding} does not name an interface")]
    MissingInterface { binding: String },

    #[error("Error reading WebIDL files: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Ast(#[from] AstError),
}

/// One `private` entry of the binding block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateField<'a> {
    pub ctype: &'a str,
    pub ident: &'a str,
}

/// Read-only inputs of a generation run
#[derive(Debug)]
pub struct BindingSource {
    binding_ast: NodeList,
    webidl_ast: NodeList,
    name: String,
    interface: String,
    binding_type: Option<String>,
}

impl BindingSource {
    /// Build a descriptor from already parsed trees
    pub fn new(binding_ast: NodeList, webidl_ast: NodeList) -> Result<Self, BindingError> {
        let binding_node =
            find_kind(binding_ast.as_deref(), NodeKind::Binding).ok_or(BindingError::NoBindingNode)?;

        let name = binding_node
            .child(NodeKind::Ident)
            .ok_or(BindingError::MissingName)?
            .text()?
            .to_string();

        let interface = match binding_node.child(NodeKind::BindingInterface) {
            Some(node) => node.text()?.to_string(),
            None => return Err(BindingError::MissingInterface { binding: name }),
        };

        let binding_type = match binding_node.child(NodeKind::BindingType) {
            Some(node) => Some(node.text()?.to_string()),
            None => None,
        };

        Ok(Self {
            binding_ast,
            webidl_ast,
            name,
            interface,
            binding_type,
        })
    }

    /// Build a descriptor, loading every referenced WebIDL file
    pub fn load(binding_ast: NodeList, loader: &dyn WebIdlLoader) -> Result<Self, BindingError> {
        // validate the binding block before touching the filesystem
        if find_kind(binding_ast.as_deref(), NodeKind::Binding).is_none() {
            return Err(BindingError::NoBindingNode);
        }
        let webidl_ast = load_webidl(binding_ast.as_deref(), loader)?;
        let source = Self::new(binding_ast, webidl_ast)?;
        debug!(
            "binding {} for interface {} ({})",
            source.name,
            source.interface,
            source.binding_type.as_deref().unwrap_or("untyped")
        );
        Ok(source)
    }

    pub fn binding_ast(&self) -> Option<&Node> {
        self.binding_ast.as_deref()
    }

    pub fn webidl_ast(&self) -> Option<&Node> {
        self.webidl_ast.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn binding_type(&self) -> Option<&str> {
        self.binding_type.as_deref()
    }

    pub fn binding_node(&self) -> Result<&Node, EmitError> {
        find_kind(self.binding_ast(), NodeKind::Binding).ok_or(EmitError::MissingNode {
            kind: NodeKind::Binding,
            context: "binding description",
        })
    }

    /// Private fields in declaration order
    pub fn private_fields(&self) -> Result<Vec<PrivateField<'_>>, EmitError> {
        let binding = self.binding_node()?;
        each_kind(binding.subnode()?, NodeKind::BindingPrivate)
            .map(private_field)
            .collect()
    }
}

fn private_field(private: &Node) -> Result<PrivateField<'_>, EmitError> {
    let missing = |kind| EmitError::MissingNode {
        kind,
        context: "private entry",
    };
    let ctype = private.child(NodeKind::String).ok_or_else(|| missing(NodeKind::String))?;
    let ident = private.child(NodeKind::Ident).ok_or_else(|| missing(NodeKind::Ident))?;
    Ok(PrivateField {
        ctype: ctype.text()?,
        ident: ident.text()?,
    })
}

/// A descriptor bound to its output sink for one run
pub struct Binding<'w> {
    sink: &'w mut dyn Write,
    source: BindingSource,
}

impl<'w> Binding<'w> {
    pub fn new(sink: &'w mut dyn Write, source: BindingSource) -> Self {
        Self { sink, source }
    }

    /// Borrow the sink mutably alongside the read-only inputs
    pub fn split(&mut self) -> (&mut (dyn Write + 'w), &BindingSource) {
        (&mut *self.sink, &self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use glue_parser::parse_binding;

    fn source(text: &str) -> Result<BindingSource, BindingError> {
        BindingSource::new(parse_binding(text).unwrap(), None)
    }

    #[test]
    fn test_descriptor_fields() {
        let source = source(
            r#"binding doc { type js_libdom; interface Document;
                private "int " count; private "char *" name; }"#,
        )
        .unwrap();
        assert_eq!(source.name(), "doc");
        assert_eq!(source.interface(), "Document");
        assert_eq!(source.binding_type(), Some("js_libdom"));
        assert_eq!(
            source.private_fields().unwrap(),
            vec![
                PrivateField { ctype: "int ", ident: "count" },
                PrivateField { ctype: "char *", ident: "name" },
            ]
        );
    }

    #[test]
    fn test_descriptor_failures() {
        assert!(matches!(source("hdrcomment \"x\";"), Err(BindingError::NoBindingNode)));
        assert!(matches!(
            source("binding doc { type js_libdom; }"),
            Err(BindingError::MissingInterface { binding }) if binding == "doc"
        ));
        assert_eq!(source("binding doc { interface D; }").unwrap().binding_type(), None);
    }

    #[test]
    fn test_load_reports_missing_webidl() {
        let ast = parse_binding(r#"webidlfile "nope.idl"; binding b { interface B; }"#).unwrap();
        let err = BindingSource::load(ast, &MemoryLoader::new()).unwrap_err();
        assert!(matches!(err, BindingError::Load(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_split_writes_to_sink() {
        let mut out = Vec::new();
        {
            let mut binding = Binding::new(&mut out, source("binding b { interface B; }").unwrap());
            let (sink, source) = binding.split();
            write!(sink, "/* {} */", source.interface()).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "/* B */");
    }
}
