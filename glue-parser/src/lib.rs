//! glue parser
//!
//! This crate provides the generic syntax tree shared by WebIDL and binding
//! description sources, the query primitives used to walk it, and the two
//! front ends that build it from text.

pub mod ast;
pub mod binding;
pub mod dump;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod span;
pub mod token;
pub mod webidl;

// Re-export core types
pub use ast::{Node, NodeKind, NodeList, Payload};
pub use binding::parse_binding;
pub use error::{AstError, ParseError, Result};
pub use span::Position;
pub use token::{Token, TokenKind};
pub use webidl::{parse_webidl, BaseType, Modifier, TypeModifier, WebIdlDocument};

/// Input languages understood by the front ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SourceLanguage {
    WebIdl,
    Binding,
}

impl SourceLanguage {
    /// Guess from a file extension; anything but `.idl` is a binding file
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("idl") | Some("webidl") => SourceLanguage::WebIdl,
            _ => SourceLanguage::Binding,
        }
    }
}

/// Parse result with timing information
#[derive(Debug)]
pub struct ParseResult {
    pub ast: NodeList,
    pub language: SourceLanguage,
    pub parse_time: std::time::Duration,
}

/// Parse source in the given language
pub fn parse_source(source: &str, language: SourceLanguage) -> Result<NodeList> {
    match language {
        SourceLanguage::WebIdl => parse_webidl(source),
        SourceLanguage::Binding => parse_binding(source),
    }
}

/// Parse source with detailed result information
pub fn parse_with_metadata(source: &str, language: SourceLanguage) -> Result<ParseResult> {
    let start_time = std::time::Instant::now();
    let ast = parse_source(source, language)?;
    let parse_time = start_time.elapsed();

    tracing::debug!("parsed {:?} source in {:?}", language, parse_time);

    Ok(ParseResult {
        ast,
        language,
        parse_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_language_from_path() {
        assert_eq!(SourceLanguage::from_path(Path::new("dom.idl")), SourceLanguage::WebIdl);
        assert_eq!(SourceLanguage::from_path(Path::new("doc.bnd")), SourceLanguage::Binding);
        assert_eq!(SourceLanguage::from_path(Path::new("README")), SourceLanguage::Binding);
    }

    #[test]
    fn test_parse_with_metadata() {
        let result = parse_with_metadata("interface A {};", SourceLanguage::WebIdl).unwrap();
        assert_eq!(result.language, SourceLanguage::WebIdl);
        assert_eq!(result.ast.unwrap().kind(), NodeKind::Interface);

        assert!(parse_with_metadata("interface A {};", SourceLanguage::Binding).is_err());
    }
}
