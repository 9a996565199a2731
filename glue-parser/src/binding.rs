//! Binding description parser
//!
//! ```text
//! webidlfile "html.idl";
//! hdrcomment "Copyright 2012" "Licensed under MIT";
//! preamble %{ #include <dom/dom.h> %}
//! binding document {
//!     type js_libdom;
//!     interface Document;
//!     private "dom_document *" node;
//! }
//! ```
//!
//! Statements are kept in source order in the root list. Only one `binding`
//! block is allowed per file.

use crate::{
    ast::{list_from, Node, NodeKind, NodeList},
    error::{ParseError as Error, Result},
    parser::TokenStream,
    token::TokenKind,
};
use tracing::debug;

/// Parse a binding description into its root list
pub fn parse_binding(source: &str) -> Result<NodeList> {
    BindingParser::new(source)?.parse()
}

struct BindingParser {
    stream: TokenStream,
    seen_binding: bool,
}

impl BindingParser {
    fn new(source: &str) -> Result<Self> {
        Ok(BindingParser {
            stream: TokenStream::new(source)?,
            seen_binding: false,
        })
    }

    fn parse(mut self) -> Result<NodeList> {
        let mut statements = Vec::new();

        while !self.stream.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        debug!("parsed {} binding statement(s)", statements.len());
        Ok(list_from(statements))
    }

    fn parse_statement(&mut self) -> Result<Box<Node>> {
        let position = self.stream.position();
        let keyword = self.stream.expect_ident()?;

        match keyword.as_str() {
            "webidlfile" => {
                let file = self.stream.expect_string()?;
                self.stream.expect_punct(';')?;
                Ok(Node::leaf(NodeKind::WebIdlFile, file))
            }
            "hdrcomment" => {
                let mut strings = vec![Node::leaf(NodeKind::String, self.stream.expect_string()?)];
                while let TokenKind::String(text) = &self.stream.current_token().kind {
                    strings.push(Node::leaf(NodeKind::String, text.as_str()));
                    self.stream.advance();
                }
                self.stream.expect_punct(';')?;
                Ok(Node::leaf(NodeKind::HdrComment, list_from(strings)))
            }
            "preamble" => {
                let code = match &self.stream.current_token().kind {
                    TokenKind::CodeBlock(code) => code.clone(),
                    _ => return Err(self.stream.unexpected("'%{' code block")),
                };
                self.stream.advance();
                self.stream.match_punct(';');
                Ok(Node::leaf(NodeKind::Preamble, code))
            }
            "binding" => {
                if self.seen_binding {
                    return Err(Error::syntax("only one binding block is allowed", position));
                }
                self.seen_binding = true;
                self.parse_binding_block()
            }
            other => Err(Error::syntax(
                format!("unknown statement `{}`", other),
                position,
            )),
        }
    }

    fn parse_binding_block(&mut self) -> Result<Box<Node>> {
        let mut children = vec![Node::leaf(NodeKind::Ident, self.stream.expect_ident()?)];
        self.stream.expect_punct('{')?;

        while !self.stream.match_punct('}') {
            let position = self.stream.position();
            let keyword = self.stream.expect_ident()?;

            let child = match keyword.as_str() {
                "type" => Node::leaf(NodeKind::BindingType, self.stream.expect_ident()?),
                "interface" => Node::leaf(NodeKind::BindingInterface, self.stream.expect_ident()?),
                "private" => {
                    let ctype = Node::leaf(NodeKind::String, self.stream.expect_string()?);
                    let ident = Node::leaf(NodeKind::Ident, self.stream.expect_ident()?);
                    Node::leaf(NodeKind::BindingPrivate, list_from(vec![ctype, ident]))
                }
                other => {
                    return Err(Error::syntax(
                        format!("unknown binding entry `{}`", other),
                        position,
                    ))
                }
            };
            self.stream.expect_punct(';')?;
            children.push(child);
        }
        self.stream.match_punct(';');

        Ok(Node::leaf(NodeKind::Binding, list_from(children)))
    }
}
