//! WebIDL front end
//!
//! Parses the subset of WebIDL that drives binding generation into the
//! generic node tree. Definitions from several sources are accumulated in a
//! [`WebIdlDocument`]; `partial` definitions are merged into their primary
//! definition as additional members blocks.
//!
//! Shapes produced (children in order):
//!
//! - `Interface` / `Dictionary`: `Ident`, `InterfaceInheritance`?, `InterfaceMembers`*
//! - `Attribute`: `Modifier`*, `Type`, `Ident`
//! - `Operation`: `Modifier`*, `Type`?, `Ident`?, `ArgumentList`?
//! - `Argument` / `OptionalArgument` / `Ellipsis`: `Type`, `Ident`
//! - `Type`: `TypeBase`, `TypeModifier`*, `Ident`? (user types), `Type`? (element)

use crate::{
    ast::{list_from, Node, NodeKind, NodeList},
    error::{ParseError as Error, Result},
    parser::TokenStream,
    token::TokenKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Primitive type codes stored in `TypeBase` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Bool,
    Byte,
    Octet,
    Float,
    Double,
    Short,
    Long,
    LongLong,
    String,
    Sequence,
    Object,
    Date,
    User,
    Void,
    Any,
}

impl BaseType {
    const ALL: [BaseType; 15] = [
        BaseType::Bool,
        BaseType::Byte,
        BaseType::Octet,
        BaseType::Float,
        BaseType::Double,
        BaseType::Short,
        BaseType::Long,
        BaseType::LongLong,
        BaseType::String,
        BaseType::Sequence,
        BaseType::Object,
        BaseType::Date,
        BaseType::User,
        BaseType::Void,
        BaseType::Any,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }
}

/// Type modifier codes stored in `TypeModifier` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeModifier {
    Unsigned,
    Unrestricted,
    Nullable,
}

impl TypeModifier {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        [TypeModifier::Unsigned, TypeModifier::Unrestricted, TypeModifier::Nullable]
            .into_iter()
            .find(|m| m.code() == code)
    }
}

/// Member modifier codes stored in `Modifier` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    ReadOnly,
    Inherit,
    Static,
    Getter,
    Setter,
    Creator,
    Deleter,
    LegacyCaller,
    Stringifier,
}

impl Modifier {
    const ALL: [Modifier; 9] = [
        Modifier::ReadOnly,
        Modifier::Inherit,
        Modifier::Static,
        Modifier::Getter,
        Modifier::Setter,
        Modifier::Creator,
        Modifier::Deleter,
        Modifier::LegacyCaller,
        Modifier::Stringifier,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.code() == code)
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "readonly" => Some(Modifier::ReadOnly),
            "inherit" => Some(Modifier::Inherit),
            "static" => Some(Modifier::Static),
            "getter" => Some(Modifier::Getter),
            "setter" => Some(Modifier::Setter),
            "creator" => Some(Modifier::Creator),
            "deleter" => Some(Modifier::Deleter),
            "legacycaller" => Some(Modifier::LegacyCaller),
            "stringifier" => Some(Modifier::Stringifier),
            _ => None,
        }
    }

    /// Special operation keyword (operations with these may omit an identifier)
    pub fn is_special(self) -> bool {
        matches!(
            self,
            Modifier::Getter
                | Modifier::Setter
                | Modifier::Creator
                | Modifier::Deleter
                | Modifier::LegacyCaller
                | Modifier::Stringifier
        )
    }
}

/// Members that are accepted but carry nothing the generator uses
const SKIPPED_MEMBERS: &[&str] = &[
    "const",
    "serializer",
    "iterable",
    "legacyiterable",
    "maplike",
    "setlike",
    "async",
];

#[derive(Debug)]
struct Definition {
    kind: NodeKind,
    ident: String,
    inheritance: Option<String>,
    blocks: Vec<NodeList>,
    partial: bool,
}

/// Accumulates WebIDL definitions from one or more sources
#[derive(Debug, Default)]
pub struct WebIdlDocument {
    definitions: Vec<Definition>,
}

impl WebIdlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one source and merge its definitions into the document
    pub fn parse_str(&mut self, source: &str) -> Result<()> {
        let mut parser = WebIdlParser::new(source)?;
        while let Some(definition) = parser.parse_definition()? {
            self.merge(definition);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn merge(&mut self, definition: Definition) {
        let existing = self
            .definitions
            .iter_mut()
            .find(|d| d.kind == definition.kind && d.ident == definition.ident);

        match existing {
            Some(existing) => {
                debug!(
                    "merging {} block(s) into {} {}",
                    definition.blocks.len(),
                    definition.kind,
                    definition.ident
                );
                if existing.partial && !definition.partial {
                    // the primary definition's own members come first
                    existing.blocks.splice(0..0, definition.blocks);
                    existing.partial = false;
                } else {
                    existing.blocks.extend(definition.blocks);
                }
                if existing.inheritance.is_none() {
                    existing.inheritance = definition.inheritance;
                }
            }
            None => self.definitions.push(definition),
        }
    }

    /// Produce the root list of `Interface` and `Dictionary` nodes
    pub fn into_ast(self) -> NodeList {
        list_from(self.definitions.into_iter().map(|definition| {
            let mut children = vec![Node::leaf(NodeKind::Ident, definition.ident)];
            if let Some(parent) = definition.inheritance {
                children.push(Node::leaf(NodeKind::InterfaceInheritance, parent));
            }
            for block in definition.blocks {
                children.push(Node::leaf(NodeKind::InterfaceMembers, block));
            }
            Node::leaf(definition.kind, list_from(children))
        }).collect::<Vec<_>>())
    }
}

/// Parse a single WebIDL source into a root list
pub fn parse_webidl(source: &str) -> Result<NodeList> {
    let mut document = WebIdlDocument::new();
    document.parse_str(source)?;
    Ok(document.into_ast())
}

struct WebIdlParser {
    stream: TokenStream,
}

impl WebIdlParser {
    fn new(source: &str) -> Result<Self> {
        Ok(WebIdlParser {
            stream: TokenStream::new(source)?,
        })
    }

    /// Next interface or dictionary; other definitions are skipped
    fn parse_definition(&mut self) -> Result<Option<Definition>> {
        loop {
            self.skip_extended_attributes()?;
            if self.stream.is_at_end() {
                return Ok(None);
            }

            let partial = self.stream.match_ident("partial");

            if self.stream.match_ident("callback") {
                if self.stream.match_ident("interface") {
                    return self.parse_container(NodeKind::Interface, partial).map(Some);
                }
                self.stream.skip_statement()?;
                continue;
            }

            if self.stream.match_ident("interface") {
                self.stream.match_ident("mixin");
                return self.parse_container(NodeKind::Interface, partial).map(Some);
            }

            if self.stream.match_ident("dictionary") {
                return self.parse_container(NodeKind::Dictionary, partial).map(Some);
            }

            if partial && !self.stream.check_ident("namespace") {
                return Err(self.stream.unexpected("`interface` or `dictionary` after `partial`"));
            }

            // typedef, enum, namespace, callback functions, implements/includes
            self.stream.skip_statement()?;
        }
    }

    fn parse_container(&mut self, kind: NodeKind, partial: bool) -> Result<Definition> {
        let ident = self.stream.expect_ident()?;
        let inheritance = if self.stream.match_punct(':') {
            Some(self.stream.expect_ident()?)
        } else {
            None
        };

        let block = self.parse_members(kind == NodeKind::Dictionary)?;

        Ok(Definition {
            kind,
            ident,
            inheritance,
            blocks: vec![block],
            partial,
        })
    }

    fn parse_members(&mut self, dictionary: bool) -> Result<NodeList> {
        self.stream.expect_punct('{')?;

        let mut members = Vec::new();
        loop {
            self.skip_extended_attributes()?;
            if self.stream.match_punct('}') {
                break;
            }
            if self.stream.is_at_end() {
                return Err(Error::unexpected_eof("'}'"));
            }

            let member = if dictionary {
                self.parse_dictionary_member()?
            } else {
                self.parse_interface_member()?
            };
            members.extend(member);
        }

        self.stream.expect_punct(';')?;
        Ok(list_from(members))
    }

    fn parse_interface_member(&mut self) -> Result<Option<Box<Node>>> {
        if SKIPPED_MEMBERS.iter().any(|kw| self.stream.check_ident(kw)) {
            self.stream.skip_statement()?;
            return Ok(None);
        }

        // bare `stringifier;`
        if self.stream.check_ident("stringifier") && self.stream.peek_token(1).is_punct(';') {
            self.stream.advance();
            self.stream.advance();
            let modifier = Node::leaf(NodeKind::Modifier, Modifier::Stringifier.code());
            return Ok(Some(Node::leaf(NodeKind::Operation, modifier)));
        }

        let mut children = Vec::new();
        while let TokenKind::Ident(keyword) = &self.stream.current_token().kind {
            // `readonly` may not start an operation, everything else may
            let Some(modifier) = Modifier::from_keyword(keyword) else {
                break;
            };
            self.stream.advance();
            children.push(Node::leaf(NodeKind::Modifier, modifier.code()));
        }

        // `readonly maplike<K, V>;` and friends
        if SKIPPED_MEMBERS.iter().any(|kw| self.stream.check_ident(kw)) {
            self.stream.skip_statement()?;
            return Ok(None);
        }

        if self.stream.match_ident("attribute") {
            children.push(self.parse_type()?);
            children.push(Node::leaf(NodeKind::Ident, self.stream.expect_ident()?));
            self.stream.expect_punct(';')?;
            return Ok(Some(Node::leaf(NodeKind::Attribute, list_from(children))));
        }

        children.push(self.parse_type()?);
        if let TokenKind::Ident(name) = &self.stream.current_token().kind {
            let name = name.clone();
            self.stream.advance();
            children.push(Node::leaf(NodeKind::Ident, name));
        }
        children.push(self.parse_arguments()?);
        self.stream.expect_punct(';')?;

        Ok(Some(Node::leaf(NodeKind::Operation, list_from(children))))
    }

    fn parse_dictionary_member(&mut self) -> Result<Option<Box<Node>>> {
        self.stream.match_ident("required");
        let ty = self.parse_type()?;
        let ident = Node::leaf(NodeKind::Ident, self.stream.expect_ident()?);
        if self.stream.match_punct('=') {
            self.skip_default_value()?;
        }
        self.stream.expect_punct(';')?;
        Ok(Some(Node::leaf(NodeKind::Attribute, list_from(vec![ty, ident]))))
    }

    fn parse_arguments(&mut self) -> Result<Box<Node>> {
        self.stream.expect_punct('(')?;

        let mut arguments = Vec::new();
        if !self.stream.check_punct(')') {
            loop {
                self.skip_extended_attributes()?;
                let mut kind = if self.stream.match_ident("optional") {
                    NodeKind::OptionalArgument
                } else {
                    NodeKind::Argument
                };
                let ty = self.parse_type()?;
                if self.stream.current_token().kind == TokenKind::Ellipsis {
                    self.stream.advance();
                    kind = NodeKind::Ellipsis;
                }
                let ident = Node::leaf(NodeKind::Ident, self.stream.expect_ident()?);
                if self.stream.match_punct('=') {
                    self.skip_default_value()?;
                }
                arguments.push(Node::leaf(kind, list_from(vec![ty, ident])));

                if !self.stream.match_punct(',') {
                    break;
                }
            }
        }
        self.stream.expect_punct(')')?;

        Ok(Node::leaf(NodeKind::ArgumentList, list_from(arguments)))
    }

    fn parse_type(&mut self) -> Result<Box<Node>> {
        // `[Clamp] long`, `[LegacyNullToEmptyString] DOMString`
        self.skip_extended_attributes()?;
        let mut children = Vec::new();

        if self.stream.check_punct('(') {
            // union types are not modelled
            self.stream.skip_group('(', ')')?;
            children.push(Node::leaf(NodeKind::TypeBase, BaseType::Any.code()));
            self.parse_type_suffix(&mut children);
            return Ok(Node::leaf(NodeKind::Type, list_from(children)));
        }

        let mut modifiers = Vec::new();
        if self.stream.match_ident("unsigned") {
            modifiers.push(TypeModifier::Unsigned);
        }
        if self.stream.match_ident("unrestricted") {
            modifiers.push(TypeModifier::Unrestricted);
        }

        let name = self.stream.expect_ident()?;
        let mut user_name = None;
        let mut elements = Vec::new();

        let base = match name.as_str() {
            "boolean" => BaseType::Bool,
            "byte" => BaseType::Byte,
            "octet" => BaseType::Octet,
            "float" => BaseType::Float,
            "double" => BaseType::Double,
            "short" => BaseType::Short,
            "long" => {
                if self.stream.match_ident("long") {
                    BaseType::LongLong
                } else {
                    BaseType::Long
                }
            }
            "DOMString" | "ByteString" | "USVString" | "CSSOMString" => BaseType::String,
            "sequence" | "FrozenArray" => {
                elements = self.parse_type_parameters()?;
                BaseType::Sequence
            }
            "object" => BaseType::Object,
            "Date" => BaseType::Date,
            "void" | "undefined" => BaseType::Void,
            "any" => BaseType::Any,
            _ => {
                if self.stream.check_punct('<') {
                    elements = self.parse_type_parameters()?;
                }
                user_name = Some(name);
                BaseType::User
            }
        };

        children.push(Node::leaf(NodeKind::TypeBase, base.code()));
        for modifier in modifiers {
            children.push(Node::leaf(NodeKind::TypeModifier, modifier.code()));
        }
        self.parse_type_suffix(&mut children);
        if let Some(user_name) = user_name {
            children.push(Node::leaf(NodeKind::Ident, user_name));
        }
        children.extend(elements);

        Ok(Node::leaf(NodeKind::Type, list_from(children)))
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<Box<Node>>> {
        self.stream.expect_punct('<')?;
        let mut parameters = vec![self.parse_type()?];
        while self.stream.match_punct(',') {
            parameters.push(self.parse_type()?);
        }
        self.stream.expect_punct('>')?;
        Ok(parameters)
    }

    fn parse_type_suffix(&mut self, children: &mut Vec<Box<Node>>) {
        if self.stream.match_punct('?') {
            children.push(Node::leaf(NodeKind::TypeModifier, TypeModifier::Nullable.code()));
        }
        // legacy `T[]` arrays
        while self.stream.check_punct('[') && self.stream.peek_token(1).is_punct(']') {
            self.stream.advance();
            self.stream.advance();
        }
    }

    fn skip_default_value(&mut self) -> Result<()> {
        if self.stream.check_punct('[') {
            return self.stream.skip_group('[', ']');
        }
        if self.stream.check_punct('{') {
            return self.stream.skip_group('{', '}');
        }
        if self.stream.match_punct('-') {
            // -Infinity
            self.stream.expect_ident()?;
            return Ok(());
        }
        match self.stream.current_token().kind {
            TokenKind::Eof => Err(self.stream.unexpected("default value")),
            _ => {
                self.stream.advance();
                Ok(())
            }
        }
    }

    fn skip_extended_attributes(&mut self) -> Result<()> {
        while self.stream.check_punct('[') {
            self.stream.skip_group('[', ']')?;
        }
        Ok(())
    }
}
