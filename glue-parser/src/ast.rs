//! Generic syntax tree shared by the WebIDL and binding description grammars
//!
//! Both front ends build the same node type. A node carries a kind tag, a
//! payload (text, integer or an owned child list) and owns the sibling that
//! follows it, so a list is simply its head node.

use crate::error::AstError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Head of an owned sibling list (`None` is the empty list)
pub type NodeList = Option<Box<Node>>;

/// Every syntactic construct of both input languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // WebIDL
    Root,
    Ident,
    Interface,
    Dictionary,
    InterfaceMembers,
    InterfaceInheritance,
    Attribute,
    Operation,
    ArgumentList,
    Argument,
    OptionalArgument,
    Ellipsis,
    Type,
    TypeBase,
    TypeModifier,
    Modifier,

    // Binding description
    Binding,
    BindingType,
    BindingInterface,
    BindingPrivate,
    Preamble,
    HdrComment,
    String,
    WebIdlFile,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Ident => "ident",
            NodeKind::Interface => "interface",
            NodeKind::Dictionary => "dictionary",
            NodeKind::InterfaceMembers => "interface-members",
            NodeKind::InterfaceInheritance => "interface-inheritance",
            NodeKind::Attribute => "attribute",
            NodeKind::Operation => "operation",
            NodeKind::ArgumentList => "argument-list",
            NodeKind::Argument => "argument",
            NodeKind::OptionalArgument => "optional-argument",
            NodeKind::Ellipsis => "ellipsis",
            NodeKind::Type => "type",
            NodeKind::TypeBase => "type-base",
            NodeKind::TypeModifier => "type-modifier",
            NodeKind::Modifier => "modifier",
            NodeKind::Binding => "binding",
            NodeKind::BindingType => "binding-type",
            NodeKind::BindingInterface => "binding-interface",
            NodeKind::BindingPrivate => "binding-private",
            NodeKind::Preamble => "preamble",
            NodeKind::HdrComment => "hdrcomment",
            NodeKind::String => "string",
            NodeKind::WebIdlFile => "webidlfile",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Node contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Text(String),
    Int(i64),
    Node(NodeList),
}

impl Payload {
    fn type_name(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Int(_) => "integer",
            Payload::Node(_) => "node",
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Int(value)
    }
}

impl From<NodeList> for Payload {
    fn from(list: NodeList) -> Self {
        Payload::Node(list)
    }
}

impl From<Box<Node>> for Payload {
    fn from(node: Box<Node>) -> Self {
        Payload::Node(Some(node))
    }
}

/// A tree node and, through `next`, the rest of its sibling list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    payload: Payload,
    next: NodeList,
}

impl Node {
    /// Create a node whose following sibling list is `next`
    pub fn new(kind: NodeKind, next: NodeList, payload: impl Into<Payload>) -> Box<Node> {
        Box::new(Node {
            kind,
            payload: payload.into(),
            next,
        })
    }

    /// Create a node with no following siblings
    pub fn leaf(kind: NodeKind, payload: impl Into<Payload>) -> Box<Node> {
        Node::new(kind, None, payload)
    }

    /// Retag and repayload in place; the sibling link is untouched
    pub fn set(&mut self, kind: NodeKind, payload: impl Into<Payload>) {
        self.kind = kind;
        self.payload = payload.into();
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn next(&self) -> Option<&Node> {
        self.next.as_deref()
    }

    pub fn text(&self) -> Result<&str, AstError> {
        match &self.payload {
            Payload::Text(text) => Ok(text),
            other => Err(self.mismatch("text", other)),
        }
    }

    /// Head of the child list (`None` when the list is empty)
    pub fn subnode(&self) -> Result<Option<&Node>, AstError> {
        match &self.payload {
            Payload::Node(list) => Ok(list.as_deref()),
            other => Err(self.mismatch("node", other)),
        }
    }

    pub fn int(&self) -> Result<i64, AstError> {
        match &self.payload {
            Payload::Int(value) => Ok(*value),
            other => Err(self.mismatch("integer", other)),
        }
    }

    /// First child of the given kind, if this node owns a child list
    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.subnode()
            .ok()
            .flatten()
            .and_then(|head| head.siblings().find(|n| n.kind == kind))
    }

    /// Text of the first child of the given kind
    pub fn child_text(&self, kind: NodeKind) -> Option<&str> {
        self.child(kind).and_then(|n| n.text().ok())
    }

    /// Iterate this node and every node after it
    pub fn siblings(&self) -> Siblings<'_> {
        Siblings { cursor: Some(self) }
    }

    /// Iterate the child list; empty for non-node payloads
    pub fn children(&self) -> Siblings<'_> {
        Siblings {
            cursor: self.subnode().ok().flatten(),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &Payload) -> AstError {
        AstError::PayloadMismatch {
            kind: self.kind,
            expected,
            found: found.type_name(),
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        // unlink iteratively so long sibling lists do not recurse on drop
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

/// Borrowing iterator over a sibling list
#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    cursor: Option<&'a Node>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.cursor?;
        self.cursor = node.next.as_deref();
        Some(node)
    }
}

/// Iterate a possibly empty list
pub fn siblings(list: Option<&Node>) -> Siblings<'_> {
    Siblings { cursor: list }
}

/// Put `node` (itself possibly a list) in front of `list`, returning the new head
pub fn prepend(list: NodeList, mut node: Box<Node>) -> NodeList {
    let mut tail = &mut node.next;
    while let Some(n) = tail {
        tail = &mut n.next;
    }
    *tail = list;
    Some(node)
}

/// Attach `node` after the last element of `list`, returning the head
pub fn append(mut list: NodeList, node: Box<Node>) -> NodeList {
    let mut tail = &mut list;
    while let Some(n) = tail {
        tail = &mut n.next;
    }
    *tail = Some(node);
    list
}

/// Build a list from nodes in iteration order
pub fn list_from<I>(nodes: I) -> NodeList
where
    I: IntoIterator<Item = Box<Node>>,
    I::IntoIter: DoubleEndedIterator,
{
    nodes.into_iter().rev().fold(None, |list, node| prepend(list, node))
}

/// Number of nodes in a list
pub fn len(list: Option<&Node>) -> usize {
    siblings(list).count()
}
