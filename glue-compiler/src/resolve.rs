//! Interface resolution and member aggregation
//!
//! Collects the attributes and operations of an interface and everything it
//! inherits from, most-derived first. Each member remembers the interface
//! that declared it so emitters can group their output.
//!
//! A dictionary resolves the same way when no interface has the name. Its
//! chain only follows dictionaries and its members are all read-write
//! attributes.

use glue_parser::{
    ast::{Node, NodeKind},
    query::{each_kind, find_by_kind_and_identifier, for_each},
    AstError, Modifier,
};
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

/// Resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("Unable to find interface {name} in loaded WebIDL")]
    InterfaceNotFound { name: String },

    #[error("Cyclic inheritance: {}", chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    #[error("attribute without identifier in interface {interface}")]
    MissingAttributeIdentifier { interface: String },

    #[error(transparent)]
    Ast(#[from] AstError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Required,
    Optional,
    Variadic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedArgument<'a> {
    pub ident: &'a str,
    pub kind: ArgumentKind,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolvedAttribute<'a> {
    /// Declaring interface
    pub interface: &'a str,
    pub ident: &'a str,
    pub read_only: bool,
    pub node: &'a Node,
}

impl<'a> ResolvedAttribute<'a> {
    pub fn type_node(&self) -> Option<&'a Node> {
        self.node.child(NodeKind::Type)
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedOperation<'a> {
    /// Declaring interface
    pub interface: &'a str,
    /// `None` for special operations (getters, stringifiers, ...)
    pub ident: Option<&'a str>,
    pub modifiers: Vec<Modifier>,
    pub arguments: Vec<ResolvedArgument<'a>>,
    pub node: &'a Node,
}

impl<'a> ResolvedOperation<'a> {
    pub fn is_variadic(&self) -> bool {
        self.arguments.iter().any(|arg| arg.kind == ArgumentKind::Variadic)
    }
}

/// Which kind of definition was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionKind {
    #[default]
    Interface,
    Dictionary,
}

impl DefinitionKind {
    fn node_kind(self) -> NodeKind {
        match self {
            DefinitionKind::Interface => NodeKind::Interface,
            DefinitionKind::Dictionary => NodeKind::Dictionary,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DefinitionKind::Interface => "interface",
            DefinitionKind::Dictionary => "dictionary",
        }
    }
}

/// One `InterfaceMembers` block, as index ranges into the member sequences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBlock<'a> {
    pub interface: &'a str,
    pub attributes: Range<usize>,
    pub operations: Range<usize>,
}

/// Members of an interface and its ancestors
#[derive(Debug, Clone, Default)]
pub struct InterfaceMembers<'a> {
    pub kind: DefinitionKind,
    /// Interface names, most-derived first
    pub chain: Vec<&'a str>,
    pub attributes: Vec<ResolvedAttribute<'a>>,
    pub operations: Vec<ResolvedOperation<'a>>,
    pub blocks: Vec<MemberBlock<'a>>,
}

impl<'a> InterfaceMembers<'a> {
    pub fn attributes_in(&self, block: &MemberBlock<'_>) -> &[ResolvedAttribute<'a>] {
        &self.attributes[block.attributes.clone()]
    }

    pub fn operations_in(&self, block: &MemberBlock<'_>) -> &[ResolvedOperation<'a>] {
        &self.operations[block.operations.clone()]
    }

    /// Operations that have an identifier
    pub fn identified_operations(&self) -> impl Iterator<Item = (&ResolvedOperation<'a>, &'a str)> {
        self.operations
            .iter()
            .filter_map(|op| op.ident.map(|ident| (op, ident)))
    }

    pub fn special_operation_count(&self) -> usize {
        self.operations.iter().filter(|op| op.ident.is_none()).count()
    }
}

/// Resolve `interface` and its inheritance chain in a WebIDL tree
pub fn resolve<'a>(webidl: Option<&'a Node>, interface: &str) -> Result<InterfaceMembers<'a>, ResolveError> {
    let mut members = InterfaceMembers::default();
    let mut visited = HashSet::new();
    let mut node = match find_definition(webidl, DefinitionKind::Interface, interface) {
        Ok(node) => node,
        Err(not_found) => {
            members.kind = DefinitionKind::Dictionary;
            find_definition(webidl, DefinitionKind::Dictionary, interface).map_err(|_| not_found)?
        }
    };

    loop {
        let name = node.child_text(NodeKind::Ident).unwrap_or_default();
        if !visited.insert(name) {
            let mut chain: Vec<String> = members.chain.iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(ResolveError::CyclicInheritance { chain });
        }
        members.chain.push(name);

        collect_blocks(&mut members, name, node)?;

        match node.child(NodeKind::InterfaceInheritance) {
            Some(inheritance) => node = find_definition(webidl, members.kind, inheritance.text()?)?,
            None => break,
        }
    }

    debug!(
        "resolved {} {}: {} attribute(s), {} operation(s) across {:?}",
        members.kind.keyword(),
        interface,
        members.attributes.len(),
        members.operations.len(),
        members.chain
    );
    Ok(members)
}

fn find_definition<'a>(webidl: Option<&'a Node>, kind: DefinitionKind, name: &str) -> Result<&'a Node, ResolveError> {
    find_by_kind_and_identifier(webidl, kind.node_kind(), name).ok_or_else(|| {
        ResolveError::InterfaceNotFound {
            name: name.to_string(),
        }
    })
}

fn collect_blocks<'a>(
    members: &mut InterfaceMembers<'a>,
    interface: &'a str,
    node: &'a Node,
) -> Result<(), ResolveError> {
    for_each(node.subnode()?, NodeKind::InterfaceMembers, |block| {
        let attribute_start = members.attributes.len();
        let operation_start = members.operations.len();

        for member in block.children() {
            match member.kind() {
                NodeKind::Attribute => members.attributes.push(resolve_attribute(interface, member)?),
                NodeKind::Operation => members.operations.push(resolve_operation(interface, member)?),
                _ => {}
            }
        }

        members.blocks.push(MemberBlock {
            interface,
            attributes: attribute_start..members.attributes.len(),
            operations: operation_start..members.operations.len(),
        });
        Ok(())
    })
}

fn modifiers(node: &Node) -> Result<Vec<Modifier>, ResolveError> {
    let mut modifiers = Vec::new();
    for modifier in each_kind(node.subnode()?, NodeKind::Modifier) {
        modifiers.extend(Modifier::from_code(modifier.int()?));
    }
    Ok(modifiers)
}

fn resolve_attribute<'a>(interface: &'a str, node: &'a Node) -> Result<ResolvedAttribute<'a>, ResolveError> {
    let ident = node.child_text(NodeKind::Ident).ok_or_else(|| {
        ResolveError::MissingAttributeIdentifier {
            interface: interface.to_string(),
        }
    })?;

    Ok(ResolvedAttribute {
        interface,
        ident,
        read_only: modifiers(node)?.contains(&Modifier::ReadOnly),
        node,
    })
}

fn resolve_operation<'a>(interface: &'a str, node: &'a Node) -> Result<ResolvedOperation<'a>, ResolveError> {
    let mut arguments = Vec::new();
    if let Some(list) = node.child(NodeKind::ArgumentList) {
        for argument in list.children() {
            let kind = match argument.kind() {
                NodeKind::Argument => ArgumentKind::Required,
                NodeKind::OptionalArgument => ArgumentKind::Optional,
                NodeKind::Ellipsis => ArgumentKind::Variadic,
                _ => continue,
            };
            arguments.push(ResolvedArgument {
                ident: argument.child_text(NodeKind::Ident).unwrap_or_default(),
                kind,
            });
        }
    }

    Ok(ResolvedOperation {
        interface,
        ident: node.child_text(NodeKind::Ident),
        modifiers: modifiers(node)?,
        arguments,
        node,
    })
}
