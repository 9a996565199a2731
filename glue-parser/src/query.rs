//! Traversal and search over node lists
//!
//! All searches are shallow: they look at one sibling list, never into
//! children. Callers descend explicitly with [`Node::subnode`].

use crate::ast::{siblings, Node, NodeKind};

/// Call `callback` for every node of `kind` in `list`, in order
///
/// Stops at the first `Err` and returns it unchanged; a kind that matches
/// nothing returns `Ok(())` without calling `callback`.
pub fn for_each<'a, E, F>(list: Option<&'a Node>, kind: NodeKind, mut callback: F) -> Result<(), E>
where
    F: FnMut(&'a Node) -> Result<(), E>,
{
    for node in each_kind(list, kind) {
        callback(node)?;
    }
    Ok(())
}

/// Iterate the nodes of `kind` in `list`
pub fn each_kind(list: Option<&Node>, kind: NodeKind) -> impl Iterator<Item = &Node> {
    siblings(list).filter(move |node| node.kind() == kind)
}

/// First node of `list` satisfying `predicate`
pub fn find<'a, P>(list: Option<&'a Node>, mut predicate: P) -> Option<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    siblings(list).find(|node| predicate(node))
}

/// Resume a search after a previously found node
pub fn find_after<'a, P>(prev: &'a Node, predicate: P) -> Option<&'a Node>
where
    P: FnMut(&Node) -> bool,
{
    find(prev.next(), predicate)
}

pub fn find_kind(list: Option<&Node>, kind: NodeKind) -> Option<&Node> {
    find(list, |node| node.kind() == kind)
}

pub fn find_kind_after(prev: &Node, kind: NodeKind) -> Option<&Node> {
    find_after(prev, |node| node.kind() == kind)
}

/// First top-level node of `kind` whose `Ident` child text equals `ident`
pub fn find_by_kind_and_identifier<'a>(
    root: Option<&'a Node>,
    kind: NodeKind,
    ident: &str,
) -> Option<&'a Node> {
    find(root, |node| {
        node.kind() == kind && node.child_text(NodeKind::Ident) == Some(ident)
    })
}
