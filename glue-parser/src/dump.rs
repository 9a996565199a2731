//! Debug rendering of node lists

use crate::{
    ast::{siblings, Node, NodeKind, Payload},
    webidl::{BaseType, Modifier, TypeModifier},
};
use serde_json::{json, Value};
use std::fmt::Write;

/// Render a list as an indented tree, one node per line
pub fn dump(list: Option<&Node>) -> String {
    let mut out = String::new();
    dump_into(&mut out, list, 0);
    out
}

fn dump_into(out: &mut String, list: Option<&Node>, depth: usize) {
    for node in siblings(list) {
        let indent = "  ".repeat(depth);
        match node.payload() {
            Payload::Text(text) => {
                let _ = writeln!(out, "{}{}: {:?}", indent, node.kind(), text);
            }
            Payload::Int(value) => match code_name(node.kind(), *value) {
                Some(name) => {
                    let _ = writeln!(out, "{}{}: {} ({})", indent, node.kind(), value, name);
                }
                None => {
                    let _ = writeln!(out, "{}{}: {}", indent, node.kind(), value);
                }
            },
            Payload::Node(children) => {
                let _ = writeln!(out, "{}{}", indent, node.kind());
                dump_into(out, children.as_deref(), depth + 1);
            }
        }
    }
}

fn code_name(kind: NodeKind, value: i64) -> Option<String> {
    match kind {
        NodeKind::TypeBase => BaseType::from_code(value).map(|t| format!("{:?}", t)),
        NodeKind::TypeModifier => TypeModifier::from_code(value).map(|m| format!("{:?}", m)),
        NodeKind::Modifier => Modifier::from_code(value).map(|m| format!("{:?}", m)),
        _ => None,
    }
}

/// Render a list as a JSON array with nested `children` arrays
pub fn to_json(list: Option<&Node>) -> Value {
    Value::Array(siblings(list).map(node_json).collect())
}

fn node_json(node: &Node) -> Value {
    let kind = node.kind().name();
    match node.payload() {
        Payload::Text(text) => json!({ "kind": kind, "text": text }),
        Payload::Int(value) => json!({ "kind": kind, "value": value }),
        Payload::Node(children) => json!({ "kind": kind, "children": to_json(children.as_deref()) }),
    }
}
