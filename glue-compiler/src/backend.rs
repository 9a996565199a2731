//! Abstract backend interface for binding emission

use crate::binding::BindingSource;
use crate::resolve::ResolveError;
use glue_parser::{query::for_each, AstError, NodeKind};
use std::io::Write;

/// Emission errors
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("missing {kind} node in {context}")]
    MissingNode {
        kind: NodeKind,
        context: &'static str,
    },

    #[error(transparent)]
    Ast(#[from] AstError),
}

pub type Result<T> = std::result::Result<T, EmitError>;

/// Scripting engine a backend emits for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub name: &'static str,
    /// `type` value of a binding block that selects this backend
    pub binding_type: &'static str,
    pub engine: &'static str,
    pub file_extension: &'static str,
}

/// Emission passes, one per section of the generated file
///
/// The pipeline calls these in a fixed order against one sink; each pass
/// only appends.
pub trait BindingBackend {
    fn target_info(&self) -> BackendTarget;

    fn name(&self) -> &'static str {
        self.target_info().name
    }

    /// Banner comment plus every `hdrcomment` string, in order
    fn header_comment(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        write!(out, "/* Generated by {}", utils::GENERATOR)?;
        for_each(source.binding_ast(), NodeKind::HdrComment, |comment| -> Result<()> {
            for_each(comment.subnode()?, NodeKind::String, |line| -> Result<()> {
                write!(out, "\n * {}", line.text()?)?;
                Ok(())
            })
        })?;
        write!(out, "\n */\n\n")?;
        Ok(())
    }

    /// Every preamble block copied verbatim
    fn preamble(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        for_each(source.binding_ast(), NodeKind::Preamble, |preamble| -> Result<()> {
            out.write_all(preamble.text()?.as_bytes())?;
            Ok(())
        })?;
        write!(out, "\n\n")?;
        Ok(())
    }

    fn private_declaration(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn class_descriptor(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn operator_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn property_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn function_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn property_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;

    fn constructors(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()>;
}

/// Factory for creating backend instances
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend by name
    pub fn create_backend(name: &str) -> Option<Box<dyn BindingBackend>> {
        match name {
            "jsapi" | "spidermonkey" => Some(Box::new(crate::jsapi::JsapiBackend::new())),
            "duktape" | "duk" => Some(Box::new(crate::duktape::DuktapeBackend::new())),
            _ => None,
        }
    }

    /// Backend selected by a binding block's `type`
    pub fn for_binding_type(binding_type: &str) -> Option<Box<dyn BindingBackend>> {
        Self::available_backends()
            .into_iter()
            .filter_map(Self::create_backend)
            .find(|backend| backend.target_info().binding_type == binding_type)
    }

    /// List all available backends
    pub fn available_backends() -> Vec<&'static str> {
        vec!["jsapi", "duktape"]
    }
}

/// Helpers shared by the backends
pub mod utils {
    use crate::binding::PrivateField;

    pub const GENERATOR: &str = concat!("glue ", env!("CARGO_PKG_VERSION"));

    /// `ctype ident`, inserting a space unless the type already ends in one or in `*`
    pub fn c_declaration(field: &PrivateField<'_>) -> String {
        if field.ctype.ends_with('*') || field.ctype.ends_with(' ') {
            format!("{}{}", field.ctype, field.ident)
        } else {
            format!("{} {}", field.ctype, field.ident)
        }
    }

    /// Escape a WebIDL name for use as one part of a composed C symbol
    ///
    /// `_` becomes `_1` and any other character outside `[A-Za-z0-9]`
    /// becomes `_0` plus four hex digits, so escaped parts never contain
    /// `__` and joining them with `_` cannot make two different name
    /// sequences collide.
    pub fn mangle(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            match c {
                'A'..='Z' | 'a'..='z' | '0'..='9' => out.push(c),
                '_' => out.push_str("_1"),
                other => {
                    for unit in other.encode_utf16(&mut [0; 2]) {
                        out.push_str(&format!("_0{:04x}", unit));
                    }
                }
            }
        }
        out
    }

    /// `prefix_part1_part2...` with every part escaped by [`mangle`]
    pub fn symbol(prefix: &str, parts: &[&str]) -> String {
        let mut out = prefix.to_string();
        for part in parts {
            out.push('_');
            out.push_str(&mangle(part));
        }
        out
    }

    /// Make a WebIDL name usable inside a C identifier
    pub fn c_identifier(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::PrivateField;
    use glue_parser::parse_binding;

    fn source(text: &str) -> BindingSource {
        BindingSource::new(parse_binding(text).unwrap(), None).unwrap()
    }

    fn emit(pass: impl Fn(&dyn BindingBackend, &mut dyn Write, &BindingSource) -> Result<()>, text: &str) -> String {
        let backend = BackendFactory::create_backend("jsapi").unwrap();
        let mut out = Vec::new();
        pass(backend.as_ref(), &mut out, &source(text)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_factory() {
        for name in BackendFactory::available_backends() {
            assert_eq!(BackendFactory::create_backend(name).unwrap().name(), name);
        }
        assert_eq!(BackendFactory::create_backend("spidermonkey").unwrap().name(), "jsapi");
        assert!(BackendFactory::create_backend("v8").is_none());

        assert_eq!(BackendFactory::for_binding_type("js_libdom").unwrap().name(), "jsapi");
        assert_eq!(BackendFactory::for_binding_type("duk_libdom").unwrap().name(), "duktape");
        assert!(BackendFactory::for_binding_type("lua").is_none());
    }

    #[test]
    fn test_header_comment_lists_strings_in_order() {
        let text = emit(
            |b, out, s| b.header_comment(out, s),
            r#"hdrcomment "one" "two"; hdrcomment "three"; binding b { interface B; }"#,
        );
        assert_eq!(
            text,
            format!("/* Generated by {}\n * one\n * two\n * three\n */\n\n", utils::GENERATOR)
        );
    }

    #[test]
    fn test_header_comment_without_strings() {
        let text = emit(|b, out, s| b.header_comment(out, s), "binding b { interface B; }");
        assert_eq!(text, format!("/* Generated by {}\n */\n\n", utils::GENERATOR));
    }

    #[test]
    fn test_preambles_are_verbatim_and_ordered() {
        let text = emit(
            |b, out, s| b.preamble(out, s),
            "preamble %{#include <a.h>\n%} preamble %{#include <b.h>\n%}; binding b { interface B; }",
        );
        assert_eq!(text, "#include <a.h>\n#include <b.h>\n\n\n");
    }

    #[test]
    fn test_c_declaration_spacing() {
        let field = |ctype| PrivateField { ctype, ident: "x" };
        assert_eq!(utils::c_declaration(&field("int")), "int x");
        assert_eq!(utils::c_declaration(&field("int ")), "int x");
        assert_eq!(utils::c_declaration(&field("char *")), "char *x");
        assert_eq!(utils::c_declaration(&field("char*")), "char*x");
    }

    #[test]
    fn test_symbols_do_not_collide() {
        assert_eq!(utils::symbol("dukky", &["Window", "alert"]), "dukky_Window_alert");
        assert_ne!(
            utils::symbol("dukky", &["A_b", "c"]),
            utils::symbol("dukky", &["A", "b_c"])
        );
        assert_ne!(
            utils::symbol("dukky", &["A", "_destructor"]),
            utils::symbol("dukky", &["A_", "destructor"])
        );
        assert_eq!(utils::mangle("aria-label"), "aria_0002dlabel");
        assert_eq!(utils::mangle("on_load"), "on_1load");
    }

    #[test]
    fn test_c_identifier() {
        assert_eq!(utils::c_identifier("aria-label"), "aria_label");
        assert_eq!(utils::c_identifier("onclick"), "onclick");
    }
}
