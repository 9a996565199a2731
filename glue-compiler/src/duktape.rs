//! Duktape backend
//!
//! Names every member symbol `dukky_<Interface>_<member>` after the interface
//! that declares the member, so inherited members keep their own prefix.
//! Per-class symbols (tables, destructor, constructor) use `___` before their
//! role, which no escaped member name can produce. Methods go into a
//! `duk_function_list_entry` table, accessors into a property table consumed
//! by the generated constructor. Dictionaries get accessors only.

use crate::backend::{utils, BackendTarget, BindingBackend, Result};
use crate::binding::BindingSource;
use crate::resolve::{resolve, DefinitionKind};
use std::io::Write;
use tracing::warn;

#[derive(Debug, Default)]
pub struct DuktapeBackend;

impl DuktapeBackend {
    pub fn new() -> Self {
        Self
    }
}

fn symbol(interface: &str, member: &str) -> String {
    utils::symbol("dukky", &[interface, member])
}

/// Per-class symbol such as `dukky_<Interface>___methods`
fn class_symbol(interface: &str, role: &str) -> String {
    format!("{}___{}", utils::symbol("dukky", &[interface]), role)
}

/// Hidden property holding the private pointer
fn private_key(interface: &str) -> String {
    format!("DUKKY_{}_PRIVATE", utils::mangle(interface).to_uppercase())
}

impl BindingBackend for DuktapeBackend {
    fn target_info(&self) -> BackendTarget {
        BackendTarget {
            name: "duktape",
            binding_type: "duk_libdom",
            engine: "Duktape",
            file_extension: "c",
        }
    }

    fn private_declaration(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let fields = source.private_fields()?;

        writeln!(out, "struct {} {{", symbol(source.interface(), "private"))?;
        for field in &fields {
            writeln!(out, "\t{};", utils::c_declaration(field))?;
        }
        write!(out, "}};\n\n")?;
        Ok(())
    }

    fn class_descriptor(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let interface = source.interface();

        write!(
            out,
            "/* class {interface} */\n\
             #define {key} \"\\xFF\" \"{interface}_private\"\n\
             \n\
             typedef struct {{\n\
             \tconst char *name;\n\
             \tduk_c_function getter;\n\
             \tduk_c_function setter;\n\
             }} {property};\n\
             \n\
             static duk_ret_t {destructor}(duk_context *ctx);\n\n",
            interface = interface,
            key = private_key(interface),
            property = class_symbol(interface, "property"),
            destructor = class_symbol(interface, "destructor"),
        )?;
        Ok(())
    }

    fn operator_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;
        if members.kind == DefinitionKind::Dictionary {
            return Ok(());
        }

        for block in &members.blocks {
            writeln!(out, "/**** {} ****/", block.interface)?;
            for operation in members.operations_in(block) {
                let Some(ident) = operation.ident else {
                    warn!("skipping special operation without identifier on {}", operation.interface);
                    continue;
                };
                writeln!(out, "static duk_ret_t {}(duk_context *ctx)", symbol(operation.interface, ident))?;
                write!(out, "{{\n\treturn 0;\n}}\n\n")?;
            }
        }
        Ok(())
    }

    fn property_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        for block in &members.blocks {
            writeln!(out, "/**** {} ****/", block.interface)?;
            for attribute in members.attributes_in(block) {
                let name = symbol(attribute.interface, attribute.ident);
                if !attribute.read_only {
                    writeln!(out, "static duk_ret_t {}_setter(duk_context *ctx)", name)?;
                    write!(out, "{{\n\treturn 0;\n}}\n\n")?;
                }
                writeln!(out, "static duk_ret_t {}_getter(duk_context *ctx)", name)?;
                write!(out, "{{\n\tduk_push_undefined(ctx);\n\treturn 1;\n}}\n\n")?;
            }
        }
        Ok(())
    }

    fn function_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        writeln!(
            out,
            "static const duk_function_list_entry {}[] = {{",
            class_symbol(source.interface(), "methods")
        )?;
        if members.kind == DefinitionKind::Interface {
            for block in &members.blocks {
                writeln!(out, "\t/**** {} ****/", block.interface)?;
                for operation in members.operations_in(block) {
                    let Some(ident) = operation.ident else { continue };
                    let nargs = if operation.is_variadic() {
                        "DUK_VARARGS".to_string()
                    } else {
                        operation.arguments.len().to_string()
                    };
                    writeln!(
                        out,
                        "\t{{ \"{}\", {}, {} }},",
                        ident,
                        symbol(operation.interface, ident),
                        nargs
                    )?;
                }
            }
        }
        write!(out, "\t{{ NULL, NULL, 0 }}\n}};\n\n")?;
        Ok(())
    }

    fn property_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let interface = source.interface();
        let members = resolve(source.webidl_ast(), interface)?;

        writeln!(
            out,
            "static const {} {}[] = {{",
            class_symbol(interface, "property"),
            class_symbol(interface, "properties")
        )?;
        for block in &members.blocks {
            writeln!(out, "\t/**** {} ****/", block.interface)?;
            for attribute in members.attributes_in(block) {
                let name = symbol(attribute.interface, attribute.ident);
                let setter = if attribute.read_only {
                    "NULL".to_string()
                } else {
                    format!("{}_setter", name)
                };
                writeln!(out, "\t{{ \"{}\", {}_getter, {} }},", attribute.ident, name, setter)?;
            }
        }
        write!(out, "\t{{ NULL, NULL, NULL }}\n}};\n\n")?;
        Ok(())
    }

    fn constructors(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let interface = source.interface();
        let key = private_key(interface);
        let private = symbol(interface, "private");
        let destructor = class_symbol(interface, "destructor");
        let properties = class_symbol(interface, "properties");
        let fields = source.private_fields()?;

        write!(
            out,
            "static duk_ret_t {destructor}(duk_context *ctx)\n\
             {{\n\
             \tstruct {private} *priv;\n\
             \n\
             \tduk_get_prop_string(ctx, 0, {key});\n\
             \tpriv = duk_get_pointer(ctx, -1);\n\
             \tduk_pop(ctx);\n\
             \tfree(priv);\n\
             \treturn 0;\n\
             }}\n\n",
            destructor = destructor,
            private = private,
            key = key
        )?;

        write!(out, "duk_ret_t {}(duk_context *ctx", class_symbol(interface, "create"))?;
        for field in &fields {
            write!(out, ",\n\t\t{}", utils::c_declaration(field))?;
        }
        write!(
            out,
            ")\n\
             {{\n\
             \tstruct {private} *priv;\n\
             \tduk_idx_t i;\n\
             \n\
             \tpriv = malloc(sizeof(*priv));\n\
             \tif (priv == NULL) {{\n\
             \t\treturn DUK_RET_ERROR;\n\
             \t}}\n",
            private = private
        )?;
        for field in &fields {
            writeln!(out, "\tpriv->{ident} = {ident};", ident = field.ident)?;
        }
        write!(
            out,
            "\n\
             \tduk_push_object(ctx);\n\
             \tduk_push_pointer(ctx, priv);\n\
             \tduk_put_prop_string(ctx, -2, {key});\n\
             \tduk_push_c_function(ctx, {destructor}, 1);\n\
             \tduk_set_finalizer(ctx, -2);\n\
             \tduk_put_function_list(ctx, -1, {methods});\n\
             \n\
             \tfor (i = 0; {properties}[i].name != NULL; i++) {{\n\
             \t\tduk_uint_t flags = DUK_DEFPROP_HAVE_GETTER | DUK_DEFPROP_HAVE_ENUMERABLE | DUK_DEFPROP_ENUMERABLE;\n\
             \n\
             \t\tduk_push_string(ctx, {properties}[i].name);\n\
             \t\tduk_push_c_function(ctx, {properties}[i].getter, 0);\n\
             \t\tif ({properties}[i].setter != NULL) {{\n\
             \t\t\tduk_push_c_function(ctx, {properties}[i].setter, 1);\n\
             \t\t\tflags |= DUK_DEFPROP_HAVE_SETTER;\n\
             \t\t}}\n\
             \t\tduk_def_prop(ctx, -3 - ((flags & DUK_DEFPROP_HAVE_SETTER) ? 1 : 0), flags);\n\
             \t}}\n\
             \n\
             \treturn 1;\n\
             }}\n",
            key = key,
            destructor = destructor,
            methods = class_symbol(interface, "methods"),
            properties = properties
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glue_parser::{parse_binding, parse_webidl};
    use pretty_assertions::assert_eq;

    fn source(private: &str) -> BindingSource {
        let binding = parse_binding(&format!(
            "binding win {{ type duk_libdom; interface Window; {} }}",
            private
        ))
        .unwrap();
        let webidl = parse_webidl(
            "interface EventTarget { void addEventListener(DOMString type, optional any cb); };
             interface Window : EventTarget {
               readonly attribute DOMString name;
               attribute long status;
               void alert(DOMString... messages);
               stringifier;
             };",
        )
        .unwrap();
        BindingSource::new(binding, webidl).unwrap()
    }

    fn emit(pass: fn(&DuktapeBackend, &mut dyn Write, &BindingSource) -> Result<()>, source: &BindingSource) -> String {
        let mut out = Vec::new();
        pass(&DuktapeBackend::new(), &mut out, source).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_method_table_uses_declaring_interface() {
        let text = emit(DuktapeBackend::function_spec, &source(""));
        assert_eq!(
            text,
            "static const duk_function_list_entry dukky_Window___methods[] = {\n\
             \t/**** Window ****/\n\
             \t{ \"alert\", dukky_Window_alert, DUK_VARARGS },\n\
             \t/**** EventTarget ****/\n\
             \t{ \"addEventListener\", dukky_EventTarget_addEventListener, 2 },\n\
             \t{ NULL, NULL, 0 }\n\
             };\n\n"
        );
    }

    #[test]
    fn test_property_table() {
        let text = emit(DuktapeBackend::property_spec, &source(""));
        assert!(text.contains("\t{ \"name\", dukky_Window_name_getter, NULL },\n"));
        assert!(text.contains("\t{ \"status\", dukky_Window_status_getter, dukky_Window_status_setter },\n"));
        assert!(text.ends_with("\t{ NULL, NULL, NULL }\n};\n\n"));
    }

    #[test]
    fn test_property_bodies() {
        let text = emit(DuktapeBackend::property_bodies, &source(""));
        assert_eq!(text.matches("_setter(duk_context *ctx)").count(), 1);
        assert_eq!(text.matches("_getter(duk_context *ctx)").count(), 2);
        assert!(
            text.find("dukky_Window_status_setter").unwrap()
                < text.find("dukky_Window_status_getter").unwrap()
        );
    }

    #[test]
    fn test_operator_bodies_skip_stringifier() {
        let text = emit(DuktapeBackend::operator_bodies, &source(""));
        assert_eq!(text.matches("(duk_context *ctx)\n{\n\treturn 0;\n}").count(), 2);
    }

    #[test]
    fn test_private_struct_and_constructor() {
        let private = r#"private "int " count; private "char *" name;"#;
        let decl = emit(DuktapeBackend::private_declaration, &source(private));
        assert_eq!(decl, "struct dukky_Window_private {\n\tint count;\n\tchar *name;\n};\n\n");

        let text = emit(DuktapeBackend::constructors, &source(private));
        assert!(text.contains("duk_ret_t dukky_Window___create(duk_context *ctx,\n\t\tint count,\n\t\tchar *name)\n"));
        assert!(text.find("\tpriv->count = count;").unwrap() < text.find("\tpriv->name = name;").unwrap());
        assert!(text.contains("DUKKY_WINDOW_PRIVATE"));
    }

    #[test]
    fn test_class_descriptor() {
        let text = emit(DuktapeBackend::class_descriptor, &source(""));
        assert!(text.starts_with("/* class Window */\n#define DUKKY_WINDOW_PRIVATE \"\\xFF\" \"Window_private\"\n"));
        assert!(text.contains("} dukky_Window___property;\n"));
        assert!(text.ends_with("static duk_ret_t dukky_Window___destructor(duk_context *ctx);\n\n"));
    }

    #[test]
    fn test_member_names_cannot_shadow_class_symbols() {
        let binding = parse_binding("binding a { interface A_b; }").unwrap();
        let webidl = parse_webidl(
            "interface A_b : A { void c(); attribute long methods; };
             interface A { void b_c(); void create(); };",
        )
        .unwrap();
        let source = BindingSource::new(binding, webidl).unwrap();

        let bodies = emit(DuktapeBackend::operator_bodies, &source);
        assert!(bodies.contains("static duk_ret_t dukky_A_1b_c(duk_context *ctx)"));
        assert!(bodies.contains("static duk_ret_t dukky_A_b_1c(duk_context *ctx)"));
        assert!(bodies.contains("static duk_ret_t dukky_A_create(duk_context *ctx)"));

        let table = emit(DuktapeBackend::function_spec, &source);
        assert!(table.starts_with("static const duk_function_list_entry dukky_A_1b___methods[] = {"));
        assert!(emit(DuktapeBackend::property_spec, &source).contains("dukky_A_1b_methods_getter"));
        assert!(emit(DuktapeBackend::constructors, &source).contains("DUKKY_A_1B_PRIVATE"));
    }

    #[test]
    fn test_dictionary_gets_accessors_only() {
        let binding = parse_binding("binding init { type duk_libdom; interface MouseEventInit; }").unwrap();
        let webidl = parse_webidl(
            "dictionary EventInit { boolean bubbles = false; };
             dictionary MouseEventInit : EventInit { long button = 0; };",
        )
        .unwrap();
        let source = BindingSource::new(binding, webidl).unwrap();

        assert!(emit(DuktapeBackend::operator_bodies, &source).is_empty());
        assert_eq!(
            emit(DuktapeBackend::function_spec, &source),
            "static const duk_function_list_entry dukky_MouseEventInit___methods[] = {\n\t{ NULL, NULL, 0 }\n};\n\n"
        );

        let bodies = emit(DuktapeBackend::property_bodies, &source);
        assert!(bodies.find("dukky_MouseEventInit_button_setter").unwrap() < bodies.find("dukky_EventInit_bubbles_setter").unwrap());
        assert_eq!(bodies.matches("_getter(duk_context *ctx)").count(), 2);

        let table = emit(DuktapeBackend::property_spec, &source);
        assert!(table.contains("\t{ \"button\", dukky_MouseEventInit_button_getter, dukky_MouseEventInit_button_setter },\n"));
        assert!(table.contains("\t/**** EventInit ****/\n\t{ \"bubbles\", dukky_EventInit_bubbles_getter, dukky_EventInit_bubbles_setter },\n"));
    }
}
