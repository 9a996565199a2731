//! SpiderMonkey JSAPI backend
//!
//! Emits a single C translation unit: private state struct, `JSClass`,
//! native and property stubs, the function/property tables and the
//! class initialiser and constructor.

use crate::backend::{utils, BackendTarget, BindingBackend, Result};
use crate::binding::BindingSource;
use crate::resolve::resolve;
use std::io::Write;
use tracing::warn;

#[derive(Debug, Default)]
pub struct JsapiBackend;

impl JsapiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl BindingBackend for JsapiBackend {
    fn target_info(&self) -> BackendTarget {
        BackendTarget {
            name: "jsapi",
            binding_type: "js_libdom",
            engine: "SpiderMonkey",
            file_extension: "c",
        }
    }

    fn private_declaration(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let fields = source.private_fields()?;

        writeln!(out, "struct jsclass_private {{")?;
        for field in &fields {
            writeln!(out, "        {};", utils::c_declaration(field))?;
        }
        write!(out, "}};\n\n")?;
        Ok(())
    }

    fn class_descriptor(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let interface = source.interface();

        // forward declarations for the class hooks
        writeln!(out, "static void jsclass_finalize(JSContext *cx, JSObject *obj);")?;
        write!(
            out,
            "static JSBool jsclass_resolve(JSContext *cx, JSObject *obj, jsval id, uintN flags, JSObject **objp);\n\n"
        )?;

        write!(
            out,
            "JSClass JSClass_{class} = {{\n\
             \x20       \"{interface}\",\n\
             \tJSCLASS_NEW_RESOLVE | JSCLASS_HAS_PRIVATE,\n\
             \tJS_PropertyStub,\n\
             \tJS_PropertyStub,\n\
             \tJS_PropertyStub,\n\
             \tJS_StrictPropertyStub,\n\
             \tJS_EnumerateStub,\n\
             \t(JSResolveOp)jsclass_resolve,\n\
             \tJS_ConvertStub,\n\
             \tjsclass_finalize,\n\
             \tJSCLASS_NO_OPTIONAL_MEMBERS\n\
             }};\n\n",
            class = utils::mangle(interface),
            interface = interface
        )?;
        Ok(())
    }

    fn operator_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        for block in &members.blocks {
            writeln!(out, "/**** {} ****/", block.interface)?;
            for operation in members.operations_in(block) {
                let Some(ident) = operation.ident else {
                    warn!("skipping special operation without identifier on {}", operation.interface);
                    continue;
                };
                writeln!(
                    out,
                    "static JSBool JSAPI_NATIVE({}, JSContext *cx, uintN argc, jsval *vp)",
                    utils::c_identifier(ident)
                )?;
                write!(out, "{{\n\tJS_SET_RVAL(cx, vp, JSVAL_VOID);\n\treturn JS_TRUE;\n}}\n\n")?;
            }
        }
        Ok(())
    }

    fn property_bodies(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        for block in &members.blocks {
            writeln!(out, "/**** {} ****/", block.interface)?;
            for attribute in members.attributes_in(block) {
                let ident = utils::c_identifier(attribute.ident);
                if !attribute.read_only {
                    writeln!(
                        out,
                        "static JSBool JSAPI_PROPERTYSET({}, JSContext *cx, JSObject *obj, jsval *vp)",
                        ident
                    )?;
                    write!(out, "{{\n        return JS_FALSE;\n}}\n\n")?;
                }

                writeln!(
                    out,
                    "static JSBool JSAPI_PROPERTYGET({}, JSContext *cx, JSObject *obj, jsval *vp)",
                    ident
                )?;
                write!(out, "{{\n\tJS_SET_RVAL(cx, vp, JSVAL_NULL);\n\treturn JS_TRUE;\n}}\n\n")?;
            }
        }
        Ok(())
    }

    fn function_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        writeln!(out, "static JSFunctionSpec jsclass_functions[] = {{")?;
        for block in &members.blocks {
            writeln!(out, "    /**** {} ****/", block.interface)?;
            for ident in members.operations_in(block).iter().filter_map(|op| op.ident) {
                writeln!(out, "    JSAPI_FS({}, 0, 0),", utils::c_identifier(ident))?;
            }
        }
        write!(out, "   JSAPI_FS_END\n}};\n\n")?;
        Ok(())
    }

    fn property_spec(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let members = resolve(source.webidl_ast(), source.interface())?;

        writeln!(out, "static JSPropertySpec jsclass_properties[] = {{")?;
        for block in &members.blocks {
            writeln!(out, "    /**** {} ****/", block.interface)?;
            for attribute in members.attributes_in(block) {
                let entry = if attribute.read_only { "JSAPI_PS_RO" } else { "JSAPI_PS" };
                writeln!(
                    out,
                    "    {}({}, 0, JSPROP_ENUMERATE | JSPROP_SHARED),",
                    entry,
                    utils::c_identifier(attribute.ident)
                )?;
            }
        }
        write!(out, "    JSAPI_PS_END\n}};\n\n")?;
        Ok(())
    }

    fn constructors(&self, out: &mut dyn Write, source: &BindingSource) -> Result<()> {
        let interface = utils::mangle(source.interface());
        let fields = source.private_fields()?;

        write!(
            out,
            "static void jsclass_finalize(JSContext *cx, JSObject *obj)\n\
             {{\n\
             \tstruct jsclass_private *private;\n\
             \n\
             \tprivate = JS_GetInstancePrivate(cx, obj, &JSClass_{interface}, NULL);\n\
             \tif (private != NULL) {{\n\
             \t\tfree(private);\n\
             \t}}\n\
             }}\n\n",
            interface = interface
        )?;

        write!(
            out,
            "static JSBool jsclass_resolve(JSContext *cx, JSObject *obj, jsval id, uintN flags, JSObject **objp)\n\
             {{\n\
             \t*objp = NULL;\n\
             \treturn JS_TRUE;\n\
             }}\n\n"
        )?;

        write!(
            out,
            "JSObject *jsapi_InitClass_{interface}(JSContext *cx, JSObject *parent)\n\
             {{\n\
             \tJSObject *jsobject;\n\
             \n\
             \tjsobject = JS_InitClass(cx,\n\
             \t\tparent,\n\
             \t\tNULL,\n\
             \t\t&JSClass_{interface},\n\
             \t\tNULL,\n\
             \t\t0,\n\
             \t\tjsclass_properties,\n\
             \t\tjsclass_functions,\n\
             \t\tNULL,\n\
             \t\tNULL);\n\
             \treturn jsobject;\n\
             }}\n\n",
            interface = interface
        )?;

        write!(
            out,
            "JSObject *jsapi_new_{interface}(JSContext *cx,\n\t\tJSObject *proto,\n\t\tJSObject *parent",
            interface = interface
        )?;
        for field in &fields {
            write!(out, ",\n\t\t{}", utils::c_declaration(field))?;
        }
        write!(
            out,
            ")\n\
             {{\n\
             \tJSObject *jsobject;\n\
             \tstruct jsclass_private *private;\n\
             \n\
             \tprivate = malloc(sizeof(struct jsclass_private));\n\
             \tif (private == NULL) {{\n\
             \t\treturn NULL;\n\
             \t}}\n"
        )?;
        for field in &fields {
            writeln!(out, "\tprivate->{ident} = {ident};", ident = field.ident)?;
        }
        write!(
            out,
            "\n\
             \tjsobject = JS_NewObject(cx, &JSClass_{interface}, proto, parent);\n\
             \tif (jsobject == NULL) {{\n\
             \t\tfree(private);\n\
             \t\treturn NULL;\n\
             \t}}\n\
             \n\
             \t/* attach private pointer */\n\
             \tif (JS_SetPrivate(cx, jsobject, private) != JS_TRUE) {{\n\
             \t\tfree(private);\n\
             \t\treturn NULL;\n\
             \t}}\n\
             \n\
             \treturn jsobject;\n\
             }}\n",
            interface = interface
        )?;
        Ok(())
    }
}
