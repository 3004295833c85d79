//! JavaScript generator.
//!
//! Emits a CommonJS module with one constructor per message and one
//! `Enum_<Name>` object per enum. Messages get `encodeBuf`/`decodeBuf`
//! prototypes walking the fields against a runtime `Buffer`, and
//! `encode`/`decode` wrappers over byte arrays. Types are emitted in sorted
//! order so the output is stable.
//!
//! The runtime module (`Config::js_runtime`) must export `Buffer`, `Bn`,
//! `UUID`, `zlibCompress` and `zlibDecompress`. Its `Buffer` provides the
//! `read*`/`write*` pairs used below, with 64-bit and varint values as `Bn`.
use {
    crate::{
        ast::{Builtin, Field, FieldType, Message, Syntax, ZLIB_COMPRESS},
        Config,
    },
    core::fmt::{self, Display, Formatter},
};

/// Local name bound to the runtime module.
const RT: &str = "wb";

pub(crate) struct JsModule<'a> {
    pub(crate) syntax: &'a Syntax,
    pub(crate) config: &'a Config,
}

fn default_value(field: &Field) -> String {
    if field.array {
        return "[]".into();
    }
    match &field.ty {
        FieldType::Builtin(builtin) => match builtin {
            Builtin::Bool => "false".into(),
            Builtin::String => "\"\"".into(),
            Builtin::Uint8 | Builtin::Uint16 | Builtin::Uint32 => "0".into(),
            Builtin::Uint64 | Builtin::Int | Builtin::Uint | Builtin::Bigint | Builtin::Time => {
                format!("new {RT}.Bn(0)")
            }
            Builtin::Bytes => "new Uint8Array(0)".into(),
            Builtin::Float32 | Builtin::Float64 => "0.0".into(),
            Builtin::Uuid => format!("{RT}.UUID.zero()"),
            Builtin::Date => "new Date(0)".into(),
        },
        FieldType::Message(name) => format!("new {name}()"),
        FieldType::Enum(_) => "0".into(),
    }
}

/// Runtime method suffix shared by the `read*` and `write*` pair.
fn primitive(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Bool => "Boolean",
        Builtin::String => "String",
        Builtin::Uint8 => "Byte",
        Builtin::Uint16 => "Uint16",
        Builtin::Uint32 => "Uint32",
        Builtin::Uint64 => "Uint64",
        Builtin::Bytes => "LimitedBytes",
        Builtin::Float32 => "Float32",
        Builtin::Float64 => "Float64",
        Builtin::Uuid => "UUID",
        Builtin::Int | Builtin::Bigint => "SignedVarint",
        Builtin::Uint | Builtin::Time => "UnsignedVarint",
        Builtin::Date => "Date",
    }
}

fn write_element(ty: &FieldType, value: &str) -> String {
    match ty {
        FieldType::Builtin(builtin) => format!("_out.write{}({value});", primitive(*builtin)),
        FieldType::Message(_) => format!("{value}.encodeBuf(_out);"),
        FieldType::Enum(_) => format!("_out.writeUnsignedVarint(new {RT}.Bn({value}));"),
    }
}

fn read_element(ty: &FieldType) -> String {
    match ty {
        FieldType::Builtin(builtin) => format!("input.read{}()", primitive(*builtin)),
        FieldType::Message(name) => format!("new {name}().decodeBuf(input)"),
        FieldType::Enum(_) => "input.readUnsignedVarint().toNumber()".into(),
    }
}

impl JsModule<'_> {
    fn write_message(&self, f: &mut Formatter<'_>, message: &Message) -> fmt::Result {
        let name = &message.name;
        let zlib = self.syntax.pragma(ZLIB_COMPRESS);
        let width = message
            .fields
            .iter()
            .map(|field| field.name.chars().count())
            .max()
            .unwrap_or(0);

        writeln!(f, "/**\n * @class\n */")?;
        writeln!(f, "function {name}() {{")?;
        for field in &message.fields {
            writeln!(
                f,
                "  this.{:width$} = {};",
                field.name,
                default_value(field)
            )?;
        }
        writeln!(f, "}}\n")?;

        writeln!(f, "/**\n * @param {{{RT}.Buffer}} _out\n * @return {{{RT}.Buffer}}\n */")?;
        writeln!(f, "{name}.prototype.encodeBuf = function (_out) {{")?;
        for field in &message.fields {
            let field_name = &field.name;
            if field.array {
                writeln!(
                    f,
                    "  _out.writeUnsignedVarint(new {RT}.Bn(this.{field_name}.length));"
                )?;
                writeln!(f, "  for (let i = 0; i < this.{field_name}.length; i++) {{")?;
                writeln!(
                    f,
                    "    {}",
                    write_element(&field.ty, &format!("this.{field_name}[i]"))
                )?;
                writeln!(f, "  }}")?;
            } else {
                writeln!(
                    f,
                    "  {}",
                    write_element(&field.ty, &format!("this.{field_name}"))
                )?;
            }
        }
        writeln!(f, "  return _out;\n}};\n")?;

        writeln!(f, "/**\n * @param {{{RT}.Buffer}} input\n * @return {{{name}}}\n */")?;
        writeln!(f, "{name}.prototype.decodeBuf = function (input) {{")?;
        for field in &message.fields {
            let field_name = &field.name;
            let read = read_element(&field.ty);
            if field.array {
                writeln!(
                    f,
                    "  const {field_name}_len = input.readUnsignedVarint().toNumber();"
                )?;
                writeln!(f, "  this.{field_name} = new Array({field_name}_len);")?;
                writeln!(f, "  for (let i = 0; i < {field_name}_len; i++) {{")?;
                writeln!(f, "    this.{field_name}[i] = {read};")?;
                writeln!(f, "  }}")?;
            } else {
                writeln!(f, "  this.{field_name} = {read};")?;
            }
        }
        writeln!(f, "  return this;\n}};\n")?;

        writeln!(
            f,
            "/**\n * Serializes {name} to a Uint8Array.\n * @return {{Uint8Array}}\n */"
        )?;
        writeln!(f, "{name}.prototype.encode = function () {{")?;
        writeln!(f, "  const _out = new {RT}.Buffer();")?;
        writeln!(f, "  this.encodeBuf(_out);")?;
        if zlib {
            writeln!(f, "  return {RT}.zlibCompress(_out.finish());")?;
        } else {
            writeln!(f, "  return _out.finish();")?;
        }
        writeln!(f, "}};\n")?;

        writeln!(
            f,
            "/**\n * Deserializes {name} from a Uint8Array.\n * @param {{Uint8Array}} input\n * @return {{{name}}}\n */"
        )?;
        writeln!(f, "{name}.prototype.decode = function (input) {{")?;
        if zlib {
            writeln!(
                f,
                "  return this.decodeBuf(new {RT}.Buffer({RT}.zlibDecompress(input)));"
            )?;
        } else {
            writeln!(f, "  return this.decodeBuf(new {RT}.Buffer(input));")?;
        }
        writeln!(f, "}};\n")
    }
}

impl Display for JsModule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "// @generated by wirebuf-schema-gen from package `{}`. Do not edit.",
            self.syntax.package
        )?;
        writeln!(f, "\"use strict\";\n")?;
        writeln!(f, "const {RT} = require({:?});\n", self.config.js_runtime)?;

        let mut enums: Vec<_> = self.syntax.enums.iter().collect();
        enums.sort_by(|a, b| a.name.cmp(&b.name));
        let mut messages: Vec<_> = self.syntax.messages.iter().collect();
        messages.sort_by(|a, b| a.name.cmp(&b.name));

        for en in &enums {
            writeln!(f, "const Enum_{} = {{", en.name)?;
            for value in &en.values {
                writeln!(f, "  {}: {},", value.name, value.value)?;
            }
            writeln!(f, "}};\n")?;
        }

        for message in &messages {
            self.write_message(f, message)?;
        }

        let width = messages
            .iter()
            .map(|m| m.name.chars().count() + 1)
            .max()
            .unwrap_or(0);
        writeln!(f, "module.exports = {{")?;
        for message in &messages {
            writeln!(
                f,
                "  {:width$} {},",
                format!("{}:", message.name),
                message.name
            )?;
        }
        for en in &enums {
            writeln!(f, "  Enum_{0}: Enum_{0},", en.name)?;
        }
        writeln!(f, "}};")
    }
}
