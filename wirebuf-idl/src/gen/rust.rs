//! Rust generator.
//!
//! Each message becomes a plain struct with inherent `marshal`, `unmarshal`,
//! `encode_into` and `decode_from` methods plus `Encode`/`Decode` impls, so
//! generated types nest inside any other `wirebuf` schema. Enums become
//! fieldless Rust enums carried as an unsigned varint. Services become
//! traits.
//!
//! `uint16`, `uint32` and `uint64` are fixed little-endian. `int`, `uint` and
//! `bigint` are varints. `date` is a `DateTime<Utc>` carried as milliseconds.
//! `time` is a plain `u64` with exactly the bytes of `uint`.
use {
    super::{field_ident, type_ident},
    crate::{
        ast::{Builtin, Enum, Field, FieldType, Message, Service, Syntax, ZLIB_COMPRESS},
        Config,
    },
    core::fmt::{self, Display, Formatter, Write},
};

pub(crate) struct RustModule<'a> {
    pub(crate) syntax: &'a Syntax,
    pub(crate) config: &'a Config,
}

/// How a field value is reached from generated code.
#[derive(Clone, Copy)]
enum Access<'a> {
    /// `self.<field>` inside `encode_into`.
    Field(&'a str),
    /// `item: &T` while iterating an array.
    Item,
}

impl Access<'_> {
    fn value(self) -> String {
        match self {
            Self::Field(name) => format!("self.{name}"),
            Self::Item => "*item".into(),
        }
    }

    fn reference(self) -> String {
        match self {
            Self::Field(name) => format!("&self.{name}"),
            Self::Item => "item".into(),
        }
    }

    fn receiver(self) -> String {
        match self {
            Self::Field(name) => format!("self.{name}"),
            Self::Item => "item".into(),
        }
    }
}

impl RustModule<'_> {
    fn rt(&self) -> &str {
        &self.config.runtime
    }

    /// Rust type of one element of `field`.
    fn element_type(&self, ty: &FieldType) -> String {
        let rt = self.rt();
        match ty {
            FieldType::Builtin(builtin) => match builtin {
                Builtin::Bool => "bool".into(),
                Builtin::String => "::std::string::String".into(),
                Builtin::Uint8 => "u8".into(),
                Builtin::Uint16 => "u16".into(),
                Builtin::Uint32 => "u32".into(),
                Builtin::Uint64 | Builtin::Uint | Builtin::Time => "u64".into(),
                Builtin::Bytes => "::std::vec::Vec<u8>".into(),
                Builtin::Float32 => "f32".into(),
                Builtin::Float64 => "f64".into(),
                Builtin::Uuid => format!("{rt}::Uuid"),
                Builtin::Int => "i64".into(),
                Builtin::Bigint => "i128".into(),
                Builtin::Date => format!("{rt}::DateTime<{rt}::Utc>"),
            },
            FieldType::Message(name) | FieldType::Enum(name) => type_ident(name),
        }
    }

    fn field_type(&self, field: &Field) -> String {
        let element = self.element_type(&field.ty);
        if field.array {
            format!("::std::vec::Vec<{element}>")
        } else {
            element
        }
    }

    /// `wirebuf` schema describing the same bytes as the generated code.
    fn schema(&self, field: &Field) -> String {
        let rt = self.rt();
        let element = match &field.ty {
            FieldType::Builtin(Builtin::Uint16) => format!("{rt}::containers::Fixed<u16>"),
            FieldType::Builtin(Builtin::Uint32) => format!("{rt}::containers::Fixed<u32>"),
            FieldType::Builtin(Builtin::Uint64) => format!("{rt}::containers::Fixed<u64>"),
            FieldType::Builtin(Builtin::Date) => format!("{rt}::containers::Date"),
            ty => self.element_type(ty),
        };
        if field.array {
            format!("::std::vec::Vec<{element}>")
        } else {
            element
        }
    }

    fn encode_element(&self, ty: &FieldType, access: Access<'_>) -> String {
        let (method, arg) = match ty {
            FieldType::Builtin(builtin) => match builtin {
                Builtin::Bool => ("write_bool", access.value()),
                Builtin::String => ("write_string", access.reference()),
                Builtin::Uint8 => ("write_u8", access.value()),
                Builtin::Uint16 => ("write_u16", access.value()),
                Builtin::Uint32 => ("write_u32", access.value()),
                Builtin::Uint64 => ("write_u64", access.value()),
                Builtin::Bytes => ("write_limited_bytes", access.reference()),
                Builtin::Float32 => ("write_f32", access.value()),
                Builtin::Float64 => ("write_f64", access.value()),
                Builtin::Uuid => ("write_uuid", access.reference()),
                Builtin::Int => ("write_varint", access.value()),
                Builtin::Uint | Builtin::Time => ("write_uvarint", access.value()),
                Builtin::Bigint => ("write_varint128", access.value()),
                Builtin::Date => ("write_date", access.reference()),
            },
            FieldType::Message(_) => return format!("{}.encode_into(buf)?;", access.receiver()),
            FieldType::Enum(_) => ("write_uvarint", format!("u64::from({})", access.value())),
        };
        format!("buf.{method}({arg})?;")
    }

    fn decode_element(&self, ty: &FieldType) -> String {
        let method = match ty {
            FieldType::Builtin(builtin) => match builtin {
                Builtin::Bool => "read_bool",
                Builtin::String => "read_string",
                Builtin::Uint8 => "read_u8",
                Builtin::Uint16 => "read_u16",
                Builtin::Uint32 => "read_u32",
                Builtin::Uint64 => "read_u64",
                Builtin::Bytes => "read_limited_bytes",
                Builtin::Float32 => "read_f32",
                Builtin::Float64 => "read_f64",
                Builtin::Uuid => "read_uuid",
                Builtin::Int => "read_varint",
                Builtin::Uint | Builtin::Time => "read_uvarint",
                Builtin::Bigint => "read_varint128",
                Builtin::Date => "read_date",
            },
            FieldType::Message(name) => return format!("{}::decode_from(buf)?", type_ident(name)),
            FieldType::Enum(name) => {
                return format!("{}::try_from(buf.read_uvarint()?)?", type_ident(name))
            }
        };
        format!("buf.{method}()?")
    }

    fn write_message(&self, f: &mut Formatter<'_>, message: &Message) -> fmt::Result {
        let rt = self.rt();
        let name = type_ident(&message.name);
        let zlib = self.syntax.pragma(ZLIB_COMPRESS);
        let fields: Vec<(String, &Field)> = message
            .fields
            .iter()
            .map(|field| (field_ident(&field.name), field))
            .collect();

        writeln!(f, "#[derive(Debug, Clone, PartialEq, Default)]")?;
        writeln!(f, "pub struct {name} {{")?;
        for (ident, field) in &fields {
            writeln!(f, "    pub {ident}: {},", self.field_type(field))?;
        }
        writeln!(f, "}}\n")?;

        writeln!(f, "impl {name} {{")?;

        writeln!(f, "    pub fn marshal(&self) -> {rt}::Result<::std::vec::Vec<u8>> {{")?;
        if zlib {
            writeln!(f, "        let bytes = <Self as {rt}::Marshal>::marshal(self)?;")?;
            writeln!(f, "        {rt}::zlib::compress(&bytes)")?;
        } else {
            writeln!(f, "        <Self as {rt}::Marshal>::marshal(self)")?;
        }
        writeln!(f, "    }}\n")?;

        writeln!(f, "    pub fn unmarshal(bytes: &[u8]) -> {rt}::Result<Self> {{")?;
        if zlib {
            writeln!(f, "        let bytes = {rt}::zlib::decompress(bytes)?;")?;
            writeln!(f, "        let mut buf = {rt}::Buffer::from_slice(&bytes);")?;
        } else {
            writeln!(f, "        let mut buf = {rt}::Buffer::from_slice(bytes);")?;
        }
        writeln!(f, "        Self::decode_from(&mut buf)")?;
        writeln!(f, "    }}\n")?;

        writeln!(
            f,
            "    pub fn encode_into(&self, buf: &mut {rt}::Buffer<'_>) -> {rt}::Result<()> {{"
        )?;
        if fields.is_empty() {
            writeln!(f, "        let _ = buf;")?;
        }
        for (ident, field) in &fields {
            if field.array {
                writeln!(f, "        buf.write_uvarint(self.{ident}.len() as u64)?;")?;
                writeln!(f, "        for item in &self.{ident} {{")?;
                writeln!(f, "            {}", self.encode_element(&field.ty, Access::Item))?;
                writeln!(f, "        }}")?;
            } else {
                let line = self.encode_element(&field.ty, Access::Field(ident));
                writeln!(f, "        {line}")?;
            }
        }
        writeln!(f, "        Ok(())")?;
        writeln!(f, "    }}\n")?;

        writeln!(
            f,
            "    pub fn decode_from(buf: &mut {rt}::Buffer<'_>) -> {rt}::Result<Self> {{"
        )?;
        if fields.is_empty() {
            writeln!(f, "        let _ = buf;")?;
        }
        writeln!(f, "        Ok(Self {{")?;
        for (ident, field) in &fields {
            let element = self.decode_element(&field.ty);
            if field.array {
                let schema = self.schema(&Field {
                    array: false,
                    ..(*field).clone()
                });
                let element_type = self.element_type(&field.ty);
                writeln!(f, "            {ident}: {{")?;
                writeln!(
                    f,
                    "                let len = buf.read_length(<{schema} as {rt}::Decode>::MIN_SIZE)?;"
                )?;
                writeln!(
                    f,
                    "                let mut items = ::std::vec::Vec::with_capacity(buf.limits().capacity_for::<{element_type}>(len));"
                )?;
                writeln!(f, "                for _ in 0..len {{")?;
                writeln!(f, "                    items.push({element});")?;
                writeln!(f, "                }}")?;
                writeln!(f, "                items")?;
                writeln!(f, "            }},")?;
            } else {
                writeln!(f, "            {ident}: {element},")?;
            }
        }
        writeln!(f, "        }})")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")?;

        writeln!(f, "impl {rt}::Encode for {name} {{")?;
        writeln!(f, "    type Src = Self;\n")?;
        if fields.is_empty() {
            writeln!(f, "    fn size_of(_src: &Self) -> {rt}::Result<usize> {{")?;
            writeln!(f, "        Ok(0)")?;
        } else {
            writeln!(f, "    fn size_of(src: &Self) -> {rt}::Result<usize> {{")?;
            writeln!(f, "        let mut total = 0usize;")?;
            for (ident, field) in &fields {
                writeln!(
                    f,
                    "        total = total.checked_add(<{} as {rt}::Encode>::size_of(&src.{ident})?).ok_or_else({rt}::error::size_of_overflow)?;",
                    self.schema(field)
                )?;
            }
            writeln!(f, "        Ok(total)")?;
        }
        writeln!(f, "    }}\n")?;
        writeln!(
            f,
            "    fn encode(buf: &mut {rt}::Buffer<'_>, src: &Self) -> {rt}::Result<()> {{"
        )?;
        writeln!(f, "        src.encode_into(buf)")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")?;

        writeln!(f, "impl {rt}::Decode for {name} {{")?;
        writeln!(f, "    type Dst = Self;")?;
        let mut min_size = String::from("0");
        for (_, field) in &fields {
            write!(min_size, " + <{} as {rt}::Decode>::MIN_SIZE", self.schema(field))?;
        }
        writeln!(f, "    const MIN_SIZE: usize = {min_size};\n")?;
        writeln!(
            f,
            "    fn decode(buf: &mut {rt}::Buffer<'_>) -> {rt}::Result<Self> {{"
        )?;
        writeln!(f, "        Self::decode_from(buf)")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")
    }

    fn write_enum(&self, f: &mut Formatter<'_>, en: &Enum) -> fmt::Result {
        let rt = self.rt();
        let name = type_ident(&en.name);
        let variants: Vec<(String, u64)> = en
            .values
            .iter()
            .map(|v| (type_ident(&v.name), v.value))
            .collect();

        writeln!(f, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]")?;
        writeln!(f, "pub enum {name} {{")?;
        for (i, (variant, value)) in variants.iter().enumerate() {
            if i == 0 {
                writeln!(f, "    #[default]")?;
            }
            writeln!(f, "    {variant} = {value},")?;
        }
        writeln!(f, "}}\n")?;

        writeln!(f, "impl ::core::convert::From<{name}> for u64 {{")?;
        writeln!(f, "    fn from(value: {name}) -> u64 {{")?;
        writeln!(f, "        value as u64")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")?;

        writeln!(f, "impl ::core::convert::TryFrom<u64> for {name} {{")?;
        writeln!(f, "    type Error = {rt}::Error;\n")?;
        writeln!(f, "    fn try_from(value: u64) -> {rt}::Result<Self> {{")?;
        writeln!(f, "        match value {{")?;
        for (variant, value) in &variants {
            writeln!(f, "            {value} => Ok(Self::{variant}),")?;
        }
        writeln!(f, "            _ => Err({rt}::error::invalid_tag_encoding(value)),")?;
        writeln!(f, "        }}")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")?;

        writeln!(f, "impl {rt}::Encode for {name} {{")?;
        writeln!(f, "    type Src = Self;\n")?;
        writeln!(f, "    fn size_of(src: &Self) -> {rt}::Result<usize> {{")?;
        writeln!(f, "        Ok({rt}::varint::unsigned_len(u64::from(*src)))")?;
        writeln!(f, "    }}\n")?;
        writeln!(
            f,
            "    fn encode(buf: &mut {rt}::Buffer<'_>, src: &Self) -> {rt}::Result<()> {{"
        )?;
        writeln!(f, "        buf.write_uvarint(u64::from(*src))")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")?;

        writeln!(f, "impl {rt}::Decode for {name} {{")?;
        writeln!(f, "    type Dst = Self;")?;
        writeln!(f, "    const MIN_SIZE: usize = 1;\n")?;
        writeln!(
            f,
            "    fn decode(buf: &mut {rt}::Buffer<'_>) -> {rt}::Result<Self> {{"
        )?;
        writeln!(f, "        Self::try_from(buf.read_uvarint()?)")?;
        writeln!(f, "    }}")?;
        writeln!(f, "}}\n")
    }

    fn write_service(&self, f: &mut Formatter<'_>, service: &Service) -> fmt::Result {
        writeln!(f, "pub trait {} {{", type_ident(&service.name))?;
        writeln!(f, "    type Error;")?;
        for procedure in &service.procedures {
            let request = procedure
                .request
                .as_deref()
                .map(|r| format!(", request: {}", type_ident(r)))
                .unwrap_or_default();
            let response = procedure
                .response
                .as_deref()
                .map(type_ident)
                .unwrap_or_else(|| "()".into());
            writeln!(
                f,
                "\n    fn {}(&mut self{request}) -> ::core::result::Result<{response}, Self::Error>;",
                field_ident(&procedure.name)
            )?;
        }
        writeln!(f, "}}\n")
    }
}

impl Display for RustModule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "// @generated by wirebuf-schema-gen from package `{}`. Do not edit.\n",
            self.syntax.package
        )?;
        for en in &self.syntax.enums {
            self.write_enum(f, en)?;
        }
        for message in &self.syntax.messages {
            self.write_message(f, message)?;
        }
        if self.config.services {
            for service in &self.syntax.services {
                self.write_service(f, service)?;
            }
        }
        Ok(())
    }
}
