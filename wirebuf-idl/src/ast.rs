//! Parsed and resolved schema.
use {serde::Serialize, std::collections::BTreeMap};

/// Pragma enabling zlib compression of marshalled messages.
pub const ZLIB_COMPRESS: &str = "zlib-compress";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Syntax {
    pub package: String,
    pub pragmas: BTreeMap<String, bool>,
    /// Messages in declaration order.
    pub messages: Vec<Message>,
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
}

impl Syntax {
    pub fn pragma(&self, name: &str) -> bool {
        self.pragmas.get(name).copied().unwrap_or(false)
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name: String,
    pub fields: Vec<Field>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    /// Declared with a trailing `[]`.
    pub array: bool,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum FieldType {
    Builtin(Builtin),
    Message(String),
    Enum(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
    Bool,
    String,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Bytes,
    Float32,
    Float64,
    Uuid,
    /// Signed 64-bit varint.
    Int,
    /// Unsigned 64-bit varint.
    Uint,
    /// Signed 128-bit varint.
    Bigint,
    /// Milliseconds since the epoch, unsigned varint.
    Date,
    /// Raw timestamp carried exactly like `uint`.
    Time,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "uint8" | "byte" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "bytes" => Self::Bytes,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "uuid" => Self::Uuid,
            "int" => Self::Int,
            "uint" => Self::Uint,
            "bigint" => Self::Bigint,
            "date" => Self::Date,
            "time" => Self::Time,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Service {
    pub name: String,
    pub procedures: Vec<Procedure>,
}

/// `name(Request) -> Response`. `None` stands for `void`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Procedure {
    pub name: String,
    pub request: Option<String>,
    pub response: Option<String>,
}
