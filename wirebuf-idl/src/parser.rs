//! Schema parser.
//!
//! A single forward pass over the tokens collects declarations:
//!
//! ```text
//! use <pragma>
//! enum <Name> { <value>... }
//! struct <Name> { <type> <field>[[]]... }
//! rpc <Name> { <proc>(<Request>) -> <Response>... }
//! ```
//!
//! Field types are resolved afterwards, so structs may refer to types
//! declared later in the file. A name resolves to a built-in first, then a
//! struct, then an enum.
use {
    crate::{
        ast::{Builtin, Enum, EnumValue, Field, FieldType, Message, Procedure, Service, Syntax},
        error::{unexpected, ErrorKind, Result, SchemaError},
        lexer::{lex, Token, TokenKind},
    },
    std::collections::{BTreeMap, HashMap, HashSet},
    tracing::{debug, warn},
};

const KNOWN_PRAGMAS: &[&str] = &[crate::ast::ZLIB_COMPRESS];

/// Name used for a procedure without a request or response.
const VOID: &str = "void";

struct Name {
    text: String,
    line: usize,
    column: usize,
}

impl Name {
    fn error(&self, kind: ErrorKind) -> SchemaError {
        SchemaError::new(self.line, self.column, kind)
    }

    fn validate(self) -> Result<Self> {
        if is_valid_name(&self.text) {
            Ok(self)
        } else {
            Err(self.error(ErrorKind::InvalidName(self.text.clone())))
        }
    }
}

struct PendingField {
    name: String,
    array: bool,
    ty: Name,
}

struct PendingMessage {
    name: Name,
    fields: Vec<PendingField>,
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
    /// Position reported for errors at end of input.
    end: (usize, usize),
    pragmas: BTreeMap<String, bool>,
    messages: Vec<PendingMessage>,
    enums: Vec<Enum>,
    services: Vec<Service>,
    /// Request and response types named by procedures.
    rpc_types: Vec<Name>,
    type_names: HashSet<String>,
    service_names: HashSet<String>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        let end = tokens
            .last()
            .map(|t| (t.line, t.column + t.kind.as_str().chars().count()))
            .unwrap_or((1, 1));
        Self {
            tokens: tokens.into_iter(),
            end,
            pragmas: BTreeMap::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
            rpc_types: Vec::new(),
            type_names: HashSet::new(),
            service_names: HashSet::new(),
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<Token> {
        self.tokens
            .next()
            .ok_or_else(|| SchemaError::new(self.end.0, self.end.1, ErrorKind::UnexpectedEof(expected)))
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<()> {
        let token = self.next(expected)?;
        if token.kind != kind {
            return Err(unexpected(token.line, token.column, expected, token.kind.as_str()));
        }
        Ok(())
    }

    fn name(&mut self, expected: &'static str) -> Result<Name> {
        let token = self.next(expected)?;
        match token.kind {
            TokenKind::Name(text) => Ok(Name {
                text,
                line: token.line,
                column: token.column,
            }),
            other => Err(unexpected(token.line, token.column, expected, other.as_str())),
        }
    }

    /// Either the next name or the closing brace of the current block.
    fn name_or_close(&mut self, expected: &'static str) -> Result<Option<Name>> {
        let token = self.next(expected)?;
        match token.kind {
            TokenKind::CloseBrace => Ok(None),
            TokenKind::Name(text) => Ok(Some(Name {
                text,
                line: token.line,
                column: token.column,
            })),
            other => Err(unexpected(token.line, token.column, expected, other.as_str())),
        }
    }

    fn type_name(&mut self) -> Result<Name> {
        let name = self.name("type name")?.validate()?;
        if Builtin::from_name(&name.text).is_some() || name.text == VOID {
            return Err(name.error(ErrorKind::ReservedName(name.text.clone())));
        }
        if !self.type_names.insert(name.text.clone()) {
            return Err(name.error(ErrorKind::DuplicateType(name.text.clone())));
        }
        Ok(name)
    }

    fn parse(mut self) -> Result<Self> {
        while let Some(token) = self.tokens.next() {
            match token.kind {
                TokenKind::Use => self.parse_use()?,
                TokenKind::Enum => self.parse_enum()?,
                TokenKind::Struct => self.parse_struct()?,
                TokenKind::Rpc => self.parse_rpc()?,
                other => {
                    return Err(unexpected(
                        token.line,
                        token.column,
                        "`use`, `enum`, `struct` or `rpc`",
                        other.as_str(),
                    ))
                }
            }
        }
        Ok(self)
    }

    fn parse_use(&mut self) -> Result<()> {
        let pragma = self.name("pragma name")?;
        if !KNOWN_PRAGMAS.contains(&pragma.text.as_str()) {
            warn!(pragma = %pragma.text, line = pragma.line, "unknown pragma");
        }
        self.pragmas.insert(pragma.text, true);
        Ok(())
    }

    fn parse_enum(&mut self) -> Result<()> {
        let name = self.type_name()?;
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut values: Vec<EnumValue> = Vec::new();
        while let Some(value) = self.name_or_close("enum value or `}`")? {
            let value = value.validate()?;
            if values.iter().any(|v| v.name == value.text) {
                return Err(value.error(ErrorKind::DuplicateField(value.text.clone())));
            }
            values.push(EnumValue {
                name: value.text,
                value: values.len() as u64,
            });
        }
        if values.is_empty() {
            return Err(name.error(ErrorKind::EmptyEnum(name.text.clone())));
        }
        self.enums.push(Enum {
            name: name.text,
            values,
        });
        Ok(())
    }

    fn parse_struct(&mut self) -> Result<()> {
        let name = self.type_name()?;
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut fields: Vec<PendingField> = Vec::new();
        while let Some(ty) = self.name_or_close("field type or `}`")? {
            let ty = ty.validate()?;
            let field = self.name("field name")?;
            let (text, array) = match field.text.strip_suffix("[]") {
                Some(stripped) => (stripped.to_owned(), true),
                None => (field.text.clone(), false),
            };
            let field = Name { text, ..field }.validate()?;
            if fields.iter().any(|f| f.name == field.text) {
                return Err(field.error(ErrorKind::DuplicateField(field.text.clone())));
            }
            fields.push(PendingField {
                name: field.text,
                array,
                ty,
            });
        }
        self.messages.push(PendingMessage { name, fields });
        Ok(())
    }

    fn parse_rpc(&mut self) -> Result<()> {
        let name = self.name("service name")?.validate()?;
        if !self.service_names.insert(name.text.clone()) {
            return Err(name.error(ErrorKind::DuplicateType(name.text.clone())));
        }
        self.expect(TokenKind::OpenBrace, "`{`")?;
        let mut procedures: Vec<Procedure> = Vec::new();
        while let Some(signature) = self.name_or_close("procedure or `}`")? {
            let (proc_name, request) = split_signature(&signature)?;
            if procedures.iter().any(|p| p.name == proc_name) {
                return Err(signature.error(ErrorKind::DuplicateProcedure(proc_name)));
            }
            self.expect(TokenKind::Arrow, "`->`")?;
            let response = self.name("response type")?.validate()?;
            let request = non_void(request);
            let response = non_void(response.text.clone()).map(|_| response);
            if let Some(request) = &request {
                self.rpc_types.push(Name {
                    text: request.clone(),
                    line: signature.line,
                    column: signature.column,
                });
            }
            procedures.push(Procedure {
                name: proc_name,
                request,
                response: response.as_ref().map(|r| r.text.clone()),
            });
            self.rpc_types.extend(response);
        }
        self.services.push(Service {
            name: name.text,
            procedures,
        });
        Ok(())
    }

    fn resolve(self, package: &str) -> Result<Syntax> {
        let Self {
            pragmas,
            messages,
            enums,
            services,
            rpc_types,
            ..
        } = self;
        let struct_names: HashSet<&str> = messages.iter().map(|m| m.name.text.as_str()).collect();
        let enum_names: HashSet<&str> = enums.iter().map(|e| e.name.as_str()).collect();

        if let Some(ty) = rpc_types.iter().find(|ty| !struct_names.contains(ty.text.as_str())) {
            return Err(ty.error(ErrorKind::UndefinedType(ty.text.clone())));
        }

        let mut resolved = Vec::with_capacity(messages.len());
        for message in &messages {
            let mut fields = Vec::with_capacity(message.fields.len());
            for field in &message.fields {
                let name = field.ty.text.as_str();
                let ty = if let Some(builtin) = Builtin::from_name(name) {
                    FieldType::Builtin(builtin)
                } else if struct_names.contains(name) {
                    FieldType::Message(name.to_owned())
                } else if enum_names.contains(name) {
                    FieldType::Enum(name.to_owned())
                } else {
                    return Err(field.ty.error(ErrorKind::UndefinedType(name.to_owned())));
                };
                fields.push(Field {
                    name: field.name.clone(),
                    ty,
                    array: field.array,
                    line: field.ty.line,
                    column: field.ty.column,
                });
            }
            resolved.push(Message {
                name: message.name.text.clone(),
                fields,
                line: message.name.line,
                column: message.name.column,
            });
        }

        reject_inline_cycles(&resolved)?;

        Ok(Syntax {
            package: package.to_owned(),
            pragmas,
            messages: resolved,
            enums,
            services,
        })
    }
}

/// Structs are encoded inline, so a struct may only reach itself through an
/// array field.
fn reject_inline_cycles(messages: &[Message]) -> Result<()> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Open,
        Done,
    }

    fn visit<'a>(
        message: &'a Message,
        by_name: &HashMap<&'a str, &'a Message>,
        marks: &mut HashMap<&'a str, Mark>,
    ) -> Result<()> {
        marks.insert(message.name.as_str(), Mark::Open);
        for field in message.fields.iter().filter(|field| !field.array) {
            let FieldType::Message(target) = &field.ty else {
                continue;
            };
            match marks.get(target.as_str()) {
                Some(Mark::Open) => {
                    return Err(SchemaError::new(
                        field.line,
                        field.column,
                        ErrorKind::RecursiveType {
                            message: target.clone(),
                            field: field.name.clone(),
                        },
                    ))
                }
                Some(Mark::Done) => {}
                None => {
                    if let Some(next) = by_name.get(target.as_str()) {
                        visit(next, by_name, marks)?;
                    }
                }
            }
        }
        marks.insert(message.name.as_str(), Mark::Done);
        Ok(())
    }

    let by_name: HashMap<&str, &Message> = messages.iter().map(|m| (m.name.as_str(), m)).collect();
    let mut marks = HashMap::new();
    for message in messages {
        if !marks.contains_key(message.name.as_str()) {
            visit(message, &by_name, &mut marks)?;
        }
    }
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn non_void(name: String) -> Option<String> {
    (name != VOID).then_some(name)
}

/// Split `name(Request)` into its parts. An empty request means `void`.
fn split_signature(signature: &Name) -> Result<(String, String)> {
    let malformed = || signature.error(ErrorKind::MalformedProcedure(signature.text.clone()));
    let (name, rest) = signature.text.split_once('(').ok_or_else(malformed)?;
    let request = rest.strip_suffix(')').ok_or_else(malformed)?;
    if !is_valid_name(name) || (!request.is_empty() && !is_valid_name(request)) {
        return Err(malformed());
    }
    let request = if request.is_empty() { VOID } else { request };
    Ok((name.to_owned(), request.to_owned()))
}

/// Parse an already lexed schema.
pub fn parse_tokens(tokens: Vec<Token>, package: &str) -> Result<Syntax> {
    let syntax = Parser::new(tokens).parse()?.resolve(package)?;
    debug!(
        package,
        messages = syntax.messages.len(),
        enums = syntax.enums.len(),
        services = syntax.services.len(),
        "parsed schema"
    );
    Ok(syntax)
}

/// Lex and parse `source` into a resolved [`Syntax`] for `package`.
pub fn parse(source: &str, package: &str) -> Result<Syntax> {
    parse_tokens(lex(source), package)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(source: &str) -> SchemaError {
        parse(source, "test").unwrap_err()
    }

    #[test]
    fn full_schema() {
        let syntax = parse(
            "use zlib-compress
             enum Color { red green blue }
             struct Pixel {
                 uint16 x
                 uint16 y
                 Color color
                 Tag tags[]   # declared below
             }
             struct Tag { string label }
             rpc Canvas {
                 paint(Pixel) -> Tag
                 clear() -> void
             }",
            "paint",
        )
        .unwrap();

        assert_eq!(syntax.package, "paint");
        assert!(syntax.pragma("zlib-compress"));
        assert!(!syntax.pragma("other"));

        let color = syntax.enumeration("Color").unwrap();
        let values: Vec<_> = color.values.iter().map(|v| (v.name.as_str(), v.value)).collect();
        assert_eq!(values, [("red", 0), ("green", 1), ("blue", 2)]);

        let pixel = syntax.message("Pixel").unwrap();
        let fields: Vec<_> = pixel.fields.iter().map(|f| (f.name.as_str(), &f.ty, f.array)).collect();
        assert_eq!(
            fields,
            [
                ("x", &FieldType::Builtin(Builtin::Uint16), false),
                ("y", &FieldType::Builtin(Builtin::Uint16), false),
                ("color", &FieldType::Enum("Color".into()), false),
                ("tags", &FieldType::Message("Tag".into()), true),
            ]
        );
        assert_eq!((pixel.fields[3].line, pixel.fields[3].column), (7, 18));

        assert_eq!(
            syntax.services[0].procedures,
            [
                Procedure {
                    name: "paint".into(),
                    request: Some("Pixel".into()),
                    response: Some("Tag".into()),
                },
                Procedure {
                    name: "clear".into(),
                    request: None,
                    response: None,
                },
            ]
        );
    }

    #[test]
    fn builtin_aliases() {
        let syntax = parse("struct A { byte b uint8 c time t date d bigint n }", "a").unwrap();
        let types: Vec<_> = syntax.messages[0].fields.iter().map(|f| f.ty.clone()).collect();
        assert_eq!(
            types,
            [Builtin::Uint8, Builtin::Uint8, Builtin::Time, Builtin::Date, Builtin::Bigint]
                .map(FieldType::Builtin)
        );
    }

    #[test]
    fn undefined_type_reports_position() {
        let err = error("struct A {\n  uint8 a\n  Missing b\n}");
        assert_eq!(err, SchemaError::new(3, 3, ErrorKind::UndefinedType("Missing".into())));
        assert_eq!(err.to_string(), "3:3: undefined type \"Missing\"");
    }

    #[test]
    fn enums_resolve_and_share_namespace() {
        let syntax = parse("enum E { a }\nstruct S { E e }", "s").unwrap();
        assert_eq!(syntax.messages[0].fields[0].ty, FieldType::Enum("E".into()));
        assert!(matches!(
            error("enum E { a }\nstruct E { }").kind,
            ErrorKind::DuplicateType(name) if name == "E"
        ));
    }

    #[test]
    fn invalid_names() {
        assert_eq!(
            error("struct Bad-Name { }"),
            SchemaError::new(1, 8, ErrorKind::InvalidName("Bad-Name".into()))
        );
        assert!(matches!(
            error("struct A { string na.me }").kind,
            ErrorKind::InvalidName(_)
        ));
        assert!(matches!(
            error("struct string { }").kind,
            ErrorKind::ReservedName(_)
        ));
    }

    #[test]
    fn duplicates() {
        assert!(matches!(
            error("struct A { int x int x }").kind,
            ErrorKind::DuplicateField(name) if name == "x"
        ));
        assert!(matches!(
            error("enum E { a a }").kind,
            ErrorKind::DuplicateField(_)
        ));
        assert!(matches!(
            error("struct A { }\nrpc R { f(A) -> A f() -> A }").kind,
            ErrorKind::DuplicateProcedure(name) if name == "f"
        ));
    }

    #[test]
    fn malformed_input() {
        assert_eq!(
            error("struct A { uint8 a"),
            SchemaError::new(1, 19, ErrorKind::UnexpectedEof("field type or `}`"))
        );
        assert!(matches!(
            error("uint8 x").kind,
            ErrorKind::UnexpectedToken { found, .. } if found == "uint8"
        ));
        assert!(matches!(error("struct A uint8 a }").kind, ErrorKind::UnexpectedToken { .. }));
        assert!(matches!(error("enum E { }").kind, ErrorKind::EmptyEnum(_)));
        assert!(matches!(
            error("struct A { }\nrpc R { call -> A }").kind,
            ErrorKind::MalformedProcedure(_)
        ));
        assert!(matches!(
            error("struct A { }\nrpc R { call(A) A }").kind,
            ErrorKind::UnexpectedToken { expected: "`->`", .. }
        ));
    }

    #[test]
    fn rpc_types_must_be_structs() {
        assert!(matches!(
            error("enum E { a }\nrpc R { f(E) -> void }").kind,
            ErrorKind::UndefinedType(name) if name == "E"
        ));
        assert_eq!(
            error("struct A { }\nrpc R {\n  f(A) -> Nope\n}"),
            SchemaError::new(3, 11, ErrorKind::UndefinedType("Nope".into()))
        );
    }

    #[test]
    fn structs_cannot_embed_themselves() {
        assert_eq!(
            error("struct Node { string label Node next }"),
            SchemaError::new(
                1,
                28,
                ErrorKind::RecursiveType {
                    message: "Node".into(),
                    field: "next".into(),
                }
            )
        );
        assert_eq!(
            error("struct A { B b }\nstruct B { string s A a }"),
            SchemaError::new(
                2,
                21,
                ErrorKind::RecursiveType {
                    message: "A".into(),
                    field: "a".into(),
                }
            )
        );

        let tree = parse(
            "struct Tree { string label Tree children[] Leaf first Leaf last }\nstruct Leaf { int v }",
            "test",
        )
        .unwrap();
        assert!(tree.messages[0].fields[1].array);
    }

    #[test]
    fn empty_schema() {
        let syntax = parse("# nothing here\n", "empty").unwrap();
        assert!(syntax.messages.is_empty() && syntax.enums.is_empty());
    }
}
