//! Error types and helpers.
use {std::path::PathBuf, thiserror::Error};

/// A schema that failed to lex, parse or resolve.
///
/// `line` and `column` are 1-based and point at the offending token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {kind}")]
pub struct SchemaError {
    pub line: usize,
    pub column: usize,
    pub kind: ErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("expected {expected}, found {found:?}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("expected {0}, found end of input")]
    UnexpectedEof(&'static str),
    #[error("invalid name {0:?}")]
    InvalidName(String),
    #[error("{0:?} is a built-in type name")]
    ReservedName(String),
    #[error("type {0:?} is already defined")]
    DuplicateType(String),
    #[error("field {0:?} is already defined")]
    DuplicateField(String),
    #[error("procedure {0:?} is already defined")]
    DuplicateProcedure(String),
    #[error("enum {0:?} has no values")]
    EmptyEnum(String),
    #[error("malformed procedure {0:?}, expected name(Request)")]
    MalformedProcedure(String),
    #[error("undefined type {0:?}")]
    UndefinedType(String),
    #[error("field {field:?} embeds struct {message:?} in itself, use an array")]
    RecursiveType { message: String, field: String },
}

impl SchemaError {
    #[cold]
    pub(crate) const fn new(line: usize, column: usize, kind: ErrorKind) -> Self {
        Self { line, column, kind }
    }
}

/// Failure of [`Builder::compile`](crate::Builder::compile).
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}:{source}", path.display())]
    Schema { path: PathBuf, source: SchemaError },
    #[error("no output directory: set `out_dir` or run from a build script")]
    MissingOutDir,
}

pub type Result<T, E = SchemaError> = core::result::Result<T, E>;

#[cold]
pub(crate) fn unexpected(line: usize, column: usize, expected: &'static str, found: &str) -> SchemaError {
    SchemaError::new(
        line,
        column,
        ErrorKind::UnexpectedToken {
            expected,
            found: found.to_owned(),
        },
    )
}
