//! Schema compiler for `wirebuf`.
//!
//! A schema (conventionally a `.wbs` file) declares messages, enums and RPC
//! services:
//!
//! ```text
//! use zlib-compress
//!
//! enum Color { red green blue }
//!
//! struct Pixel {
//!     uint16 x
//!     uint16 y
//!     Color  color
//!     string tags[]
//! }
//!
//! rpc Canvas {
//!     paint(Pixel) -> Pixel
//! }
//! ```
//!
//! [`compile`] turns the source into Rust and JavaScript whose messages
//! produce the same bytes as the `wirebuf` structural codec. Build scripts use
//! [`Builder`]:
//!
//! ```no_run
//! // build.rs
//! fn main() {
//!     wirebuf_idl::Builder::new()
//!         .compile("schemas/canvas.wbs")
//!         .unwrap();
//! }
//! ```
//!
//! and include the result with
//! `include!(concat!(env!("OUT_DIR"), "/canvas.wb.rs"))`.
use {
    std::{
        fs,
        path::{Path, PathBuf},
    },
    tracing::{debug, info},
};

pub mod ast;
pub mod error;
pub use error::{BuildError, ErrorKind, SchemaError};
mod gen;
pub mod lexer;
pub mod parser;

/// Default runtime module required by generated JavaScript.
pub const DEFAULT_JS_RUNTIME: &str = "wirebuf-js";

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Package name recorded in the generated files and used for file names.
    pub package: String,
    /// Path to the `wirebuf` crate in generated Rust.
    pub runtime: String,
    /// Module passed to `require` in generated JavaScript.
    pub js_runtime: String,
    /// Emit a trait per `rpc` service.
    pub services: bool,
}

impl Config {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            runtime: "::wirebuf".into(),
            js_runtime: DEFAULT_JS_RUNTIME.into(),
            services: true,
        }
    }
}

/// Result of compiling one schema.
#[derive(Debug, Clone)]
pub struct Output {
    pub syntax: ast::Syntax,
    pub rust: String,
    pub js: String,
}

impl Output {
    pub fn rust_file_name(&self) -> String {
        format!("{}.wb.rs", self.syntax.package)
    }

    pub fn js_file_name(&self) -> String {
        format!("{}.wb.js", self.syntax.package)
    }
}

/// Compile schema `source` into Rust and JavaScript.
pub fn compile(source: &str, config: &Config) -> Result<Output, SchemaError> {
    let syntax = parser::parse(source, &config.package)?;
    let rust = gen::rust::RustModule {
        syntax: &syntax,
        config,
    }
    .to_string();
    let js = gen::js::JsModule {
        syntax: &syntax,
        config,
    }
    .to_string();
    Ok(Output { syntax, rust, js })
}

/// Package name derived from a schema path: the file name up to its first `.`.
pub fn package_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().filter(|s| !s.is_empty())?;
    Some(stem.to_owned())
}

/// Compiles schema files from a build script.
///
/// Output goes to `OUT_DIR` unless [`out_dir`](Self::out_dir) is set. Only
/// Rust is written by default.
#[derive(Debug, Clone)]
pub struct Builder {
    out_dir: Option<PathBuf>,
    package: Option<String>,
    runtime: Option<String>,
    js_runtime: Option<String>,
    services: bool,
    rust: bool,
    js: bool,
    emit_rerun_if_changed: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            out_dir: None,
            package: None,
            runtime: None,
            js_runtime: None,
            services: true,
            rust: true,
            js: false,
            emit_rerun_if_changed: std::env::var_os("CARGO").is_some(),
        }
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Override the package name derived from the schema file name.
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Path to `wirebuf` in generated Rust, e.g. when it is re-exported.
    pub fn runtime(mut self, path: impl Into<String>) -> Self {
        self.runtime = Some(path.into());
        self
    }

    pub fn js_runtime(mut self, module: impl Into<String>) -> Self {
        self.js_runtime = Some(module.into());
        self
    }

    pub fn services(mut self, enable: bool) -> Self {
        self.services = enable;
        self
    }

    pub fn rust(mut self, enable: bool) -> Self {
        self.rust = enable;
        self
    }

    pub fn js(mut self, enable: bool) -> Self {
        self.js = enable;
        self
    }

    /// Print `cargo:rerun-if-changed` for each compiled schema. On by default
    /// when running under cargo.
    pub fn emit_rerun_if_changed(mut self, enable: bool) -> Self {
        self.emit_rerun_if_changed = enable;
        self
    }

    fn config(&self, path: &Path) -> Config {
        let package = self
            .package
            .clone()
            .or_else(|| package_name(path))
            .unwrap_or_else(|| "schema".into());
        let mut config = Config::new(package);
        if let Some(runtime) = &self.runtime {
            config.runtime = runtime.clone();
        }
        if let Some(js_runtime) = &self.js_runtime {
            config.js_runtime = js_runtime.clone();
        }
        config.services = self.services;
        config
    }

    /// Compile the schema at `path` and write the enabled outputs.
    ///
    /// Returns the paths written.
    pub fn compile(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>, BuildError> {
        let path = path.as_ref();
        let out_dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or(BuildError::MissingOutDir)?,
        };
        if self.emit_rerun_if_changed {
            println!("cargo:rerun-if-changed={}", path.display());
        }

        info!(path = %path.display(), "compiling schema");
        let source = fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: path.to_owned(),
            source,
        })?;
        let output = compile(&source, &self.config(path)).map_err(|source| BuildError::Schema {
            path: path.to_owned(),
            source,
        })?;

        let mut written = Vec::new();
        if self.rust {
            written.push(write_output(&out_dir, &output.rust_file_name(), &output.rust)?);
        }
        if self.js {
            written.push(write_output(&out_dir, &output.js_file_name(), &output.js)?);
        }
        Ok(written)
    }
}

fn write_output(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, BuildError> {
    let path = dir.join(name);
    let io_error = |source| BuildError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io_error)?;
    fs::write(&path, contents).map_err(io_error)?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote generated code");
    Ok(path)
}
