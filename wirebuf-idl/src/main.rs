//! wirebuf schema compiler CLI

use {
    anyhow::{Context, Result},
    clap::Parser,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    tracing::info,
    wirebuf_idl::{compile, package_name, Config},
};

#[derive(Parser)]
#[command(name = "wirebuf-schema-gen")]
#[command(about = "Generate wirebuf codecs from a schema file", long_about = None)]
struct Cli {
    /// Schema file to compile
    schema: PathBuf,

    /// Package name (default: schema file name up to the first '.')
    #[arg(long)]
    pkg: Option<String>,

    /// Directory for generated Rust
    #[arg(long)]
    rust_out: Option<PathBuf>,

    /// Directory for generated JavaScript
    #[arg(long)]
    js_out: Option<PathBuf>,

    /// Module required by generated JavaScript
    #[arg(long, default_value = wirebuf_idl::DEFAULT_JS_RUNTIME)]
    js_runtime: String,

    /// Path to the wirebuf crate in generated Rust
    #[arg(long, default_value = "::wirebuf")]
    runtime: String,

    /// Skip rpc service traits
    #[arg(long)]
    no_services: bool,

    /// Print the parsed schema as JSON
    #[arg(long)]
    dump_ast: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let package = cli
        .pkg
        .clone()
        .or_else(|| package_name(&cli.schema))
        .context("cannot derive a package name from the schema path, pass --pkg")?;
    let config = Config {
        runtime: cli.runtime.clone(),
        js_runtime: cli.js_runtime.clone(),
        services: !cli.no_services,
        ..Config::new(package)
    };

    info!("Compiling {}", cli.schema.display());
    let source = fs::read_to_string(&cli.schema)
        .with_context(|| format!("reading {}", cli.schema.display()))?;
    let output = compile(&source, &config)
        .with_context(|| format!("compiling {}", cli.schema.display()))?;

    if cli.dump_ast {
        println!("{}", serde_json::to_string_pretty(&output.syntax)?);
    }
    if let Some(dir) = &cli.rust_out {
        write(dir, &output.rust_file_name(), &output.rust)?;
    }
    if let Some(dir) = &cli.js_out {
        write(dir, &output.js_file_name(), &output.js)?;
    }
    if cli.rust_out.is_none() && cli.js_out.is_none() && !cli.dump_ast {
        info!("no output requested; schema is valid");
    }
    Ok(())
}
