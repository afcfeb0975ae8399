use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use config_schema_bind::output::{GrammarFormat, OutputFormat, format_binding, format_grammar};
use config_schema_bind::{ArgumentBinder, BindError, load_package};
use config_schema_core::SchemaPackage;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Program name shown in usage when the package does not name one.
const DEFAULT_PROGRAM: &str = "config-bind";

#[derive(Debug, Parser)]
#[command(name = "config-bind")]
#[command(about = "Synthesize argument grammars from config schemas and bind inputs to them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that a schema package builds into a grammar.
    Validate(ValidateArgs),
    /// Print the argument grammar synthesized from a schema package.
    Grammar(GrammarArgs),
    /// Bind tokens, or a JSON/YAML document, against a schema package.
    Bind(BindArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema package file (JSON or YAML).
    #[arg(long)]
    schemas: PathBuf,
}

#[derive(Debug, Args)]
struct GrammarArgs {
    /// Schema package file (JSON or YAML).
    #[arg(long)]
    schemas: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: GrammarFormat,
}

#[derive(Debug, Args)]
struct BindArgs {
    /// Schema package file (JSON or YAML).
    #[arg(long)]
    schemas: PathBuf,
    /// Bind a JSON document instead of tokens.
    #[arg(long, conflicts_with = "yaml")]
    json: Option<PathBuf>,
    /// Bind a YAML document instead of tokens.
    #[arg(long)]
    yaml: Option<PathBuf>,
    /// Report unrecognized tokens instead of failing.
    #[arg(long)]
    lenient: bool,
    /// Response file (`.args`) whose tokens are prepended to the explicit ones.
    #[arg(long)]
    args_file: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Tokens to bind, after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Grammar(args) => run_grammar(args),
        Command::Bind(args) => run_bind(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn load(path: &Path) -> Result<SchemaPackage, String> {
    let package = load_package(path).map_err(|e| e.to_string())?;
    info!(
        path = %path.display(),
        schemas = package.schema_count(),
        "Loaded schema package"
    );
    Ok(package)
}

fn program_name(package: &SchemaPackage) -> String {
    package
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let package = load(&args.schemas)?;
    let count = package.schema_count();
    let binder = ArgumentBinder::builder()
        .schemas(package.schemas)
        .build()
        .map_err(|e| e.to_string())?;
    println!(
        "Validated {count} schema(s) with {} argument(s).",
        binder.grammar().len()
    );
    Ok(())
}

fn run_grammar(args: GrammarArgs) -> Result<(), String> {
    let package = load(&args.schemas)?;
    let binder = ArgumentBinder::builder()
        .program(&program_name(&package))
        .schemas(package.schemas)
        .build()
        .map_err(|e| e.to_string())?;
    let rendered = format_grammar(&binder, args.format)?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn run_bind(args: BindArgs) -> Result<(), String> {
    let package = load(&args.schemas)?;
    let mut builder = ArgumentBinder::builder()
        .program(&program_name(&package))
        .schemas(package.schemas)
        .lenient(args.lenient)
        .look_for_args_file(args.args_file.is_some());
    if let Some(path) = &args.args_file {
        builder = builder.entry_point(path);
    }
    let binder = builder.build().map_err(|e| e.to_string())?;

    let result = match (&args.json, &args.yaml) {
        (Some(path), _) => binder.bind_json_file(path),
        (None, Some(path)) => binder.bind_yaml_file(path),
        (None, None) => binder.bind_args(args.tokens),
    };

    let binding = match result {
        Ok(binding) => binding,
        Err(BindError::HelpRequested(usage)) => {
            print!("{usage}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    let rendered = format_binding(&binding, args.format)?;
    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
