//! Binary entry point for the where-clause explain CLI.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::json;
use sombra_where::{
    config::CompilerConfig,
    cypher::Variable,
    schema::InMemorySchema,
    where_clause::{ExecutionContext, FilterInput, WhereCompiler},
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "sombra-where",
    version,
    about = "Compile a GraphQL filter input into a Cypher predicate"
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "JSON schema document")]
    schema: PathBuf,

    #[arg(long = "type", value_name = "TYPE", help = "Node type the filter applies to")]
    type_name: String,

    #[arg(
        long,
        value_name = "JSON|@FILE",
        help = "Filter object, inline or read from a file with @path"
    )]
    filter: String,

    #[arg(
        long,
        value_name = "FILE",
        env = "SOMBRA_WHERE_CONFIG",
        help = "Compiler configuration (defaults to $CONFIG_DIR/sombra/where.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(long, default_value = "this", help = "Variable bound to the filtered node")]
    var: String,

    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format"
    )]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    install_tracing_subscriber();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn install_tracing_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CompilerConfig::load(cli.config.clone())?;
    let schema = InMemorySchema::load(&cli.schema)?;
    let filter = read_filter(&cli.filter)?;

    let compiler = WhereCompiler::new(&schema, &config);
    let mut ctx = ExecutionContext::new(&config);
    let target = Variable::new(cli.var.as_str());
    let predicate = compiler.compile_for_type(&filter, &target, &cli.type_name, &mut ctx)?;
    let rendered = predicate.as_ref().map(ToString::to_string);
    let params = ctx.into_params();

    match cli.format {
        OutputFormat::Json => {
            let report = json!({
                "predicate": rendered,
                "params": params.to_json(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("{}", rendered.as_deref().unwrap_or("<no constraint>"));
            if !params.is_empty() {
                println!();
                println!("Parameters:");
                for (name, value) in params.iter() {
                    println!("  ${name} = {value}");
                }
            }
        }
    }
    Ok(())
}

fn read_filter(raw: &str) -> Result<FilterInput, Box<dyn Error>> {
    let text = match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("failed to read filter {path}: {err}"))?,
        None => raw.to_owned(),
    };
    match serde_json::from_str(&text)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err("filter must be a JSON object".into()),
    }
}
