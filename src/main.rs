use std::path::PathBuf;

use clap::{Parser, Subcommand};
use resolute::{
    DictionariesOptions, OutputFormat, PlanOptions, ResolutionError, ResolveOptions,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "resolute")]
#[command(version)]
#[command(
    about = "Resolve resource assignments from dictionary-defined sources",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request against a resource dictionary
    #[clap(visible_alias = "r")]
    Resolve {
        /// Request file with assignments and inputs (YAML or JSON)
        #[arg(short, long)]
        request: PathBuf,
        /// Resource dictionary file
        #[arg(short, long)]
        dictionaries: PathBuf,
        /// Engine configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// SQL fixtures file backing the db source
        #[arg(short, long)]
        fixtures: Option<PathBuf>,
        /// Extra caller input as key=value (repeatable, overrides the request file)
        #[arg(short, long = "input", value_name = "KEY=VALUE")]
        input: Vec<String>,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Preview the batch plan without resolving
    #[clap(visible_alias = "p")]
    Plan {
        /// Request file with assignments and inputs (YAML or JSON)
        #[arg(short, long)]
        request: PathBuf,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Inspect a resource dictionary file
    #[clap(visible_alias = "dict")]
    Dictionaries {
        /// Resource dictionary file
        #[arg(short, long)]
        dictionaries: PathBuf,
        /// Show this entry in full as YAML
        #[arg(long)]
        name: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RESOLUTE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: Result<i32, ResolutionError> = match cli.command {
        Commands::Resolve { request, dictionaries, config, fixtures, input, format } => {
            OutputFormat::parse(&format)
                .and_then(|format| {
                    resolute::resolve(ResolveOptions {
                        request,
                        dictionaries,
                        config,
                        fixtures,
                        inputs: input,
                        format,
                    })
                })
                .map(|outcome| if outcome.failed() { 1 } else { 0 })
        }
        Commands::Plan { request, format } => OutputFormat::parse(&format)
            .and_then(|format| resolute::plan(PlanOptions { request, format }))
            .map(|_| 0),
        Commands::Dictionaries { dictionaries, name } => {
            resolute::dictionaries(DictionariesOptions { dictionaries, name }).map(|_| 0)
        }
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
