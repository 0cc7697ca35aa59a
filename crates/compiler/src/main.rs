//! Marn front-end CLI
//!
//! Parses .marn files and reports every diagnostic found in one pass.

use clap::{CommandFactory, Parser as ClapParser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use marnc::{Diagnostics, FrontendConfig, Token};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;

#[derive(ClapParser)]
#[command(name = "marnc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Marn front end - lex and parse .marn programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a .marn file and print the resulting tree
    Parse {
        /// Input .marn source file
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Path to front-end configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the token stream of a .marn file
    Tokens {
        /// Input .marn source file
        input: PathBuf,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Normalized source text
    Text,
    /// The tree and diagnostics as JSON
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    ast: &'a marnc::Ast,
    diagnostics: &'a Diagnostics,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                "marnc=info"
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            input,
            format,
            config,
        } => {
            run_parse(&input, format, config.as_deref());
        }
        Commands::Tokens { input } => {
            run_tokens(&input);
        }
        Commands::Completions { shell } => {
            run_completions(shell);
        }
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "marnc", &mut io::stdout());
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn run_parse(input: &Path, format: Format, config_path: Option<&Path>) {
    let config = match config_path {
        Some(path) => match FrontendConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => FrontendConfig::default(),
    };

    let source = match read_source(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    info!("Parsing {}", input.display());
    let mut errors = Diagnostics::new();
    let ast = marnc::parse_source_with_config(source.chars(), &mut errors, config);

    match format {
        Format::Text => print!("{}", ast),
        Format::Json => {
            let report = JsonReport {
                ast: &ast,
                diagnostics: &errors,
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: failed to serialize output: {}", e);
                    process::exit(1);
                }
            }
        }
    }

    report_diagnostics(input, &errors);
    if errors.has_errors() {
        process::exit(1);
    }
}

fn run_tokens(input: &Path) {
    let source = match read_source(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut errors = Diagnostics::new();
    let tokens: Vec<Token> = marnc::tokenize(source.chars(), &mut errors).collect();
    debug!(count = tokens.len(), "tokenized");
    for token in &tokens {
        println!("{}\t{:?}\t{}", token.position, token.kind, token);
    }

    report_diagnostics(input, &errors);
    if errors.has_errors() {
        process::exit(1);
    }
}

/// Print diagnostics as `file:line:col: severity: message`
fn report_diagnostics(input: &Path, errors: &Diagnostics) {
    for diagnostic in errors {
        eprintln!("{}:{}", input.display(), diagnostic);
    }
    if !errors.is_empty() {
        eprintln!(
            "{}: {} error(s), {} warning(s)",
            input.display(),
            errors.error_count(),
            errors.len() - errors.error_count()
        );
    }
}
