//! vgen entry point.
//!
//! ```bash
//! vgen emit --type string 'len(0, 20) && match(`^\w+$`)'
//! vgen decls --json
//! vgen repl
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vgen::config::Config;
use vgen_kernel::ast::sexpr::format_node;
use vgen_types::{Param, parse_type};

#[derive(Parser)]
#[command(name = "vgen")]
#[command(about = "Compile validation rules into Go validator expressions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./vgen.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Declaration file loaded after the built-ins
    #[arg(long, global = true, value_name = "PATH")]
    custom: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one rule for a parameter
    Emit {
        /// Parameter type in Go syntax, such as `[]string` or `type Level int`
        #[arg(short = 't', long = "type", value_name = "TYPE", required_unless_present = "ast")]
        ty: Option<String>,

        /// Parameter name, used by `_`
        #[arg(short, long, default_value = "x")]
        param: String,

        /// Print the parsed rule as an S-expression instead
        #[arg(long)]
        ast: bool,

        /// Rule text
        #[arg(value_name = "RULE")]
        rule: String,
    },

    /// List the loaded validator declarations
    Decls {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compile rules interactively
    Repl,
}

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let compiler = config.compiler(cli.custom.as_deref())?;

    match cli.command {
        Commands::Emit { ty, param, ast, rule } => {
            let result = if ast {
                compiler.parse(&rule).map(|node| format_node(&node))
            } else {
                let Some(ty) = ty else {
                    bail!("--type is required unless --ast is given");
                };
                let ty = parse_type(&ty).with_context(|| format!("bad --type `{ty}`"))?;
                compiler.compile(&rule, &Param::new(param, ty))
            };
            match result {
                Ok(output) => {
                    println!("{output}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{}", err.report(&rule).trim_end());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Decls { json } => {
            if json {
                println!("{}", vgen::decls_json(compiler.registry())?);
            } else {
                println!("{}", vgen::decls_table(compiler.registry()));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Repl => {
            vgen::run(compiler)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
