//! glue CLI - generate C binding glue from WebIDL and binding descriptions

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

mod commands;

use commands::*;

/// glue - WebIDL to C binding generator
#[derive(Parser)]
#[command(name = "glue")]
#[command(about = "Generate JavaScript engine bindings from WebIDL")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate binding code from a binding description
    Generate {
        /// Binding description file
        binding: PathBuf,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Directory searched for WebIDL files (repeatable)
        #[arg(short = 'I', long = "idl-path")]
        idl_paths: Vec<PathBuf>,
        /// Backend to use instead of the binding's type
        #[arg(short, long)]
        backend: Option<String>,
        /// Log the loaded WebIDL tree
        #[arg(long)]
        dump_webidl: bool,
    },

    /// Display the parsed tree of a binding or WebIDL file
    Dump {
        /// Input file (.idl files are read as WebIDL)
        input: PathBuf,
        /// Dump the WebIDL a binding file references instead of the binding itself
        #[arg(long)]
        webidl: bool,
        /// Display format (tree, json)
        #[arg(short, long, default_value = "tree")]
        format: String,
        /// Directory searched for WebIDL files (repeatable)
        #[arg(short = 'I', long = "idl-path")]
        idl_paths: Vec<PathBuf>,
    },

    /// List available backends
    Backends,

    /// Write a configuration file
    InitConfig {
        /// Output file
        #[arg(short, long, default_value = "glue.toml")]
        output: PathBuf,
        /// Preset (jsapi, duktape)
        #[arg(short, long)]
        preset: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let code = run(cli);
    std::process::exit(code);
}

/// Execute a command and map its outcome to the process exit status
fn run(cli: Cli) -> i32 {
    let Cli {
        verbose,
        config,
        command,
    } = cli;

    let result = match command {
        Commands::Generate {
            binding,
            output,
            idl_paths,
            backend,
            dump_webidl,
        } => {
            let options = GenerateOptions {
                config: config.as_deref(),
                idl_paths,
                backend,
                dump_webidl,
                verbose,
            };
            return match generate_command(&binding, output.as_deref(), options) {
                Ok(()) => 0,
                Err(e) => {
                    error!("{}", e);
                    e.exit_code()
                }
            };
        }
        Commands::Dump {
            input,
            webidl,
            format,
            idl_paths,
        } => dump_command(&input, webidl, &format, config.as_deref(), idl_paths),
        Commands::Backends => backends_command(),
        Commands::InitConfig { output, preset } => init_config_command(&output, preset.as_deref()),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("Command failed: {:#}", e);
            1
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // stdout may carry generated code
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    Ok(())
}
