//! funcport CLI - export notebooks as serverless functions.

mod code;
mod colors;
mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use funcport_export::ExportConfig;

#[derive(Parser)]
#[command(name = "funcport")]
#[command(about = "Export Jupyter notebooks as serverless functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a notebook as a function descriptor
    Export {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        /// Output path for the descriptor (default: notebook path with .yaml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the descriptor instead of writing it
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Function name (default: notebook file name)
        #[arg(long)]
        name: Option<String>,

        /// Write the function source here instead of embedding it
        #[arg(long)]
        target_path: Option<PathBuf>,

        /// Handler function name
        #[arg(long)]
        handler_name: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the code extracted from a notebook
    Code {
        /// Path to the notebook (.ipynb file)
        notebook: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Options shared by every command that extracts code.
#[derive(Args)]
struct SourceArgs {
    /// Use this file as the function source instead of the notebook
    #[arg(long)]
    handler_path: Option<PathBuf>,

    /// Directive namespace keyword (repeatable; default: mlrun, nuclio)
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,
}

impl SourceArgs {
    /// Environment overrides, with command-line flags taking precedence.
    fn config(self) -> ExportConfig {
        let mut config = ExportConfig::from_env();
        if let Some(path) = self.handler_path {
            config = config.with_handler_path(path);
        }
        if !self.keywords.is_empty() {
            config = config.with_keywords(self.keywords);
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Export {
            notebook,
            output,
            stdout,
            name,
            target_path,
            handler_name,
            source,
        } => {
            let mut config = source.config();
            if let Some(name) = handler_name {
                config = config.with_handler_name(name);
            }
            if let Some(path) = target_path {
                config = config.with_code_target_path(path);
            }
            if let Some(name) = name {
                config = config.with_name(name);
            }
            export::execute(&notebook, output.as_deref(), stdout, config)?;
        }

        Commands::Code { notebook, source } => {
            code::execute(&notebook, &source.config())?;
        }
    }

    Ok(())
}
