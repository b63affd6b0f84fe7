use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memento::config::MemoryConfig;
use memento::store::MemoryStore;

#[derive(Parser)]
#[command(name = "memento")]
#[command(about = "Local file-backed memory for AI coding agents")]
struct Cli {
    /// Memory root directory (defaults to the platform data directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server via stdio (for Claude Code integration)
    Mcp,
    /// Report what the store currently holds
    Status,
    /// Export all memory as one encrypted container
    Export {
        /// Include per-project credential records
        #[arg(long)]
        credentials: bool,
        /// Passphrase making the container portable to another machine
        #[arg(long)]
        passphrase: Option<String>,
        /// Write the container here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a container produced by export
    Import {
        /// Path to the container file
        file: PathBuf,
        /// Passphrase the container was exported with, if any
        #[arg(long)]
        passphrase: Option<String>,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "memento=info".into()),
    );

    if use_stderr {
        // MCP mode: log to stderr so stdout is clean for protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // MCP mode needs stderr for logging since stdout is the protocol channel
    let use_stderr = matches!(cli.command, None | Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = match cli.root {
        Some(root) => MemoryConfig::new(root),
        None => MemoryConfig::default_root()?,
    };
    let store = MemoryStore::new(config);

    match cli.command {
        None | Some(Commands::Mcp) => {
            memento::mcp::run_stdio_server(store).await?;
        }
        Some(Commands::Status) => {
            let status = store.status()?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Some(Commands::Export {
            credentials,
            passphrase,
            output,
        }) => {
            let container = store.export_memory(credentials, passphrase.as_deref())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, container)?;
                    eprintln!("Container written to {}", path.display());
                }
                None => println!("{}", container),
            }
        }
        Some(Commands::Import { file, passphrase }) => {
            let container = std::fs::read_to_string(&file)?;
            let summary = store.import_memory(&container, passphrase.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
