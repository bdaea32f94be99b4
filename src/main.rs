//! NiceGUI Language Server executable
//!
//! # Usage
//!
//! ```bash
//! # Language server over stdio (default)
//! nicegui-lsp
//!
//! # Completions at a position, without type analysis
//! nicegui-lsp complete app.py --line 12 --column 30
//!
//! # Show the cursor context
//! nicegui-lsp context app.py --line 12 --column 30
//!
//! # Companion .vue/.js/.py file
//! nicegui-lsp companion chart.py
//! ```

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use nicegui_lsp::engine::config::CONFIG_FILES;
use nicegui_lsp::kb::{self, KnowledgeBase};
use nicegui_lsp::navigation::find_companion;
use nicegui_lsp::preview::{html_shell, validate_url};
use nicegui_lsp::{Engine, EngineConfig, LspServer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "nicegui-lsp")]
#[command(about = "Language server for NiceGUI element props, classes, style, events and icons")]
#[command(version)]
struct Cli {
    /// Knowledge base assets directory
    #[arg(long, env = "NICEGUI_LSP_ASSETS")]
    assets: Option<PathBuf>,

    /// Configuration file (defaults to one found in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, short, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the language server over stdio
    Serve,

    /// Get completions at position
    Complete {
        /// Python source file
        file: PathBuf,

        /// Line number (1-based)
        #[arg(long, short)]
        line: u32,

        /// Column number (1-based)
        #[arg(long, short)]
        column: u32,

        /// Maximum completions to print
        #[arg(long, default_value = "50")]
        max: usize,
    },

    /// Show the cursor context at position
    Context {
        file: PathBuf,

        #[arg(long, short)]
        line: u32,

        #[arg(long, short)]
        column: u32,
    },

    /// Show hover documentation at position
    Hover {
        file: PathBuf,

        #[arg(long, short)]
        line: u32,

        #[arg(long, short)]
        column: u32,
    },

    /// Find the companion script/component file
    Companion { file: PathBuf },

    /// Print the preview page for a URL
    Preview {
        /// Defaults to the configured preview URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Show knowledge base statistics
    Stats,
}

fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => {
            let cwd = std::env::current_dir()?;
            let found = CONFIG_FILES.iter().any(|name| cwd.join(name).exists());
            Ok(if found {
                EngineConfig::load_default(&cwd)
            } else {
                EngineConfig::default()
            })
        }
    }
}

fn load_knowledge_base(assets: Option<&Path>, config: &EngineConfig) -> KnowledgeBase {
    let cwd = std::env::current_dir().ok();
    let dir = match assets {
        Some(dir) => Some(dir.to_path_buf()),
        None => kb::find_assets_dir(&config.assets.search_paths, cwd.as_deref()),
    };
    match dir {
        Some(dir) => kb::load_dir(&dir),
        None => {
            tracing::warn!("No knowledge base assets found");
            KnowledgeBase::default()
        }
    }
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.engine.log_level);

    let command = cli.command.unwrap_or(Commands::Serve);
    if let Commands::Serve = command {
        tracing::info!("Starting NiceGUI Language Server");
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let (service, socket) = LspService::new(|client| LspServer::with_config(client, config));
        Server::new(stdin, stdout, socket).serve(service).await;
        return Ok(());
    }

    let engine = Engine::new(Arc::new(load_knowledge_base(cli.assets.as_deref(), &config)))
        .with_lookback(config.completion.lookback_chars);

    match command {
        Commands::Serve => {}
        Commands::Complete {
            file,
            line,
            column,
            max,
        } => {
            let source = read_source(&file)?;
            let mut items = engine.complete(&source, Engine::offset_at(&source, line, column));
            items.truncate(max);

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
                OutputFormat::Text => {
                    if items.is_empty() {
                        println!("No completions found");
                    } else {
                        println!("Completions ({}):", items.len());
                        for item in &items {
                            let kind = item.kind.map(|k| format!("{:?}", k)).unwrap_or_default();
                            let description = item.description.as_deref().unwrap_or("");
                            println!("  {:30} {:10} {}", item.label, kind, description);
                        }
                    }
                }
            }
        }
        Commands::Context { file, line, column } => {
            let source = read_source(&file)?;
            let ctx = engine.context(&source, Engine::offset_at(&source, line, column));

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx)?),
                OutputFormat::Text => match ctx {
                    None => println!("No completion context"),
                    Some(ctx) => {
                        println!("Kind:     {}", ctx.kind);
                        println!("Method:   {}", ctx.method.as_deref().unwrap_or("-"));
                        println!("Word:     {:?}", ctx.word);
                        println!("Surround: {:?}", ctx.surround);
                        println!("Match at: {}", ctx.match_start);
                    }
                },
            }
        }
        Commands::Hover { file, line, column } => {
            let source = read_source(&file)?;
            let info = engine.hover(&source, Engine::offset_at(&source, line, column));

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
                OutputFormat::Text => match info {
                    Some(info) => println!("{}", info.contents),
                    None => println!("No hover information"),
                },
            }
        }
        Commands::Companion { file } => {
            let target = find_companion(&file)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "companion": target.display().to_string() }))
                }
                OutputFormat::Text => println!("{}", target.display()),
            }
        }
        Commands::Preview { url } => {
            let url = validate_url(url.as_deref().unwrap_or(&config.preview.url))?;
            println!("{}", html_shell(&url));
        }
        Commands::Stats => {
            let stats = engine.knowledge_base().stats();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                OutputFormat::Text => {
                    println!("Knowledge base:");
                    println!("  Components:      {}", stats.components);
                    println!("  Icons:           {}", stats.icons);
                    println!("  Utility classes: {}", stats.utility_classes);
                    println!("  UI functions:    {}", stats.ui_functions);
                    println!("  Mapped classes:  {}", stats.mapped_classes);
                }
            }
        }
    }

    Ok(())
}
