//! meshx Daemon Binary
//!
//! Follows a consensus node and renders block explorer pages.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use meshx_daemon::config::Config;
use meshx_daemon::render::{BlockRenderer, FileTemplate, HtmlTemplate, PageTemplate};
use meshx_daemon::scheduler::CatchUpScheduler;
use meshx_daemon::store::PageStore;
use meshx_rpc::RpcClient;

#[derive(Parser)]
#[command(name = "meshx-daemon")]
#[command(about = "Block explorer daemon: follows a node and renders linked block pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start ingesting and serving pages
    Start {
        /// Node RPC address (host:port or URL)
        #[arg(long)]
        rpc_url: Option<String>,

        /// Directory rendered pages are written to
        #[arg(long)]
        render_dir: Option<PathBuf>,

        /// Address the page server listens on
        #[arg(long)]
        listen: Option<SocketAddr>,

        /// Don't start the page server
        #[arg(long)]
        no_http: bool,

        /// HTML template file used instead of the built-in layout
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Write a default configuration file
    Init,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Init => init_config(&config_path),
        Commands::Start { rpc_url, render_dir, listen, no_http, template } => {
            let mut config = Config::load(&config_path)?;

            // Override config with CLI flags
            if let Some(url) = rpc_url {
                config.rpc.url = url;
            }
            if let Some(dir) = render_dir {
                config.render.dir = dir;
            }
            if let Some(addr) = listen {
                config.http.listen = addr;
            }
            if no_http {
                config.http.enabled = false;
            }
            if let Some(path) = template {
                config.render.template = Some(path);
            }
            config.validate()?;

            run_daemon(config).await
        }
    }
}

fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save(path)?;
    println!("Created config at {}", path.display());
    Ok(())
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting meshx daemon, node at {}", config.rpc.url);

    let store = PageStore::open(&config.render.dir)?;
    let (floor, checkpoint) = store.resume_point(config.render.start_height)?;

    let template: Box<dyn PageTemplate> = match &config.render.template {
        Some(path) => {
            tracing::info!("Using page template {}", path.display());
            Box::new(FileTemplate::load(path)?)
        }
        None => Box::new(HtmlTemplate),
    };

    let source = Arc::new(RpcClient::new(&config.rpc)?);
    let (queue_tx, queue_rx) = mpsc::channel(config.render.queue_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = CatchUpScheduler::new(
        Arc::clone(&source),
        queue_tx,
        floor,
        config.render.poll_interval(),
    );
    let renderer = BlockRenderer::new(
        source,
        template,
        store,
        queue_rx,
        config.retry.clone(),
    )
    .with_previous(checkpoint);

    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx.clone()));
    let renderer_handle = tokio::spawn(renderer.run(shutdown_rx.clone()));

    let http_handle = if config.http.enabled {
        let render_dir = config.render.dir.clone();
        let addr = config.http.listen;
        let shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = meshx_daemon::http::run_server(render_dir, addr, shutdown).await {
                tracing::error!("HTTP server error: {}", e);
            }
        }))
    } else {
        None
    };

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    let _ = shutdown_tx.send(true);

    if let Err(e) = scheduler_handle.await? {
        tracing::error!("Scheduler stopped with error: {}", e);
    }
    if let Err(e) = renderer_handle.await? {
        tracing::error!("Renderer stopped with error: {}", e);
    }
    if let Some(handle) = http_handle {
        handle.await?;
    }

    Ok(())
}
