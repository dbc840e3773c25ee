//! Jukebox CLI binary.
//!
//! Talks to an MPD server over TCP or a unix socket.
//!
//! # Commands
//!
//! - `version` - Print the server's protocol version
//! - `add` - Add a URI to the play queue
//! - `idle` - Wait for one round of subsystem changes

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jukebox::{transport, Config, Player, Session, VERSION};
use serde_json::json;

#[derive(Parser)]
#[command(name = "jukebox")]
#[command(version = VERSION)]
#[command(about = "Jukebox - MPD client", long_about = None)]
struct Cli {
    /// MPD host, or absolute path of a unix socket (overrides config/MPD_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// MPD port (overrides config/MPD_PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the protocol version announced by the server
    Version {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a URI to the play queue
    Add {
        /// URI, quoted as MPD expects it
        uri: String,
    },

    /// Wait for changes in the given subsystems (all when omitted)
    Idle {
        /// Subsystems such as player, mixer, playlist
        subsystems: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.connection.host = host;
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let transport = transport::from_config(&config.connection);
        tracing::debug!("using {} transport to {}", transport.kind(), transport.address());
        let stream = transport.connect().await?;
        let session = Session::connect(stream).await?;

        match cli.command {
            Commands::Version { json } => cmd_version(&session, json),
            Commands::Add { uri } => cmd_add(&session, &uri).await,
            Commands::Idle { subsystems, json } => cmd_idle(&session, &subsystems, json).await,
        }
    })
}

fn cmd_version(session: &Session, json: bool) -> anyhow::Result<()> {
    let version = session.version().unwrap_or_default();
    if json {
        println!("{}", json!({ "version": version }));
    } else {
        println!("connected to mpd version {version:?}");
    }
    Ok(())
}

async fn cmd_add(player: &impl Player, uri: &str) -> anyhow::Result<()> {
    player.add(uri).await?;
    println!("added {uri}");
    Ok(())
}

async fn cmd_idle(session: &Session, subsystems: &[String], json: bool) -> anyhow::Result<()> {
    let mut events = session
        .take_events()
        .ok_or_else(|| anyhow::anyhow!("idle events already taken"))?;

    let names: Vec<&str> = subsystems.iter().map(String::as_str).collect();
    session.idle(&names).await?;

    let event = events.recv().await.unwrap_or_default();
    if json {
        println!("{}", json!({ "changed": event.subsystems }));
    } else {
        for system in &event.subsystems {
            println!("changed: {system}");
        }
    }
    Ok(())
}
