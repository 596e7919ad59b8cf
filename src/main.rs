use std::fs::File;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use brain_teaser::leaderboard::{MemoryLeaderboard, server};
use brain_teaser::protocol::DEFAULT_PORT;
use brain_teaser::{Game, GameConfig};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in this terminal (the default)
    Play {
        /// JSON file to load the puzzles from
        #[arg(short, long)]
        puzzles: Option<PathBuf>,
        /// WebSocket URL of a leaderboard host, e.g. ws://127.0.0.1:8713
        #[arg(short, long)]
        leaderboard: Option<String>,
        /// Write logs to this file; the terminal is busy drawing the game
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Host the shared leaderboard
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Play {
        puzzles: None,
        leaderboard: None,
        log_file: None,
    }) {
        Command::Play {
            puzzles,
            leaderboard,
            log_file,
        } => {
            if let Some(path) = log_file {
                let file = File::create(&path)
                    .with_context(|| format!("failed to create log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter())
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }

            let mut config = GameConfig::load();
            if let Some(puzzles) = puzzles {
                config.puzzles_path = puzzles;
            }
            if leaderboard.is_some() {
                config.leaderboard_url = leaderboard;
            }

            let game = Game::from_config(&config).context("failed to set up the game")?;
            game.run().await?;
        }
        Command::Serve { port } => {
            fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();

            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            server::serve(listener, MemoryLeaderboard::new()).await?;
        }
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
