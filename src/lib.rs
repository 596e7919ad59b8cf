//! # brain-teaser
//!
//! A timed brain-teaser quiz for the terminal with a shared leaderboard.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use brain_teaser::{Game, GameConfig, GameError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GameError> {
//!     // Puzzles, timer and leaderboard come from the configuration
//!     let game = Game::from_config(&GameConfig::load())?;
//!
//!     // Take over the terminal until the player quits
//!     game.run().await
//! }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod engine;
pub mod leaderboard;
pub mod models;
pub mod protocol;
pub mod terminal;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::info;

pub use app::{App, AppEvent};
pub use config::GameConfig;
pub use data::{LoadError, load_catalog_from_json};
pub use engine::{Effect, Phase, Rules, RulesError, Session};
pub use leaderboard::{LeaderboardGateway, MemoryLeaderboard, RemoteLeaderboard};
pub use models::{Catalog, Puzzle};

use terminal::TerminalSession;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Error type for running the game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to load puzzles: {0}")]
    Load(#[from] LoadError),
    #[error("invalid rules: {0}")]
    Rules(#[from] RulesError),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

/// A game instance that can be run in the terminal.
pub struct Game {
    app: App,
    events: mpsc::UnboundedReceiver<AppEvent>,
}

impl Game {
    pub fn new(
        catalog: Catalog,
        rules: Rules,
        gateway: Arc<dyn LeaderboardGateway>,
        leaderboard_limit: usize,
    ) -> Result<Self, GameError> {
        rules.validate(catalog.len())?;
        let session = Session::new(Arc::new(catalog), rules);
        let (app, events) = App::new(session, gateway, leaderboard_limit);
        Ok(Self { app, events })
    }

    /// Build a game from configuration.
    ///
    /// Scores go to the hosted leaderboard when `leaderboard_url` is set and
    /// stay in memory for this process otherwise.
    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        let catalog = load_catalog_from_json(&config.puzzles_path)?;
        let gateway: Arc<dyn LeaderboardGateway> = match &config.leaderboard_url {
            Some(url) => {
                info!(%url, "using hosted leaderboard");
                Arc::new(RemoteLeaderboard::new(url.clone(), config.request_timeout()))
            }
            None => {
                info!("no leaderboard configured; scores are kept for this session only");
                Arc::new(MemoryLeaderboard::new())
            }
        };
        Self::new(
            catalog,
            config.rules(),
            gateway,
            config.leaderboard_limit,
        )
    }

    /// Run the game in the terminal.
    ///
    /// This takes over the terminal and returns when the player quits.
    pub async fn run(mut self) -> Result<(), GameError> {
        let mut term = TerminalSession::enter()?;
        run_event_loop(&mut term, &mut self.app, &mut self.events).await
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

async fn run_event_loop(
    terminal: &mut TerminalSession,
    app: &mut App,
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<(), GameError> {
    let mut input = EventStream::new();
    let mut ticker = new_ticker();

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;
        if app.should_quit() {
            break;
        }

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let effects = handle_input(app, key);
                    // Each question gets whole seconds from the moment it appears.
                    if effects.iter().any(|e| matches!(e, Effect::QuestionStarted { .. })) {
                        ticker = new_ticker();
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            _ = ticker.tick() => {
                app.tick();
            }
            Some(event) = events.recv() => app.handle_event(event),
        }
    }

    Ok(())
}

fn new_ticker() -> Interval {
    let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Apply a key press, returning the session effects it produced.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Vec::new();
    }

    match app.overlay() {
        app::Overlay::SaveScore(_) => {
            handle_save_score_input(app, key.code);
            return Vec::new();
        }
        app::Overlay::Leaderboard(_) => {
            handle_leaderboard_input(app, key.code);
            return Vec::new();
        }
        app::Overlay::None => {}
    }

    match app.session().phase() {
        Phase::Welcome => handle_welcome_input(app, key.code),
        Phase::Playing => handle_playing_input(app, key.code),
        Phase::Victory => handle_victory_input(app, key.code),
    }
}

fn handle_welcome_input(app: &mut App, key: KeyCode) -> Vec<Effect> {
    match key {
        KeyCode::Enter => app.start(),
        KeyCode::Char('l') | KeyCode::Char('L') => {
            app.open_leaderboard();
            Vec::new()
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.quit();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_playing_input(app: &mut App, key: KeyCode) -> Vec<Effect> {
    let option_count = app
        .session()
        .current_puzzle()
        .map_or(0, |puzzle| puzzle.options.len());

    match key {
        KeyCode::Esc => app.play_again(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if app.session().awaiting_advance() {
                app.advance_level()
            } else {
                app.select_highlighted()
            }
        }
        KeyCode::Up => {
            app.highlight_previous();
            Vec::new()
        }
        KeyCode::Down => {
            app.highlight_next();
            Vec::new()
        }
        KeyCode::Char(c) => match option_index(c) {
            Some(index) if index < option_count => app.select_answer(index),
            _ if c == 'k' => {
                app.highlight_previous();
                Vec::new()
            }
            _ if c == 'j' => {
                app.highlight_next();
                Vec::new()
            }
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn handle_victory_input(app: &mut App, key: KeyCode) -> Vec<Effect> {
    match key {
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.open_save_score();
            Vec::new()
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            app.open_leaderboard();
            Vec::new()
        }
        KeyCode::Char('r') | KeyCode::Char('R') => app.play_again(),
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.quit();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_save_score_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter => app.submit_save_form(),
        KeyCode::Backspace => app.save_form_pop(),
        KeyCode::Char(c) => app.save_form_push(c),
        _ => {}
    }
}

fn handle_leaderboard_input(app: &mut App, key: KeyCode) {
    if matches!(
        key,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('l')
    ) {
        app.close_leaderboard();
    }
}

/// Map an answer letter to its option index.
fn option_index(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    c.is_ascii_lowercase().then(|| usize::from(c as u8 - b'a'))
}
