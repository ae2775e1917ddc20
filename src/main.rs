//! Terminal arcade runner (default binary).
//!
//! Picks a game (or shows the chooser), then drives the frame loop:
//! render, controller tick, pace.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use tui_arcade::config::{ArcadeConfig, Overrides};
use tui_arcade::engine::{EngineConfig, Play, Screen};
use tui_arcade::games::{self, Arcade};
use tui_arcade::input::TerminalInput;
use tui_arcade::term::TerminalRenderer;

const LOG_FILE: &str = "tui-arcade.log";

#[derive(Parser, Debug)]
#[command(name = "tui-arcade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Play the game whose name contains this (case-insensitive)
    game: Option<String>,

    /// Frame rate cap
    #[arg(long, env = "ARCADE_FPS")]
    fps: Option<u32>,

    /// Show object counts and other internals on the status line
    #[arg(long)]
    debug: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "ARCADE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

fn init_logging() {
    // Logging goes to a file so it never lands on the grid.
    let Ok(log_file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_FILE)
    else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    log::info!("starting tui-arcade v{}", env!("CARGO_PKG_VERSION"));

    let config = ArcadeConfig::load(cli.config.as_deref()).engine_config(Overrides {
        fps: cli.fps,
        debug: cli.debug,
    });
    let mut game = pick(cli.game.as_deref(), &config)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(game.as_mut(), &config);

    // Always try to restore terminal state.
    let _ = TerminalRenderer::new().exit();
    log::info!("bye");
    result
}

/// A single match plays directly; otherwise the chooser lists the matches.
fn pick(filter: Option<&str>, config: &EngineConfig) -> Result<Box<dyn Play>> {
    let mut titles = games::find(filter.unwrap_or(""));
    if titles.is_empty() {
        log::warn!("no game matches {filter:?}, showing them all");
        titles = games::titles();
    }
    if titles.len() == 1 {
        let title = titles[0];
        log::info!("launching {}", title.name);
        return (title.launch)(config).with_context(|| format!("cannot start {}", title.name));
    }
    Ok(Box::new(Arcade::new(titles, config)?))
}

fn run(game: &mut dyn Play, config: &EngineConfig) -> Result<()> {
    let mut screen = Screen::new(
        Box::new(TerminalRenderer::new()),
        Box::new(TerminalInput::new()),
        config,
    )?;

    loop {
        let frame_started = Instant::now();
        screen.render()?;
        game.tick(&mut screen);
        if game.is_done() || screen.interrupted() {
            return Ok(());
        }
        screen.pace(frame_started);
    }
}
