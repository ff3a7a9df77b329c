//! # Tombs Main Entry Point
//!
//! Parses the command line, starts the JSON-RPC server and runs either the
//! macroquad window or a headless loop that only services remote actions.

use clap::{Parser, ValueEnum};
use log::{error, info};
use macroquad::prelude::next_frame;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tombs::config::{
    DEFAULT_API_HOST, DEFAULT_API_PORT, DEFAULT_FOV_RADIUS, DEFAULT_MAP_FILE, TARGET_FPS,
};
use tombs::{
    poll_keyboard, FovMode, GameSession, GenerationConfig, HandlerOutcome, MacroquadDisplay,
    MapSource, MenuOptions, SessionConfig, StairsRule, ThreadSafeGameState, TombsError,
    TombsResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FovArg {
    Partial,
    All,
}

/// Command line arguments for Tombs.
#[derive(Parser, Debug)]
#[command(name = "tombs")]
#[command(about = "A turn-based tile roguelike you can play or drive over JSON-RPC")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Address the JSON-RPC server binds to
    #[arg(long, env = "API_HOST", default_value = DEFAULT_API_HOST)]
    host: String,

    /// Port the JSON-RPC server listens on
    #[arg(long, env = "API_PORT", default_value_t = DEFAULT_API_PORT)]
    port: u16,

    /// Run without a window; only remote clients can play
    #[arg(long)]
    headless: bool,

    /// Do not start the JSON-RPC server
    #[arg(long)]
    no_server: bool,

    /// Map file used by the "custom map" menu entry
    #[arg(long, default_value = DEFAULT_MAP_FILE)]
    map_file: PathBuf,

    /// Field of view mode
    #[arg(long, value_enum, default_value_t = FovArg::Partial)]
    fov_mode: FovArg,

    /// Sight radius for the partial field of view
    #[arg(long, default_value_t = DEFAULT_FOV_RADIUS)]
    fov_radius: u32,

    /// Allow taking the stairs from an orthogonally adjacent cell
    #[arg(long)]
    adjacent_stairs: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn menu_options(&self) -> MenuOptions {
        let fov_mode = match self.fov_mode {
            FovArg::Partial => FovMode::Partial {
                radius: self.fov_radius,
            },
            FovArg::All => FovMode::All,
        };
        let stairs_rule = if self.adjacent_stairs {
            StairsRule::Adjacent
        } else {
            StairsRule::SameCell
        };
        let base = SessionConfig {
            fov_mode,
            stairs_rule,
            seed: self.seed,
            ..SessionConfig::default()
        };

        let generation = GenerationConfig::new(self.seed.unwrap_or_else(rand::random));
        MenuOptions {
            new_game: SessionConfig {
                map_source: MapSource::Procedural(generation),
                ..base.clone()
            },
            fixed_map: SessionConfig {
                map_source: MapSource::FixedMap {
                    path: self.map_file.clone(),
                },
                ..base
            },
        }
    }
}

fn main() -> TombsResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level)?;

    info!("Starting Tombs v{}", tombs::VERSION);

    let state = Arc::new(ThreadSafeGameState::new(GameSession::new(
        args.menu_options(),
    )));

    #[cfg(feature = "mcp-server")]
    let _server = if args.no_server {
        None
    } else {
        Some(tombs::start_server(Arc::clone(&state), &args.host, args.port)?)
    };
    #[cfg(not(feature = "mcp-server"))]
    if !args.no_server {
        error!("Built without the mcp-server feature; remote control is unavailable");
    }

    if args.headless {
        run_headless(state)
    } else {
        macroquad::Window::from_config(window_conf(), run_window(state));
        info!("Window closed");
        Ok(())
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> TombsResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
            .with_target(false)
            .try_init()
            .map_err(|e| TombsError::InvalidState(format!("logging: {}", e)))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .try_init()
            .map_err(|e| TombsError::InvalidState(format!("logging: {}", e)))?;
    }

    Ok(())
}

fn window_conf() -> macroquad::window::Conf {
    macroquad::window::Conf {
        window_title: "Tombs".to_string(),
        window_width: 1100,
        window_height: 760,
        high_dpi: true,
        ..Default::default()
    }
}

/// Local play: one key and at most one remote token per frame.
async fn run_window(state: Arc<ThreadSafeGameState>) {
    let mut display = MacroquadDisplay::new();
    loop {
        if let Some(key) = poll_keyboard() {
            if state.handle_local_key(key) == HandlerOutcome::Quit {
                info!("Player quit from the main menu");
                break;
            }
        }
        state.process_pending();
        state.with_session(|session| display.render(session));
        next_frame().await;
    }
}

/// Services the remote queue at the fixed tick rate until interrupted.
fn run_headless(state: Arc<ThreadSafeGameState>) -> TombsResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    info!("Running headless at {} ticks per second", TARGET_FPS);

    runtime.block_on(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(1000 / TARGET_FPS));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state.process_pending();
                }
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!("Could not listen for Ctrl-C: {}", e);
                    }
                    info!("Shutting down");
                    break;
                }
            }
        }
    });
    Ok(())
}
