//! # MCP Integration
//!
//! The bridge between the turn-processing loop and remote clients.
//!
//! [`ThreadSafeGameState`] keeps the [`GameSession`] behind one lock. Remote
//! requests never touch it directly: they push [`ActionToken`]s onto an unbounded
//! queue which the turn loop drains one token per tick, through the same key
//! dispatch local input uses. Snapshots are built while holding the lock, so a
//! reader never sees half a turn.

pub mod observation;
#[cfg(feature = "mcp-server")]
pub mod server;

pub use observation::*;
#[cfg(feature = "mcp-server")]
pub use server::*;

use crate::config::{ACTION_ACK_TIMEOUT_MS, ACTION_POLL_INTERVAL_MS};
use crate::{
    action_for_key, Action, ActionToken, Engine, EventHandler, FovMode, GameSession,
    GenerationConfig, HandlerOutcome, Key, MapSource, MenuOptions, Position, SessionConfig,
    StairsRule, TombsError, TombsResult,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Gameplay tokens that would not fail if sent right now.
///
/// Pure: each candidate is checked with the same `validate` its action runs before
/// performing. Wait is always present.
pub fn compute_legal_actions(engine: &Engine) -> Vec<ActionToken> {
    ActionToken::gameplay()
        .into_iter()
        .filter(|token| {
            token
                .key()
                .and_then(|key| action_for_key(engine, key))
                .is_some_and(|action| action.validate(engine).is_ok())
        })
        .collect()
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    PlayerDied,
    MapCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub power: i32,
}

/// Point-in-time view of a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub generation: u64,
    pub handler: EventHandler,
    pub floor: u32,
    pub step: u64,
    pub floor_step: u64,
    /// This step's messages, repeats folded into `(xN)`
    pub messages: Vec<String>,
    pub standing_on: String,
    pub player: Option<PlayerStatus>,
    pub health_potions: usize,
    pub stairs: Option<Position>,
    pub game_over: bool,
    pub game_done: bool,
    pub end_reason: Option<EndReason>,
    pub legal_actions: Vec<String>,
}

impl GameStateSnapshot {
    /// Reads the session; `None` when no game is running.
    pub fn capture(session: &GameSession) -> Option<Self> {
        let engine = session.engine.as_ref()?;
        let player = engine.player().map(|player| {
            let (hp, max_hp, power) = player
                .fighter
                .as_ref()
                .map_or((0, 0, 0), |f| (f.hp(), f.max_hp, f.power));
            PlayerStatus {
                x: player.position.x,
                y: player.position.y,
                hp,
                max_hp,
                power,
            }
        });
        let game_over = !engine.is_player_alive();
        let end_reason = if engine.game_done {
            Some(EndReason::MapCompleted)
        } else if game_over {
            Some(EndReason::PlayerDied)
        } else {
            None
        };

        Some(Self {
            generation: session.generation,
            handler: session.handler,
            floor: engine.dungeon_level(),
            step: engine.step_counter,
            floor_step: engine.floor_step_counter,
            messages: engine.message_log.step_texts(),
            standing_on: engine.player_tile_description(),
            player,
            health_potions: engine.health_potion_count(),
            stairs: engine.game_map.downstairs_location,
            game_over,
            game_done: engine.game_done,
            end_reason,
            legal_actions: legal_action_names(session),
        })
    }
}

/// Legal tokens as strings, empty unless turns can be taken.
pub fn legal_action_names(session: &GameSession) -> Vec<String> {
    match &session.engine {
        Some(engine) if session.handler == EventHandler::MainGame => compute_legal_actions(engine)
            .iter()
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Reply to a submitted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// True once the turn loop visibly processed the token
    pub acknowledged: bool,
    pub state: Option<GameStateSnapshot>,
    pub last_error: Option<String>,
}

/// Service-level status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub version: String,
    pub session_active: bool,
    pub handler: EventHandler,
    pub generation: u64,
    pub last_error: Option<String>,
}

/// How a remote client asks for a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartMode {
    #[default]
    Procedural,
    FixedMap,
    InlineMap,
}

/// Flat restart parameters; anything left out falls back to the local defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartRequest {
    pub mode: StartMode,
    pub map_path: Option<PathBuf>,
    pub map: Option<String>,
    pub seed: Option<u64>,
    pub max_rooms: Option<u32>,
    pub room_min_size: Option<u32>,
    pub room_max_size: Option<u32>,
    pub map_width: Option<u32>,
    pub map_height: Option<u32>,
    /// `"partial"` or `"all"`
    pub fov_mode: Option<String>,
    pub fov_radius: Option<u32>,
    pub stairs_rule: Option<StairsRule>,
}

impl RestartRequest {
    /// Builds a session config on top of the menu defaults.
    pub fn into_config(self, defaults: &MenuOptions) -> TombsResult<SessionConfig> {
        let base = match self.mode {
            StartMode::Procedural | StartMode::InlineMap => &defaults.new_game,
            StartMode::FixedMap => &defaults.fixed_map,
        };
        let mut config = base.clone();

        config.map_source = match self.mode {
            StartMode::Procedural => {
                let mut generation = match &base.map_source {
                    MapSource::Procedural(generation) => generation.clone(),
                    _ => GenerationConfig::default(),
                };
                generation.max_rooms = self.max_rooms.unwrap_or(generation.max_rooms);
                generation.room_min_size = self.room_min_size.unwrap_or(generation.room_min_size);
                generation.room_max_size = self.room_max_size.unwrap_or(generation.room_max_size);
                generation.map_width = self.map_width.unwrap_or(generation.map_width);
                generation.map_height = self.map_height.unwrap_or(generation.map_height);
                generation.validate()?;
                MapSource::Procedural(generation)
            }
            StartMode::FixedMap => match self.map_path {
                Some(path) => MapSource::FixedMap { path },
                None => base.map_source.clone(),
            },
            StartMode::InlineMap => MapSource::InlineMap {
                map: self.map.ok_or_else(|| {
                    TombsError::InvalidMap("inline_map mode needs a 'map' string".to_string())
                })?,
            },
        };

        let radius = self.fov_radius.unwrap_or(match config.fov_mode {
            FovMode::Partial { radius } => radius,
            FovMode::All => crate::config::DEFAULT_FOV_RADIUS,
        });
        config.fov_mode = match self.fov_mode.as_deref() {
            None => match config.fov_mode {
                FovMode::Partial { .. } => FovMode::Partial { radius },
                FovMode::All => FovMode::All,
            },
            Some("all") => FovMode::All,
            Some("partial") => FovMode::Partial { radius },
            Some(other) => {
                return Err(TombsError::InvalidState(format!(
                    "unknown fov_mode '{}'",
                    other
                )))
            }
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(rule) = self.stairs_rule {
            config.stairs_rule = rule;
        }
        Ok(config)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What changes visibly when a token is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Progress {
    start_attempts: u64,
    generation: u64,
    step: u64,
    floor: u32,
}

impl Progress {
    fn of(session: &GameSession) -> Self {
        let (step, floor) = session
            .engine
            .as_ref()
            .map_or((0, 0), |engine| (engine.step_counter, engine.dungeon_level()));
        Self {
            start_attempts: session.start_attempts,
            generation: session.generation,
            step,
            floor,
        }
    }
}

/// Shared session state plus the remote action queue.
pub struct ThreadSafeGameState {
    session: Mutex<GameSession>,
    sender: UnboundedSender<ActionToken>,
    receiver: Mutex<UnboundedReceiver<ActionToken>>,
}

impl ThreadSafeGameState {
    pub fn new(session: GameSession) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            session: Mutex::new(session),
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Queues a token for the turn loop. Never blocks.
    pub fn queue_action(&self, token: ActionToken) -> TombsResult<()> {
        debug!("Queued remote token {}", token);
        self.sender
            .send(token)
            .map_err(|e| TombsError::Server(format!("action queue closed: {}", e)))
    }

    /// Applies at most one queued token. Called by the turn loop once per tick.
    pub fn process_pending(&self) -> Option<ActionToken> {
        let token = lock(&self.receiver).try_recv().ok()?;
        let mut session = lock(&self.session);
        match &token {
            ActionToken::Restart(config) => {
                if session.try_start(config.clone()) {
                    info!("Remote restart started session {}", session.generation);
                } else {
                    warn!("Remote restart failed; keeping the current session");
                }
            }
            other => match other.key() {
                Some(key) if session.is_playing() => {
                    session.handle_key(key);
                }
                _ => debug!("Ignoring token {} with no game in progress", other),
            },
        }
        Some(token)
    }

    /// Dispatches a local key press.
    pub fn handle_local_key(&self, key: Key) -> HandlerOutcome {
        lock(&self.session).handle_key(key)
    }

    /// Runs `f` with the session locked.
    pub fn with_session<R>(&self, f: impl FnOnce(&GameSession) -> R) -> R {
        f(&*lock(&self.session))
    }

    pub fn snapshot(&self) -> Option<GameStateSnapshot> {
        self.with_session(GameStateSnapshot::capture)
    }

    pub fn observation(&self) -> Option<Observation> {
        self.with_session(Observation::capture)
    }

    pub fn status(&self) -> ServerStatus {
        self.with_session(|session| ServerStatus {
            version: crate::VERSION.to_string(),
            session_active: session.engine.is_some(),
            handler: session.handler,
            generation: session.generation,
            last_error: session.last_error.clone(),
        })
    }

    pub fn menu_options(&self) -> MenuOptions {
        self.with_session(|session| session.menu.clone())
    }

    /// Queues `token` and polls until the turn loop visibly handled it or the
    /// deadline passes. Never blocks the turn loop itself.
    pub fn submit_and_wait(
        &self,
        token: ActionToken,
        timeout: Duration,
        poll_interval: Duration,
    ) -> TombsResult<ActionResponse> {
        let before = self.with_session(Progress::of);
        self.queue_action(token)?;

        let deadline = Instant::now() + timeout;
        let mut acknowledged = false;
        while Instant::now() < deadline {
            std::thread::sleep(poll_interval);
            if self.with_session(Progress::of) != before {
                acknowledged = true;
                break;
            }
        }
        if !acknowledged {
            debug!("No visible change within {:?}", timeout);
        }

        Ok(self.with_session(|session| ActionResponse {
            acknowledged,
            state: GameStateSnapshot::capture(session),
            last_error: session.last_error.clone(),
        }))
    }

    /// [`ThreadSafeGameState::submit_and_wait`] with the default deadline.
    pub fn submit(&self, token: ActionToken) -> TombsResult<ActionResponse> {
        self.submit_and_wait(
            token,
            Duration::from_millis(ACTION_ACK_TIMEOUT_MS),
            Duration::from_millis(ACTION_POLL_INTERVAL_MS),
        )
    }
}
