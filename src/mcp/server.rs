//! # JSON-RPC Server
//!
//! HTTP JSON-RPC surface over [`ThreadSafeGameState`].
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `status` | none | [`ServerStatus`] |
//! | `start_game` | [`RestartRequest`] object, or none | [`ActionResponse`] |
//! | `perform_action` / `action` | `{"action": "w"}` or `["w"]` | [`ActionResponse`] |
//! | `game_state` | none | [`GameStateSnapshot`] |
//! | `observation` | none | [`Observation`] |
//!
//! Requests run on the server's own threads and only ever queue tokens, so a slow
//! client can not stall the turn loop.

use crate::{
    ActionResponse, ActionToken, GameStateSnapshot, Observation, RestartRequest, ServerStatus,
    ThreadSafeGameState, TombsError, TombsResult,
};
use jsonrpc_core::{Error, ErrorCode, IoHandler, Params, Result, Value};
use jsonrpc_derive::rpc;
use jsonrpc_http_server::{Server, ServerBuilder};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;

const NO_SESSION: i64 = -32001;

#[rpc(server)]
pub trait GameRpc {
    #[rpc(name = "status")]
    fn status(&self) -> Result<ServerStatus>;

    #[rpc(name = "start_game", params = "raw")]
    fn start_game(&self, params: Params) -> Result<ActionResponse>;

    #[rpc(name = "perform_action", alias("action"), params = "raw")]
    fn perform_action(&self, params: Params) -> Result<ActionResponse>;

    #[rpc(name = "game_state")]
    fn game_state(&self) -> Result<GameStateSnapshot>;

    #[rpc(name = "observation")]
    fn observation(&self) -> Result<Observation>;
}

/// Handlers backed by the shared session.
pub struct GameRpcImpl {
    state: Arc<ThreadSafeGameState>,
}

impl GameRpcImpl {
    pub fn new(state: Arc<ThreadSafeGameState>) -> Self {
        Self { state }
    }
}

fn no_session() -> Error {
    Error {
        code: ErrorCode::ServerError(NO_SESSION),
        message: "No active game session".to_string(),
        data: None,
    }
}

fn internal(e: TombsError) -> Error {
    let mut error = Error::internal_error();
    error.data = Some(Value::String(e.to_string()));
    error
}

/// Pulls the action token out of `{"action": ...}` or `[...]`.
fn parse_action(params: Params) -> Result<ActionToken> {
    let raw = match params {
        Params::Array(values) => values.into_iter().next(),
        Params::Map(mut map) => map.remove("action"),
        Params::None => None,
    };
    let Some(Value::String(text)) = raw else {
        return Err(Error::invalid_params("expected an 'action' string"));
    };
    text.parse::<ActionToken>()
        .map_err(|e| Error::invalid_params(e.to_string()))
}

impl GameRpc for GameRpcImpl {
    fn status(&self) -> Result<ServerStatus> {
        Ok(self.state.status())
    }

    fn start_game(&self, params: Params) -> Result<ActionResponse> {
        let request: RestartRequest = match params {
            Params::None => RestartRequest::default(),
            other => other.parse()?,
        };
        let config = request
            .into_config(&self.state.menu_options())
            .map_err(|e| Error::invalid_params(e.to_string()))?;
        self.state
            .submit(ActionToken::Restart(config))
            .map_err(internal)
    }

    fn perform_action(&self, params: Params) -> Result<ActionResponse> {
        let token = parse_action(params)?;
        if self.state.snapshot().is_none() {
            return Err(no_session());
        }
        self.state.submit(token).map_err(internal)
    }

    fn game_state(&self) -> Result<GameStateSnapshot> {
        self.state.snapshot().ok_or_else(no_session)
    }

    fn observation(&self) -> Result<Observation> {
        self.state.observation().ok_or_else(no_session)
    }
}

/// Builds the method table.
pub fn build_io_handler(state: Arc<ThreadSafeGameState>) -> IoHandler {
    let mut io = IoHandler::new();
    io.extend_with(GameRpcImpl::new(state).to_delegate());
    io
}

/// Starts listening. The server stops when the returned handle is dropped.
pub fn start_server(state: Arc<ThreadSafeGameState>, host: &str, port: u16) -> TombsResult<Server> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| TombsError::Server(format!("bad address {}:{}: {}", host, port, e)))?;
    let server = ServerBuilder::new(build_io_handler(state))
        .threads(2)
        .start_http(&addr)
        .map_err(|e| TombsError::Server(format!("could not bind {}: {}", addr, e)))?;
    info!("JSON-RPC server listening on http://{}", addr);
    Ok(server)
}
