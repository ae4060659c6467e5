//! HTTP routes: thin adapters from requests to [`SessionService`] calls.
//!
//! Every handler follows the same shape:
//!   1. Authenticate the `token` query parameter, if the route needs one
//!   2. Parse the session ID from the path
//!   3. Call the service and serialize its answer as JSON
//!
//! Errors convert into [`GambitError`], which picks the status code.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use gambit_auth::{AuthError, Authenticator, TokenStore};
use gambit_engine::EngineLauncher;
use gambit_protocol::{
    AccessToken, BoardView, CreateResponse, JoinResponse, LoginResponse, MoveResult,
    RemainingView, SessionId, SessionSummary, TurnView,
};
use gambit_rules::ChessRules;
use gambit_session::SessionService;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::GambitError;

/// Shared state handed to every handler.
pub(crate) struct AppState<L: EngineLauncher> {
    pub(crate) service: SessionService<ChessRules, L>,
    pub(crate) tokens: TokenStore,
}

type Shared<L> = State<Arc<AppState<L>>>;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateQuery {
    token: Option<String>,
    /// `enable` requests an automated opponent. Older clients send the
    /// same switch as `stockfish=enable`.
    #[serde(alias = "stockfish")]
    opponent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub(crate) fn router<L: EngineLauncher>(state: Arc<AppState<L>>) -> Router {
    Router::new()
        .route("/login/{id}", get(login::<L>))
        .route("/room/create/{name}", get(create_room::<L>))
        .route("/room/info/{id}", get(room_info::<L>))
        .route("/room/join/{id}", get(join_room::<L>))
        .route("/room/list", get(list_rooms::<L>))
        .route("/game/place/{id}/{move}", get(place::<L>))
        .route("/game/turn/{id}", get(turn::<L>))
        .route("/game/timer/{id}", get(timer::<L>))
        .route("/game/board/{id}", get(board::<L>))
        .route("/game/resign/{id}", get(resign::<L>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves an optional token to `(identity, token)`.
async fn authenticate<L: EngineLauncher>(
    state: &AppState<L>,
    token: Option<String>,
) -> Result<(String, AccessToken), GambitError> {
    let token = AccessToken::new(token.ok_or(AuthError::Unauthorized)?);
    let identity = state.tokens.authenticate(&token).await?;
    Ok((identity, token))
}

fn session_id(raw: &str) -> Result<SessionId, GambitError> {
    raw.parse()
        .map_err(|_| GambitError::InvalidSessionId(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn login<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
) -> Result<Json<LoginResponse>, GambitError> {
    let token = state.tokens.login(&id).await?;
    Ok(Json(LoginResponse {
        token: token.as_str().to_string(),
    }))
}

async fn create_room<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(name): Path<String>,
    Query(query): Query<CreateQuery>,
) -> Result<Json<CreateResponse>, GambitError> {
    let (identity, token) = authenticate(&state, query.token).await?;
    let automated = query.opponent.as_deref() == Some("enable");
    let session_id = state
        .service
        .create(&name, &identity, token, automated)
        .await?;
    Ok(Json(CreateResponse { session_id }))
}

async fn room_info<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, GambitError> {
    let summary = state.service.info(session_id(&id)?).await?;
    Ok(Json(summary))
}

async fn join_room<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<JoinResponse>, GambitError> {
    let (identity, token) = authenticate(&state, query.token).await?;
    let (side, session) = state
        .service
        .join(session_id(&id)?, &identity, token)
        .await?;
    Ok(Json(JoinResponse { side, session }))
}

async fn list_rooms<L: EngineLauncher>(
    State(state): Shared<L>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<SessionSummary>> {
    Json(state.service.list(query.offset.unwrap_or(0)).await)
}

async fn place<L: EngineLauncher>(
    State(state): Shared<L>,
    Path((id, notation)): Path<(String, String)>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MoveResult>, GambitError> {
    let (identity, token) = authenticate(&state, query.token).await?;
    tracing::debug!(session_id = %id, %identity, %notation, "move submitted");
    let result = state
        .service
        .submit_move(session_id(&id)?, token, &notation)
        .await?;
    Ok(Json(result))
}

async fn turn<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
) -> Result<Json<TurnView>, GambitError> {
    Ok(Json(state.service.turn(session_id(&id)?).await?))
}

async fn timer<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<RemainingView>, GambitError> {
    let (_, token) = authenticate(&state, query.token).await?;
    let remaining = state
        .service
        .remaining(session_id(&id)?, &token)
        .await?;
    Ok(Json(remaining))
}

async fn board<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
) -> Result<Json<BoardView>, GambitError> {
    Ok(Json(state.service.board(session_id(&id)?).await?))
}

async fn resign<L: EngineLauncher>(
    State(state): Shared<L>,
    Path(id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MoveResult>, GambitError> {
    let (identity, token) = authenticate(&state, query.token).await?;
    let id = session_id(&id)?;
    let result = state.service.resign(id, token).await?;
    tracing::info!(session_id = %id, %identity, "participant resigned");
    Ok(Json(result))
}
