//! HTTP/SSE surface for hosted games.
//!
//! Thin by design: every request resolves to one synchronous call into the
//! session registry, and live updates flow out over per-session server-sent
//! event streams.

use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use warp::http::StatusCode;
use warp::reply::{self, Response};
use warp::{Filter, Reply};

use crate::errors::{ErrorResponse, IntoErrorResponse};
use crate::events::EventBus;
use crate::session::{SessionId, SessionManager};
use crate::settings::AppSettings;
use crate::users::UserDirectory;

const MAX_BODY_BYTES: u64 = 16 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(settings.host.clone(), settings.port)
    }

    pub fn for_tests() -> Self {
        Self::new("127.0.0.1", 0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppContext {
    config: ServerConfig,
    event_bus: Arc<EventBus>,
    sessions: Arc<SessionManager>,
    users: Arc<UserDirectory>,
}

impl AppContext {
    pub fn new(config: ServerConfig) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionManager::new(Arc::clone(&event_bus)));
        Self {
            config,
            event_bus,
            sessions,
            users: Arc::new(UserDirectory::new()),
        }
    }

    pub fn with_session_ttl(config: ServerConfig, ttl: Duration) -> Self {
        let event_bus = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionManager::with_ttl(Arc::clone(&event_bus), ttl));
        Self {
            config,
            event_bus,
            sessions,
            users: Arc::new(UserDirectory::new()),
        }
    }

    pub fn new_for_tests() -> Self {
        Self::new(ServerConfig::for_tests())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    pub fn users(&self) -> Arc<UserDirectory> {
        Arc::clone(&self.users)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),
    #[error("Cannot resolve host: {0}")]
    HostResolution(String),
}

pub struct WebServer {
    context: AppContext,
}

impl WebServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            context: AppContext::new(config),
        }
    }

    pub fn from_context(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let WebServer { context } = self;
        let bind_addr = Self::bind_addr(context.config())?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let filter = routes(context.clone());
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
        };

        let (addr, server_future) = warp::serve(filter)
            .try_bind_with_graceful_shutdown(bind_addr, shutdown_signal)
            .map_err(|err| ServerError::Bind(err.to_string()))?;

        tracing::info!(%addr, "web server listening");

        let task = tokio::spawn(server_future);

        Ok(ServerHandle {
            addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }

    fn bind_addr(config: &ServerConfig) -> Result<SocketAddr, ServerError> {
        if let Ok(addr) = config.host().parse::<SocketAddr>() {
            return Ok(addr);
        }
        if let Ok(ip) = config.host().parse::<std::net::IpAddr>() {
            return Ok(SocketAddr::new(ip, config.port()));
        }
        (config.host(), config.port())
            .to_socket_addrs()
            .map_err(|err| ServerError::HostResolution(err.to_string()))?
            .next()
            .ok_or_else(|| ServerError::HostResolution(config.host().to_string()))
    }
}

/// Running server: address plus a graceful-shutdown handle.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

#[derive(Debug, Deserialize)]
struct ConnectBody {
    username: String,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct CallBody {
    user_id: String,
    hand: String,
}

#[derive(Debug, Deserialize)]
struct BotBody {
    strategy: Option<String>,
}

fn with_context(
    ctx: AppContext,
) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

/// The full route tree for the API.
pub fn routes(
    ctx: AppContext,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| reply::json(&serde_json::json!({ "status": "ok" })));

    let connect_user = warp::path!("api" / "users")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_connect_user);

    let disconnect_user = warp::path!("api" / "users" / String)
        .and(warp::delete())
        .and(with_context(ctx.clone()))
        .and_then(handle_disconnect_user);

    let create_session = warp::path!("api" / "sessions")
        .and(warp::post())
        .and(with_context(ctx.clone()))
        .and_then(handle_create_session);

    let list_sessions = warp::path!("api" / "sessions")
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .and_then(handle_list_sessions);

    let join = warp::path!("api" / "sessions" / String / "join")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_join);

    let leave = warp::path!("api" / "sessions" / String / "leave")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_leave);

    let add_bot = warp::path!("api" / "sessions" / String / "bots")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_add_bot);

    let start = warp::path!("api" / "sessions" / String / "start")
        .and(warp::post())
        .and(with_context(ctx.clone()))
        .and_then(handle_start);

    let call = warp::path!("api" / "sessions" / String / "call")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_call);

    let bluff = warp::path!("api" / "sessions" / String / "bluff")
        .and(warp::post())
        .and(json_body())
        .and(with_context(ctx.clone()))
        .and_then(handle_bluff);

    let state = warp::path!("api" / "sessions" / String / "state")
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .and_then(handle_state);

    let cards = warp::path!("api" / "sessions" / String / "cards" / String)
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .and_then(handle_cards);

    let events = warp::path!("api" / "sessions" / String / "events")
        .and(warp::get())
        .and(with_context(ctx.clone()))
        .map(|session_id: String, ctx: AppContext| {
            let stream = ctx
                .event_bus()
                .subscribe(session_id)
                .map(|event| warp::sse::Event::default().event("game").json_data(&event));
            warp::sse::reply(warp::sse::keep_alive().stream(stream))
        });

    health
        .or(connect_user)
        .or(disconnect_user)
        .or(create_session)
        .or(list_sessions)
        .or(join)
        .or(leave)
        .or(add_bot)
        .or(start)
        .or(call)
        .or(bluff)
        .or(state)
        .or(cards)
        .or(events)
}

/// Give seated bots their turns after a state change; failures are logged,
/// never surfaced to the request that triggered them.
fn nudge_bots(ctx: &AppContext, session_id: &SessionId) {
    if let Err(err) = ctx.sessions().drive_bots(session_id) {
        tracing::warn!(session_id = %session_id, error = %err, "bot drive failed");
    }
}

async fn handle_connect_user(body: ConnectBody, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(match ctx.users().connect(&body.username) {
        Ok(user) => reply::json(&user).into_response(),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_disconnect_user(
    user_id: String,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    Ok(match ctx.users().disconnect(&user_id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_create_session(ctx: AppContext) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().create_session() {
        Ok(session_id) => {
            reply::json(&serde_json::json!({ "session_id": session_id })).into_response()
        }
        Err(err) => err.into_http_response(),
    })
}

async fn handle_list_sessions(ctx: AppContext) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().list_sessions() {
        Ok(sessions) => reply::json(&sessions).into_response(),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_join(
    session_id: String,
    body: UserRef,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let user = match ctx.users().get(&body.user_id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(ErrorResponse::new(
                "unknown_user",
                format!("Unknown user: {}", body.user_id),
            )
            .into_response(StatusCode::NOT_FOUND))
        }
        Err(err) => return Ok(err.into_http_response()),
    };

    Ok(match ctx.sessions().join_session(&session_id, user) {
        Ok(joined) => reply::json(&serde_json::json!({ "joined": joined })).into_response(),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_leave(
    session_id: String,
    body: UserRef,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().leave_session(&session_id, &body.user_id) {
        Ok(()) => {
            nudge_bots(&ctx, &session_id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => err.into_http_response(),
    })
}

async fn handle_add_bot(
    session_id: String,
    body: BotBody,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let strategy = body.strategy.as_deref().unwrap_or("baseline");
    Ok(match ctx.sessions().add_bot(&session_id, strategy) {
        Ok(Some(user)) => reply::json(&user).into_response(),
        Ok(None) => ErrorResponse::new("bot_not_seated", "Bot could not take a seat")
            .into_response(StatusCode::CONFLICT),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_start(session_id: String, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().start_game(&session_id) {
        Ok(()) => {
            nudge_bots(&ctx, &session_id);
            reply::json(&serde_json::json!({ "started": true })).into_response()
        }
        Err(err) => err.into_http_response(),
    })
}

async fn handle_call(
    session_id: String,
    body: CallBody,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    Ok(
        match ctx
            .sessions()
            .call_hand(&session_id, &body.user_id, &body.hand)
        {
            Ok(()) => {
                nudge_bots(&ctx, &session_id);
                reply::json(&serde_json::json!({ "ok": true })).into_response()
            }
            Err(err) => err.into_http_response(),
        },
    )
}

async fn handle_bluff(
    session_id: String,
    body: UserRef,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().call_bluff(&session_id, &body.user_id) {
        Ok(outcome) => {
            nudge_bots(&ctx, &session_id);
            reply::json(&outcome).into_response()
        }
        Err(err) => err.into_http_response(),
    })
}

async fn handle_state(session_id: String, ctx: AppContext) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().state(&session_id) {
        Ok(state) => reply::json(&state).into_response(),
        Err(err) => err.into_http_response(),
    })
}

async fn handle_cards(
    session_id: String,
    user_id: String,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    Ok(match ctx.sessions().player_cards(&session_id, &user_id) {
        Ok(cards) => reply::json(&cards).into_response(),
        Err(err) => err.into_http_response(),
    })
}
