use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use hide_seek_rust_server::driver::{DriverUpdate, MatchDriver};
use hide_seek_rust_server::engine::{MatchEngine, Viewpoint};
use hide_seek_rust_server::server_protocol::{parse_client_message, ParsedClientMessage};
use hide_seek_rust_server::server_utils::{build_roster, normalize_bot_count};
use hide_seek_rust_server::terrain::TerrainMap;
use hide_seek_rust_server::types::{MatchConfig, Role};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
struct AppState {
    terrain: Arc<TerrainMap>,
}

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

/// One websocket connection. Each session owns at most one running match.
struct Session {
    id: String,
    tx: mpsc::Sender<OutboundMessage>,
    disconnect: Arc<Notify>,
    running: Option<RunningMatch>,
}

struct RunningMatch {
    driver: MatchDriver,
    forwarder: JoinHandle<()>,
}

impl Drop for RunningMatch {
    fn drop(&mut self) {
        self.driver.stop();
        self.forwarder.abort();
    }
}

struct StartRequest {
    name: String,
    role: Role,
    bots: Option<i64>,
    config: Option<MatchConfig>,
    seed: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let state = AppState {
        terrain: Arc::new(TerrainMap::default_town()?),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        log::info!("static file root: {}", static_dir.to_string_lossy());
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        log::warn!("static file root not found; serving the websocket API only");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    log::info!("listening on :{port}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist"), PathBuf::from("../dist")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);
    let mut session = Session {
        id: make_id("session"),
        tx,
        disconnect: Arc::new(Notify::new()),
        running: None,
    };
    log::info!("[{}] connected", session.id);

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    let disconnect = session.disconnect.clone();
    loop {
        let received = tokio::select! {
            received = ws_receiver.next() => received,
            _ = disconnect.notified() => {
                log::warn!("[{}] outbound queue full, disconnecting", session.id);
                break;
            }
        };
        let Some(Ok(message)) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(&state, &mut session, raw.as_str()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = std::str::from_utf8(&raw) {
                    handle_client_message(&state, &mut session, text).await;
                } else {
                    send_error(&session, "invalid utf8 message");
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    session.running = None;
    log::info!("[{}] disconnected", session.id);
    let _ = session.tx.try_send(OutboundMessage::Close {
        code: 1000,
        reason: "bye".to_string(),
    });
    drop(session);
    let _ = writer.await;
}

async fn handle_client_message(state: &AppState, session: &mut Session, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        send_error(session, "invalid message");
        return;
    };

    match message {
        ParsedClientMessage::Start {
            name,
            role,
            bots,
            config,
            seed,
        } => {
            let request = StartRequest {
                name,
                role,
                bots,
                config,
                seed,
            };
            start_match(state, session, request);
        }
        ParsedClientMessage::Input { dx, dy } => {
            let Some(running) = session.running.as_ref() else {
                send_error(session, "match not started");
                return;
            };
            running.driver.handle().set_held_intent(dx, dy).await;
        }
        ParsedClientMessage::Radar => {
            let Some(running) = session.running.as_ref() else {
                send_error(session, "match not started");
                return;
            };
            let handle = running.driver.handle();
            let message = match handle.activate_radar().await {
                Ok(result) => json!({
                    "type": "radar",
                    "result": result,
                    "readyInMs": handle.radar_ready_in_ms().await,
                    "charge": handle.radar_charge().await,
                }),
                Err(error) => json!({
                    "type": "error",
                    "message": error.to_string(),
                    "radar": error,
                }),
            };
            send_to_client(session, &message, QueuePolicy::DisconnectOnFull);
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                session,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DropOnFull,
            );
        }
    }
}

fn start_match(state: &AppState, session: &mut Session, request: StartRequest) {
    let roster = build_roster(&request.name, request.role, normalize_bot_count(request.bots));
    let config = request.config.unwrap_or_default();
    let seed = request.seed.unwrap_or_else(rand::random::<u32>);

    let engine = match MatchEngine::start(roster, state.terrain.clone(), config, seed) {
        Ok(engine) => engine,
        Err(error) => {
            log::warn!("[{}] rejected start: {error}", session.id);
            send_error(session, &error.to_string());
            return;
        }
    };

    // A new start replaces whatever match this session was running.
    session.running = None;

    let actor_id = engine.controlled_actor().map(|actor| actor.id.clone());
    send_to_client(
        session,
        &json!({
            "type": "welcome",
            "actorId": actor_id,
            "seed": seed,
            "config": engine.config,
            "map": engine.terrain().to_map_init(),
        }),
        QueuePolicy::DisconnectOnFull,
    );
    log::info!(
        "[{}] match started: role={:?} seed={seed}",
        session.id,
        request.role
    );

    let (updates_tx, updates_rx) = mpsc::channel(64);
    let driver = MatchDriver::spawn(engine, Viewpoint::Controlled, updates_tx);
    let forwarder = spawn_update_forwarder(
        session.id.clone(),
        updates_rx,
        session.tx.clone(),
        session.disconnect.clone(),
    );
    session.running = Some(RunningMatch { driver, forwarder });
}

fn spawn_update_forwarder(
    session_id: String,
    mut updates: mpsc::Receiver<DriverUpdate>,
    tx: mpsc::Sender<OutboundMessage>,
    disconnect: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            let (message, policy) = match update {
                DriverUpdate::State(snapshot) => (
                    json!({
                        "type": "state",
                        "snapshot": snapshot,
                    }),
                    QueuePolicy::DropOnFull,
                ),
                DriverUpdate::Events(events) => (
                    json!({
                        "type": "events",
                        "events": events,
                    }),
                    QueuePolicy::DisconnectOnFull,
                ),
                DriverUpdate::Ended(summary) => {
                    log::info!(
                        "[{session_id}] match over: reason={:?} score={}",
                        summary.reason,
                        summary.score
                    );
                    (
                        json!({
                            "type": "game_over",
                            "summary": summary,
                        }),
                        QueuePolicy::DisconnectOnFull,
                    )
                }
            };
            if !send_outbound(&tx, &message, policy) {
                disconnect.notify_one();
                break;
            }
        }
    })
}

fn send_to_client(session: &Session, message: &Value, policy: QueuePolicy) {
    if !send_outbound(&session.tx, message, policy) {
        session.disconnect.notify_one();
    }
}

/// Returns false when the client has to be dropped.
fn send_outbound(tx: &mpsc::Sender<OutboundMessage>, message: &Value, policy: QueuePolicy) -> bool {
    let send_failed = tx
        .try_send(OutboundMessage::Text(message.to_string()))
        .is_err();
    !(send_failed && policy == QueuePolicy::DisconnectOnFull)
}

fn send_error(session: &Session, message: &str) {
    send_to_client(
        session,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_only_disconnects_for_critical_messages() {
        let (tx, _rx) = mpsc::channel::<OutboundMessage>(1);
        let message = json!({ "type": "pong", "t": 1.0 });
        assert!(send_outbound(&tx, &message, QueuePolicy::DisconnectOnFull));
        assert!(send_outbound(&tx, &message, QueuePolicy::DropOnFull));
        assert!(!send_outbound(&tx, &message, QueuePolicy::DisconnectOnFull));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(make_id("session"), make_id("session"));
    }
}
