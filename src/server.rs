// ABOUTME: Live presentation server for the editor preview, audience and presenter pages
// ABOUTME: Serves pages over HTTP, streams view frames over WebSocket and feeds file changes to the views

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::net::{TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tungstenite::Message;

use crate::config::ServeConfig;
use crate::document::Document;
use crate::errors::{Result, VomitError};
use crate::html;
use crate::markdown::MarkdownRenderer;
use crate::presentation::Direction;
use crate::resources;
use crate::sync::{self, Command, SyncCoordinator, ViewChannel};
use crate::view::{self, FrameSink, PresentationView, ViewFrame, ViewRole};
use crate::watch::{self, WatchConfig};

/// How long a socket read waits before checking for frames to push.
const SOCKET_POLL: Duration = Duration::from_millis(100);

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// What a connected page wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Preview,
    View(ViewRole),
}

impl FromStr for Feed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "preview" => Ok(Feed::Preview),
            other => other.parse().map(Feed::View),
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Preview => f.write_str("preview"),
            Feed::View(role) => write!(f, "{}", role),
        }
    }
}

#[derive(Serialize)]
struct PreviewFrame<'a> {
    html: &'a str,
}

/// Latest output of every view plus the editor preview, shared between the
/// view threads that write it and the server threads that read it.
#[derive(Default)]
pub struct FrameBoard {
    frames: RwLock<HashMap<ViewRole, ViewFrame>>,
    preview: RwLock<String>,
    subscribers: Mutex<Vec<(Feed, Sender<String>)>>,
}

impl FrameBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self, role: ViewRole) -> Option<ViewFrame> {
        self.frames.read().get(&role).cloned()
    }

    pub fn preview(&self) -> String {
        self.preview.read().clone()
    }

    pub fn store_frame(&self, frame: ViewFrame) {
        let role = frame.role;
        match to_json(&frame) {
            Ok(payload) => {
                self.frames.write().insert(role, frame);
                self.push(Feed::View(role), payload);
            }
            Err(e) => error!("Failed to serialize {} frame: {}", role, e),
        }
    }

    pub fn publish_preview(&self, html: String) {
        match to_json(&PreviewFrame { html: &html }) {
            Ok(payload) => {
                *self.preview.write() = html;
                self.push(Feed::Preview, payload);
            }
            Err(e) => error!("Failed to serialize preview: {}", e),
        }
    }

    /// JSON payload of the current state of a feed, if there is one yet.
    pub fn snapshot(&self, feed: Feed) -> Option<String> {
        match feed {
            Feed::Preview => to_json(&PreviewFrame {
                html: &self.preview.read(),
            })
            .ok(),
            Feed::View(role) => self.frame(role).and_then(|frame| to_json(&frame).ok()),
        }
    }

    /// Receive every payload published to `feed` from now on.
    pub fn subscribe(&self, feed: Feed) -> Receiver<String> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.lock().push((feed, sender));
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn push(&self, feed: Feed, payload: String) {
        self.subscribers.lock().retain(|(wanted, sender)| {
            *wanted != feed || sender.send(payload.clone()).is_ok()
        });
    }
}

impl FrameSink for Arc<FrameBoard> {
    fn publish(&self, frame: ViewFrame) {
        self.store_frame(frame);
    }
}

/// A response decided by [`route`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }
}

/// Everything the HTTP routes need.
pub struct HttpContext {
    pub board: Arc<FrameBoard>,
    pub commands: Sender<Command>,
    pub styles: String,
    pub ws_port: u16,
    pub presenter: bool,
}

/// Map a request to its reply. Control routes forward a command to the
/// coordinator.
pub fn route(method: &Method, url: &str, ctx: &HttpContext) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (Method::Get, [""]) => Reply::html(html::editor_page(
            &ctx.board.preview(),
            &ctx.styles,
            ctx.ws_port,
        )),
        (Method::Get, ["audience"]) => Reply::html(html::view_page(
            ViewRole::Audience,
            &ctx.styles,
            ctx.ws_port,
        )),
        (Method::Get, ["presenter"]) if ctx.presenter => Reply::html(html::view_page(
            ViewRole::Presenter,
            &ctx.styles,
            ctx.ws_port,
        )),
        (Method::Get, ["frame", role]) => {
            let frame = role
                .parse::<ViewRole>()
                .ok()
                .and_then(|role| ctx.board.frame(role));
            match frame.map(|frame| to_json(&frame)) {
                Some(Ok(body)) => Reply::json(body),
                Some(Err(e)) => Reply::text(500, &e.to_string()),
                None => Reply::text(404, "404 Not Found"),
            }
        }
        (Method::Post, ["navigate", direction]) => match direction.parse::<Direction>() {
            Ok(direction) => control(ctx, Command::Navigate(direction)),
            Err(e) => Reply::text(400, &e),
        },
        (Method::Post, ["goto", index]) => match index.parse::<i64>() {
            Ok(index) => control(ctx, Command::Goto(index)),
            Err(e) => Reply::text(400, &e.to_string()),
        },
        (Method::Post, ["reset-timer"]) => control(ctx, Command::ResetTimer),
        _ => Reply::text(404, "404 Not Found"),
    }
}

fn control(ctx: &HttpContext, command: Command) -> Reply {
    match sync::send(&ctx.commands, command) {
        Ok(()) => Reply::text(200, "ok"),
        Err(e) => Reply::text(503, &e.to_string()),
    }
}

fn start_http(port: u16, ctx: HttpContext) -> Result<JoinHandle<()>> {
    let server = Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| VomitError::ServerError(format!("Failed to start HTTP server: {}", e)))?;

    let handle = thread::Builder::new()
        .name("vomit-http".to_string())
        .spawn(move || {
            info!("HTTP server listening on http://localhost:{}", port);
            for request in server.incoming_requests() {
                let reply = route(request.method(), request.url(), &ctx);
                debug!("{} {} -> {}", request.method(), request.url(), reply.status);

                let mut response =
                    Response::from_string(reply.body).with_status_code(StatusCode(reply.status));
                if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
                    response = response.with_header(header);
                }
                if let Err(e) = request.respond(response) {
                    error!("Failed to send response: {}", e);
                }
            }
        })?;

    Ok(handle)
}

fn start_websocket(
    port: u16,
    board: Arc<FrameBoard>,
    commands: Sender<Command>,
) -> Result<JoinHandle<()>> {
    let listener = TcpListener::bind(("0.0.0.0", port)).map_err(|e| {
        VomitError::ServerError(format!("Failed to bind WebSocket port {}: {}", port, e))
    })?;

    let handle = thread::Builder::new()
        .name("vomit-ws".to_string())
        .spawn(move || {
            info!("WebSocket server listening on ws://localhost:{}", port);
            for stream in listener.incoming() {
                let stream = match stream {
                    Ok(stream) => stream,
                    Err(e) => {
                        warn!("Failed to accept WebSocket connection: {}", e);
                        continue;
                    }
                };
                let board = board.clone();
                let commands = commands.clone();
                let spawned = thread::Builder::new()
                    .name("vomit-ws-client".to_string())
                    .spawn(move || {
                        if let Err(e) = handle_socket(stream, &board, &commands) {
                            debug!("WebSocket client ended: {}", e);
                        }
                    });
                if let Err(e) = spawned {
                    error!("Failed to spawn WebSocket client thread: {}", e);
                }
            }
        })?;

    Ok(handle)
}

fn ws_error(err: tungstenite::Error) -> VomitError {
    VomitError::ServerError(format!("WebSocket error: {}", err))
}

/// One page connection: its first text message names the feed, after which
/// frames flow out and control messages flow in.
fn handle_socket(stream: TcpStream, board: &FrameBoard, commands: &Sender<Command>) -> Result<()> {
    let mut socket = tungstenite::accept(stream)
        .map_err(|e| VomitError::ServerError(format!("WebSocket handshake failed: {}", e)))?;

    let feed = loop {
        match socket.read().map_err(ws_error)? {
            Message::Text(text) => match text.parse::<Feed>() {
                Ok(feed) => break feed,
                Err(e) => {
                    warn!("Rejecting WebSocket client: {}", e);
                    return Ok(());
                }
            },
            Message::Close(_) => return Ok(()),
            _ => continue,
        }
    };

    info!("{} page connected", feed);
    let updates = board.subscribe(feed);
    if let Some(payload) = board.snapshot(feed) {
        socket.send(Message::Text(payload)).map_err(ws_error)?;
    }
    socket.get_ref().set_read_timeout(Some(SOCKET_POLL))?;

    loop {
        while let Ok(payload) = updates.try_recv() {
            socket.send(Message::Text(payload)).map_err(ws_error)?;
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                if feed == Feed::Preview {
                    continue;
                }
                match Command::from_control(&text) {
                    Some(command) => sync::send(commands, command)?,
                    None => debug!("Ignoring control message {:?}", text),
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                break
            }
            Err(e) => return Err(ws_error(e)),
        }
    }

    info!("{} page disconnected", feed);
    Ok(())
}

/// Present a markdown file: run the views and the coordinator, serve the
/// pages and push every saved change to them. Blocks while watching.
pub fn serve(config: &ServeConfig) -> Result<()> {
    let mut document = Document::open(&config.markdown_path)?;
    let renderer = MarkdownRenderer::default();
    let board = Arc::new(FrameBoard::new());
    board.publish_preview(document.preview_html(&renderer));

    let (commands, coordinator) = sync::spawn(SyncCoordinator::new())?;
    sync::send(
        &commands,
        Command::Load {
            content: document.content().to_string(),
            base_path: document.base_path(),
        },
    )?;

    let mut roles = vec![ViewRole::Audience];
    if config.presenter {
        roles.push(ViewRole::Presenter);
    }

    // Register every channel before any view thread exists so no ready
    // signal can reach the coordinator ahead of its view.
    let mut channels: Vec<(ViewRole, Box<dyn ViewChannel>)> = Vec::new();
    let mut receivers = Vec::new();
    for role in roles {
        let (sender, receiver) = view::view_channel();
        channels.push((role, Box::new(sender)));
        receivers.push((role, receiver));
    }
    sync::send(&commands, Command::StartPresentation(channels))?;

    let mut views = Vec::new();
    for (role, receiver) in receivers {
        let ready = commands.clone();
        views.push(view::spawn_view(
            PresentationView::new(role, renderer),
            receiver,
            board.clone(),
            move || {
                if ready.send(Command::ViewReady(role)).is_err() {
                    warn!("Coordinator gone before {} view was ready", role);
                }
            },
        )?);
    }

    let styles = resources::stylesheet_tags(&config.stylesheets, config.mode);
    start_http(
        config.port,
        HttpContext {
            board: board.clone(),
            commands: commands.clone(),
            styles,
            ws_port: config.ws_port,
            presenter: config.presenter,
        },
    )?;
    start_websocket(config.ws_port, board.clone(), commands.clone())?;

    println!("Editor preview:  http://localhost:{}/", config.port);
    println!("Audience view:   http://localhost:{}/audience", config.port);
    if config.presenter {
        println!("Presenter view:  http://localhost:{}/presenter", config.port);
    }
    println!("Watching {:?} (Press Ctrl+C to stop)", config.markdown_path);

    let watch_config = WatchConfig {
        markdown_path: config.markdown_path.clone(),
        debounce_ms: config.debounce_ms,
    };
    watch::watch_markdown(&watch_config, |content| {
        document.external_change(content.clone());
        board.publish_preview(document.preview_html(&renderer));
        if let Err(e) = sync::send(&commands, Command::ContentChanged(content)) {
            error!("Failed to push change: {}", e);
        }
    })?;

    sync::send(&commands, Command::Shutdown)?;
    drop(commands);
    if coordinator.join().is_err() {
        error!("Sync coordinator panicked");
    }
    for handle in views {
        if handle.join().is_err() {
            error!("View thread panicked");
        }
    }
    Ok(())
}
