// ABOUTME: Sync coordinator keeping the audience and presenter views in lockstep
// ABOUTME: Fans out content and navigation messages, deferring the first push until views are ready

use crate::errors::{Result, VomitError};
use crate::frontmatter::Theme;
use crate::presentation::Direction;
use crate::view::{ViewMessage, ViewRole};
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Where the coordinator delivers messages for one view.
pub trait ViewChannel: Send {
    /// Deliver a message; `false` means the view is gone.
    fn deliver(&mut self, message: ViewMessage) -> bool;
}

impl ViewChannel for Sender<ViewMessage> {
    fn deliver(&mut self, message: ViewMessage) -> bool {
        self.send(message).is_ok()
    }
}

struct ViewSlot {
    role: ViewRole,
    channel: Box<dyn ViewChannel>,
    ready: bool,
}

/// Owns the latest document snapshot and the set of live views.
///
/// The editing surface is the only writer; views only ever receive
/// read-only copies of the content. Until every view of a freshly started
/// presentation has signalled ready, messages queue in arrival order behind
/// the initial load.
#[derive(Default)]
pub struct SyncCoordinator {
    content: String,
    base_path: Option<String>,
    views: Vec<ViewSlot>,
    pending: Vec<ViewMessage>,
    released: bool,
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    pub fn is_presenting(&self) -> bool {
        !self.views.is_empty()
    }

    pub fn roles(&self) -> Vec<ViewRole> {
        self.views.iter().map(|slot| slot.role).collect()
    }

    /// Whether the initial load has been delivered to every view.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// A new document was loaded into the editing surface.
    pub fn load(&mut self, content: String, base_path: Option<String>) {
        self.content = content.clone();
        self.base_path = base_path.clone();
        if self.is_presenting() {
            self.broadcast(ViewMessage::Load { content, base_path });
        }
    }

    /// The editing surface changed the document.
    pub fn content_changed(&mut self, content: String) {
        self.content = content.clone();
        if self.is_presenting() {
            self.broadcast(ViewMessage::Update { content });
        }
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.broadcast(ViewMessage::Navigate(direction));
    }

    pub fn goto(&mut self, index: i64) {
        self.broadcast(ViewMessage::Goto(index));
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.broadcast(ViewMessage::SetTheme(theme));
    }

    pub fn reset_timer(&mut self) {
        self.broadcast(ViewMessage::ResetTimer);
    }

    /// Attach views and queue the current document for them. A view whose
    /// role is already attached is replaced.
    pub fn start_presentation<I>(&mut self, views: I)
    where
        I: IntoIterator<Item = (ViewRole, Box<dyn ViewChannel>)>,
    {
        for (role, channel) in views {
            self.views.retain(|slot| slot.role != role);
            self.views.push(ViewSlot {
                role,
                channel,
                ready: false,
            });
        }

        info!("Starting presentation with views {:?}", self.roles());
        self.released = false;
        self.pending = vec![ViewMessage::Load {
            content: self.content.clone(),
            base_path: self.base_path.clone(),
        }];
        self.try_release();
    }

    /// One-time ready signal from a view.
    pub fn view_ready(&mut self, role: ViewRole) {
        match self.views.iter_mut().find(|slot| slot.role == role) {
            Some(slot) if !slot.ready => {
                debug!("{} view ready", role);
                slot.ready = true;
                self.try_release();
            }
            Some(_) => debug!("{} view signalled ready twice", role),
            None => warn!("Ready signal from unknown {} view", role),
        }
    }

    pub fn end_presentation(&mut self) {
        info!("Ending presentation");
        self.views.clear();
        self.pending.clear();
        self.released = false;
    }

    fn broadcast(&mut self, message: ViewMessage) {
        if self.views.is_empty() {
            debug!("No live views, dropping {:?}", message);
            return;
        }
        if !self.released {
            self.pending.push(message);
            return;
        }
        self.deliver_all(message);
    }

    fn try_release(&mut self) {
        if self.released || !self.views.iter().all(|slot| slot.ready) {
            return;
        }
        self.released = true;
        for message in std::mem::take(&mut self.pending) {
            self.deliver_all(message);
        }
    }

    fn deliver_all(&mut self, message: ViewMessage) {
        self.views.retain_mut(|slot| {
            let alive = slot.channel.deliver(message.clone());
            if !alive {
                warn!("{} view closed, detaching it", slot.role);
            }
            alive
        });
    }

    /// Apply one command; returns `false` on shutdown.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Load { content, base_path } => self.load(content, base_path),
            Command::ContentChanged(content) => self.content_changed(content),
            Command::Navigate(direction) => self.navigate(direction),
            Command::Goto(index) => self.goto(index),
            Command::SetTheme(theme) => self.set_theme(theme),
            Command::ResetTimer => self.reset_timer(),
            Command::StartPresentation(views) => self.start_presentation(views),
            Command::ViewReady(role) => self.view_ready(role),
            Command::EndPresentation => self.end_presentation(),
            Command::Shutdown => return false,
        }
        true
    }
}

/// Requests sent to a running coordinator from the editor and the views.
pub enum Command {
    Load {
        content: String,
        base_path: Option<String>,
    },
    ContentChanged(String),
    Navigate(Direction),
    Goto(i64),
    SetTheme(Theme),
    ResetTimer,
    StartPresentation(Vec<(ViewRole, Box<dyn ViewChannel>)>),
    ViewReady(ViewRole),
    EndPresentation,
    Shutdown,
}

impl Command {
    /// Parse a control message sent by a view page:
    /// `next`, `prev`, `first`, `last`, `goto:{index}` or `reset-timer`.
    pub fn from_control(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(index) = text.strip_prefix("goto:") {
            return index.trim().parse().ok().map(Command::Goto);
        }
        if text == "reset-timer" {
            return Some(Command::ResetTimer);
        }
        text.parse().ok().map(Command::Navigate)
    }
}

/// Process commands strictly in arrival order until shutdown or until every
/// sender is gone, then hand the coordinator back.
pub fn run(mut coordinator: SyncCoordinator, commands: Receiver<Command>) -> SyncCoordinator {
    for command in commands {
        if !coordinator.apply(command) {
            break;
        }
    }
    coordinator
}

/// Run a coordinator on its own thread.
pub fn spawn(
    coordinator: SyncCoordinator,
) -> Result<(Sender<Command>, JoinHandle<SyncCoordinator>)> {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::Builder::new()
        .name("vomit-sync".to_string())
        .spawn(move || run(coordinator, receiver))?;
    Ok((sender, handle))
}

/// Send a command, mapping a stopped coordinator to an error.
pub fn send(commands: &Sender<Command>, command: Command) -> Result<()> {
    commands
        .send(command)
        .map_err(|_| VomitError::ChannelClosed("sync coordinator stopped".to_string()))
}
