// ABOUTME: Audience and presenter views over the presentation state machine
// ABOUTME: Handles typed view messages, renders frames and runs each view as its own event loop

use crate::errors::Result;
use crate::frontmatter::Theme;
use crate::markdown::MarkdownRenderer;
use crate::presentation::{Direction, Presentation};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const AUDIENCE_EMPTY_HTML: &str =
    "<h1>No slides</h1><p>Open a markdown file to start presenting</p>";
const PRESENTER_EMPTY_HTML: &str = "<h2>No slides</h2>";
const END_OF_PRESENTATION_HTML: &str = r#"<p class="end-of-presentation">End of presentation</p>"#;

/// How often a presenter view republishes its frame so the timer moves.
const TIMER_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewRole {
    Audience,
    Presenter,
}

impl ViewRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewRole::Audience => "audience",
            ViewRole::Presenter => "presenter",
        }
    }
}

impl fmt::Display for ViewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "audience" => Ok(ViewRole::Audience),
            "presenter" => Ok(ViewRole::Presenter),
            other => Err(format!("unknown view: {}", other)),
        }
    }
}

/// Messages a presentation view understands, in the order they are sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewMessage {
    Load {
        content: String,
        base_path: Option<String>,
    },
    Update {
        content: String,
    },
    Navigate(Direction),
    Goto(i64),
    SetTheme(Theme),
    ResetTimer,
}

/// What a view shows after processing a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewFrame {
    pub role: ViewRole,
    pub index: usize,
    pub total: usize,
    pub counter: String,
    pub slide_html: String,
    pub title_slide: bool,
    pub theme: Theme,
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
}

/// Elapsed-time clock shown to the speaker.
#[derive(Debug, Clone, Copy)]
pub struct SpeakerTimer {
    started: Instant,
}

impl Default for SpeakerTimer {
    fn default() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl SpeakerTimer {
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn label(&self) -> String {
        format_elapsed(self.elapsed())
    }
}

/// `mm:ss`, minutes growing past 59 rather than rolling into hours.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One audience or presenter view: its own state machine plus rendering.
#[derive(Debug, Clone)]
pub struct PresentationView {
    role: ViewRole,
    presentation: Presentation,
    renderer: MarkdownRenderer,
    theme: Theme,
    timer: SpeakerTimer,
}

impl PresentationView {
    pub fn new(role: ViewRole, renderer: MarkdownRenderer) -> Self {
        Self {
            role,
            presentation: Presentation::new(),
            renderer,
            theme: Theme::default(),
            timer: SpeakerTimer::default(),
        }
    }

    pub fn audience(renderer: MarkdownRenderer) -> Self {
        Self::new(ViewRole::Audience, renderer)
    }

    pub fn presenter(renderer: MarkdownRenderer) -> Self {
        Self::new(ViewRole::Presenter, renderer)
    }

    pub fn role(&self) -> ViewRole {
        self.role
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn handle(&mut self, message: ViewMessage) {
        debug!("{} view handling {:?}", self.role, message);
        match message {
            ViewMessage::Load { content, base_path } => {
                self.presentation.load(&content, base_path.as_deref());
                self.apply_theme();
            }
            ViewMessage::Update { content } => {
                self.presentation.update(&content);
                self.apply_theme();
            }
            ViewMessage::Navigate(direction) => self.presentation.navigate(direction),
            ViewMessage::Goto(index) => {
                self.presentation.goto(index);
            }
            ViewMessage::SetTheme(theme) => self.theme = theme,
            ViewMessage::ResetTimer => self.timer.reset(),
        }
    }

    fn apply_theme(&mut self) {
        if let Some(theme) = self.presentation.settings().theme {
            self.theme = theme;
        }
    }

    fn render(&self, markdown: &str) -> String {
        self.renderer.render(markdown, self.presentation.base_path())
    }

    pub fn frame(&self) -> ViewFrame {
        let presentation = &self.presentation;
        let current = presentation.current_slide();

        let slide_html = match (current, self.role) {
            (Some(slide), _) => self.render(&slide.content),
            (None, ViewRole::Audience) => AUDIENCE_EMPTY_HTML.to_string(),
            (None, ViewRole::Presenter) => PRESENTER_EMPTY_HTML.to_string(),
        };

        let (next_html, notes_html, elapsed) = match self.role {
            ViewRole::Audience => (None, None, None),
            ViewRole::Presenter => {
                let next_html = match (current, presentation.next_slide()) {
                    (None, _) => String::new(),
                    (Some(_), Some(next)) => self.render(&next.content),
                    (Some(_), None) => END_OF_PRESENTATION_HTML.to_string(),
                };
                let notes_html = current
                    .filter(|slide| slide.has_notes())
                    .map(|slide| self.render(&slide.notes))
                    .unwrap_or_default();
                (Some(next_html), Some(notes_html), Some(self.timer.label()))
            }
        };

        ViewFrame {
            role: self.role,
            index: presentation.current_index(),
            total: presentation.len(),
            counter: presentation.counter(),
            slide_html,
            title_slide: current.is_some_and(|slide| slide.is_title_slide()),
            theme: self.theme,
            font_size: presentation.settings().font_size,
            next_html,
            notes_html,
            elapsed,
        }
    }
}

/// Destination for the frames a running view produces.
pub trait FrameSink: Send {
    fn publish(&self, frame: ViewFrame);
}

impl FrameSink for Sender<ViewFrame> {
    fn publish(&self, frame: ViewFrame) {
        // The receiving side going away just means nobody is watching.
        let _ = self.send(frame);
    }
}

/// Channel pair feeding a view's event loop.
pub fn view_channel() -> (Sender<ViewMessage>, Receiver<ViewMessage>) {
    mpsc::channel()
}

/// Run `view` on its own thread, processing `messages` strictly in arrival
/// order and publishing a frame after each one. `on_ready` fires once the
/// loop is about to start. The thread ends when every sender is dropped.
pub fn spawn_view<S, F>(
    mut view: PresentationView,
    messages: Receiver<ViewMessage>,
    sink: S,
    on_ready: F,
) -> Result<JoinHandle<()>>
where
    S: FrameSink + 'static,
    F: FnOnce() + Send + 'static,
{
    let role = view.role();
    let handle = thread::Builder::new()
        .name(format!("vomit-{}", role))
        .spawn(move || {
            info!("{} view started", role);
            sink.publish(view.frame());
            on_ready();

            loop {
                let message = match role {
                    ViewRole::Audience => {
                        messages.recv().map_err(|_| RecvTimeoutError::Disconnected)
                    }
                    ViewRole::Presenter => messages.recv_timeout(TIMER_TICK),
                };
                match message {
                    Ok(message) => view.handle(message),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                sink.publish(view.frame());
            }

            info!("{} view stopped", role);
        })?;

    Ok(handle)
}
