use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use vomit::server::{Feed, FrameBoard};
use vomit::sync::{self, Command, SyncCoordinator, ViewChannel};
use vomit::view::{self, FrameSink};
use vomit::{Direction, MarkdownRenderer, PresentationView, Theme, ViewFrame, ViewRole};

const TIMEOUT: Duration = Duration::from_secs(10);

fn deck(count: usize) -> String {
    (1..=count)
        .map(|n| format!("# Slide {}\n\n???\nnotes {}", n, n))
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn wait_for<F>(frames: &Receiver<ViewFrame>, predicate: F) -> ViewFrame
where
    F: Fn(&ViewFrame) -> bool,
{
    let deadline = Instant::now() + TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let frame = frames
            .recv_timeout(remaining)
            .expect("Timed out waiting for a frame");
        if predicate(&frame) {
            return frame;
        }
    }
}

/// Start a presentation the way the live server does: register channels
/// first, then spawn the views that signal ready.
fn start_views<S>(
    commands: &Sender<Command>,
    sinks: Vec<(ViewRole, S)>,
) -> Vec<JoinHandle<()>>
where
    S: FrameSink + 'static,
{
    let mut channels: Vec<(ViewRole, Box<dyn ViewChannel>)> = Vec::new();
    let mut pending = Vec::new();
    for (role, sink) in sinks {
        let (sender, receiver) = view::view_channel();
        channels.push((role, Box::new(sender)));
        pending.push((role, receiver, sink));
    }
    sync::send(commands, Command::StartPresentation(channels))
        .expect("Failed to start presentation");

    pending
        .into_iter()
        .map(|(role, receiver, sink)| {
            let ready = commands.clone();
            view::spawn_view(
                PresentationView::new(role, MarkdownRenderer::default()),
                receiver,
                sink,
                move || {
                    let _ = ready.send(Command::ViewReady(role));
                },
            )
            .expect("Failed to spawn view")
        })
        .collect()
}

#[test]
fn test_views_stay_in_lockstep() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (commands, coordinator) =
        sync::spawn(SyncCoordinator::new()).expect("Failed to spawn coordinator");
    sync::send(
        &commands,
        Command::Load {
            content: deck(3),
            base_path: None,
        },
    )
    .expect("Failed to load");

    let (audience_tx, audience_frames) = mpsc::channel();
    let (presenter_tx, presenter_frames) = mpsc::channel();
    let views = start_views(
        &commands,
        vec![
            (ViewRole::Audience, audience_tx),
            (ViewRole::Presenter, presenter_tx),
        ],
    );

    // Sent before either view may be ready; must still arrive after the load.
    sync::send(&commands, Command::Navigate(Direction::Next)).expect("Failed to navigate");

    let audience = wait_for(&audience_frames, |f| f.index == 1);
    let presenter = wait_for(&presenter_frames, |f| f.index == 1);
    assert_eq!(audience.total, 3);
    assert_eq!(audience.counter, "2 / 3");
    assert_eq!(presenter.total, 3);
    assert!(presenter
        .notes_html
        .as_deref()
        .unwrap_or_default()
        .contains("notes 2"));

    // An edit that removes slides keeps both views on a valid index.
    sync::send(&commands, Command::ContentChanged(deck(1))).expect("Failed to update");
    wait_for(&audience_frames, |f| f.total == 1 && f.index == 0);
    wait_for(&presenter_frames, |f| f.total == 1 && f.index == 0);

    sync::send(&commands, Command::ContentChanged(deck(4))).expect("Failed to update");
    sync::send(&commands, Command::Goto(3)).expect("Failed to goto");
    sync::send(&commands, Command::SetTheme(Theme::Nord)).expect("Failed to set theme");
    let audience = wait_for(&audience_frames, |f| f.theme == Theme::Nord);
    let presenter = wait_for(&presenter_frames, |f| f.theme == Theme::Nord);
    assert_eq!((audience.index, audience.total), (3, 4));
    assert_eq!((presenter.index, presenter.total), (3, 4));

    sync::send(&commands, Command::Shutdown).expect("Failed to shut down");
    let coordinator = coordinator.join().expect("Coordinator panicked");
    assert_eq!(coordinator.content(), deck(4));
    drop(coordinator);

    for handle in views {
        handle.join().expect("View thread panicked");
    }
}

#[test]
fn test_frame_board_receives_view_frames() {
    let board = Arc::new(FrameBoard::new());
    let updates = board.subscribe(Feed::View(ViewRole::Audience));

    let (commands, coordinator) =
        sync::spawn(SyncCoordinator::new()).expect("Failed to spawn coordinator");
    sync::send(
        &commands,
        Command::Load {
            content: deck(2),
            base_path: None,
        },
    )
    .expect("Failed to load");
    let views = start_views(&commands, vec![(ViewRole::Audience, board.clone())]);
    sync::send(&commands, Command::Navigate(Direction::Last)).expect("Failed to navigate");

    let deadline = Instant::now() + TIMEOUT;
    loop {
        let payload = updates
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .expect("Timed out waiting for a frame");
        if payload.contains(r#""counter":"2 / 2""#) {
            break;
        }
    }
    let frame = board.frame(ViewRole::Audience).expect("No frame stored");
    assert_eq!(frame.index, 1);

    drop(commands);
    drop(coordinator.join().expect("Coordinator panicked"));
    for handle in views {
        handle.join().expect("View thread panicked");
    }
}
