//! TUI effects boundary: event loop, terminal lifecycle, producer threads.
//!
//! This is the only module with side effects. It wires the pure layers
//! (state, update, view) to the real terminal via crossterm and ratatui,
//! and hands commands to the effect executor.
//!
//! Architecture: producer threads feed a single mpsc channel.
//! - Input reader thread: forwards crossterm key, mouse and resize events
//! - Ticker thread: sends the wall-clock time every 100 ms
//! - Effect workers: send results through the executor
//! The event loop is the only consumer and the only place state changes.

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::config::DeckConfig;
use crate::effect::{Completion, EffectExecutor};

use super::state::{AppEvent, Deck, Message};
use super::view::render;

/// Interval between clock ticks.
pub const TICK: Duration = Duration::from_millis(100);

type Executor = EffectExecutor<Message, AppEvent>;

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Set up the terminal for TUI mode.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    io::stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    io::stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

// ============================================================================
// BACKGROUND THREADS
// ============================================================================

/// Spawn a thread that reads crossterm events and forwards them to the channel.
fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            let event = match event::read() {
                Ok(Event::Key(key)) => AppEvent::Key(key),
                Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
                Ok(Event::Resize(..)) => AppEvent::Resize,
                Ok(_) => continue, // focus and paste events are not used
                Err(error) => {
                    tracing::warn!(%error, "input reader stopped");
                    break;
                }
            };
            if tx.send(event).is_err() {
                break; // receiver dropped, TUI is shutting down
            }
        }
    });
}

/// Spawn a thread that sends a tick carrying the current time.
fn spawn_ticker(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        loop {
            thread::sleep(TICK);
            if tx.send(AppEvent::Tick(Local::now())).is_err() {
                break;
            }
        }
    });
}

// ============================================================================
// EVENT HANDLING
// ============================================================================

/// Turn one channel event into deck messages.
///
/// Effect results pass through [`EffectExecutor::settle`] first; a result
/// whose effect was cancelled after it was queued yields nothing.
pub fn event_messages(deck: &Deck, executor: &mut Executor, event: AppEvent) -> Vec<Message> {
    match event {
        AppEvent::Key(key) => deck.key_messages(key),
        AppEvent::Mouse(mouse) => deck.pointer_messages(mouse),
        AppEvent::Tick(now) => deck.tick_messages(now),
        AppEvent::Resize => Vec::new(),
        AppEvent::Inbound(Completion::Post(message)) => vec![message],
        AppEvent::Inbound(Completion::Settled { id, message }) => {
            if executor.settle(id) {
                vec![message]
            } else {
                Vec::new()
            }
        }
    }
}

/// Dispatch messages in order, carrying out each one's commands before
/// the next message is applied.
pub fn apply(deck: &mut Deck, executor: &mut Executor, messages: Vec<Message>) {
    for message in messages {
        if deck.should_quit {
            break;
        }
        for command in deck.dispatch(message) {
            executor.perform(command);
        }
    }
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the deck until the user quits (or the last demo exits under the
/// exit policy).
pub fn run(config: &DeckConfig) -> io::Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let mut executor: Executor = EffectExecutor::new(tx.clone());

    let (mut deck, commands) = Deck::start(config);
    tracing::info!(demo = %deck.active, policy = ?deck.policy, "deck started");
    for command in commands {
        executor.perform(command);
    }

    spawn_input_reader(tx.clone());
    spawn_ticker(tx);

    loop {
        // Check quit flag before drawing a frame nobody will see
        if deck.should_quit {
            break;
        }

        terminal.draw(|frame| render(&mut deck, frame))?;

        // Block on next event from any producer
        let event = match rx.recv() {
            Ok(e) => e,
            Err(_) => break, // all senders dropped
        };

        let messages = event_messages(&deck, &mut executor, event);
        apply(&mut deck, &mut executor, messages);
    }

    executor.shutdown();
    restore_terminal()?;
    tracing::info!("deck stopped");
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use crate::config::DemoId;
    use crate::demos::{http, spinners};
    use crate::effect::{Command, EffectRequest};
    use crate::fetch::HttpResponse;

    const WAIT: Duration = Duration::from_millis(500);

    fn setup(initial: DemoId) -> (Deck, Executor, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let config = DeckConfig {
            initial,
            ..DeckConfig::default()
        };
        (Deck::start(&config).0, EffectExecutor::new(tx), rx)
    }

    fn ok_response() -> Result<HttpResponse, crate::fetch::FetchError> {
        Ok(HttpResponse {
            status: 200,
            headers: vec![],
            body: b"It was a dark and stormy night".to_vec(),
        })
    }

    #[test]
    fn ctrl_c_quits() {
        let (mut deck, mut exec, _rx) = setup(DemoId::Spinners);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let messages = event_messages(&deck, &mut exec, AppEvent::Key(key));
        apply(&mut deck, &mut exec, messages);
        assert!(deck.should_quit);
    }

    #[test]
    fn enter_rotates_to_next_demo() {
        let (mut deck, mut exec, _rx) = setup(DemoId::Spinners);
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let messages = event_messages(&deck, &mut exec, AppEvent::Key(key));
        apply(&mut deck, &mut exec, messages);
        assert_eq!(deck.active, DemoId::Canvas);
        // The key was logged and the log then cleared by the rotation.
        assert!(deck.log.is_empty());
    }

    #[test]
    fn posted_messages_arrive_through_the_channel() {
        let (mut deck, mut exec, rx) = setup(DemoId::Spinners);
        exec.perform(Command::Post(Message::Spinners(spinners::Msg::Toggle)));
        let event = rx.recv_timeout(WAIT).expect("posted");
        let messages = event_messages(&deck, &mut exec, event);
        apply(&mut deck, &mut exec, messages);
        assert_eq!(deck.states.spinners.as_ref().map(|s| s.animating), Some(false));
    }

    #[test]
    fn settled_result_reaches_the_active_demo() {
        let (mut deck, mut exec, rx) = setup(DemoId::Http);
        let request = EffectRequest::task("canned", |_| http::Msg::Received(ok_response()))
            .map(Message::Http);
        let handle = exec.issue(request);
        deck.states.http.as_mut().expect("active").fetch = http::Fetch::InFlight(handle);

        let event = rx.recv_timeout(WAIT).expect("result");
        let messages = event_messages(&deck, &mut exec, event);
        apply(&mut deck, &mut exec, messages);
        assert!(matches!(
            deck.states.http.as_ref().map(|s| &s.fetch),
            Some(http::Fetch::Loaded { status: 200, .. })
        ));
    }

    #[test]
    fn result_cancelled_after_enqueue_is_dropped() {
        let (mut deck, mut exec, rx) = setup(DemoId::Http);
        let request = EffectRequest::task("canned", |_| http::Msg::Received(ok_response()))
            .map(Message::Http);
        let handle = exec.issue(request);

        let event = rx.recv_timeout(WAIT).expect("result");
        exec.cancel(&handle);
        let messages = event_messages(&deck, &mut exec, event);
        assert!(messages.is_empty());
        apply(&mut deck, &mut exec, messages);
        assert!(matches!(
            deck.states.http.as_ref().map(|s| &s.fetch),
            Some(http::Fetch::InFlight(_))
        ));
    }

    #[test]
    fn stale_result_for_rotated_demo_is_dropped() {
        let (mut deck, mut exec, rx) = setup(DemoId::Http);
        let request = EffectRequest::task("canned", |_| http::Msg::Received(ok_response()))
            .map(Message::Http);
        exec.issue(request);
        let event = rx.recv_timeout(WAIT).expect("result");

        // Leave Http before the result is handled.
        apply(&mut deck, &mut exec, vec![Message::Http(http::Msg::Done)]);
        assert_eq!(deck.active, DemoId::Spinners);

        let messages = event_messages(&deck, &mut exec, event);
        apply(&mut deck, &mut exec, messages);
        assert_eq!(deck.active, DemoId::Spinners);
        assert_eq!(
            deck.states.http.as_ref().map(|s| &s.fetch),
            Some(&http::Fetch::Aborted)
        );
    }

    #[test]
    fn nothing_is_applied_after_quit() {
        let (mut deck, mut exec, _rx) = setup(DemoId::Spinners);
        apply(
            &mut deck,
            &mut exec,
            vec![Message::Quit, Message::AppendLog("late".into())],
        );
        assert!(deck.should_quit);
        assert!(deck.log.is_empty());
    }
}
