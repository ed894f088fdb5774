//! Pure deck transitions: input mapping and message dispatch.
//!
//! This is the core logic of the sequencer. Fully testable without a
//! terminal: nothing here performs I/O, it only returns commands for the
//! effects boundary to carry out.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::config::{DemoId, WrapPolicy};
use crate::effect::Command;
use crate::program::{Pointer, Program, Transition};

use super::state::{Deck, Message};

// ============================================================================
// INPUT MAPPING
// ============================================================================

/// Human-readable key label for the activity log.
pub fn describe_key(key: &KeyEvent) -> String {
    let mut label = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        label.push_str("Ctrl-");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        label.push_str("Alt-");
    }
    match key.code {
        KeyCode::Char(' ') => label.push_str("Space"),
        KeyCode::Char(c) => label.push(c),
        other => label.push_str(&format!("{:?}", other)),
    }
    label
}

/// Pointer events that only report motion are not logged.
fn is_motion(kind: MouseEventKind) -> bool {
    matches!(kind, MouseEventKind::Moved | MouseEventKind::Drag(_))
}

impl Deck {
    /// Messages produced by a key event, in delivery order.
    ///
    /// Ctrl-C quits and Ctrl-K resets the log before anything else sees the
    /// key. Any other press is logged and then offered to the active demo.
    pub fn key_messages(&self, key: KeyEvent) -> Vec<Message> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return vec![Message::Quit],
                KeyCode::Char('k') => return vec![Message::ResetLog],
                _ => {}
            }
        }

        let mut messages = vec![Message::KeyPress(key)];
        let routed = match self.active {
            DemoId::Spinners => map_key(&self.demos.spinners, &self.states.spinners, key, Message::Spinners),
            DemoId::Canvas => map_key(&self.demos.canvas, &self.states.canvas, key, Message::Canvas),
            DemoId::Input => map_key(&self.demos.input, &self.states.input, key, Message::Input),
            DemoId::Mouse => map_key(&self.demos.mouse, &self.states.mouse, key, Message::Mouse),
            DemoId::FlowLayout => map_key(&self.demos.flow, &self.states.flow, key, Message::Flow),
            DemoId::GridLayout => map_key(&self.demos.grid, &self.states.grid, key, Message::Grid),
            DemoId::Colors => map_key(&self.demos.colors, &self.states.colors, key, Message::Colors),
            DemoId::Http => map_key(&self.demos.http, &self.states.http, key, Message::Http),
        };
        messages.extend(routed);
        messages
    }

    /// Messages produced by a pointer event: a log entry for non-motion
    /// events, then whatever the topmost claimed region makes of it.
    pub fn pointer_messages(&self, mouse: MouseEvent) -> Vec<Message> {
        let mut messages = Vec::new();
        if !is_motion(mouse.kind) {
            messages.push(Message::Pointer(mouse));
        }
        let at = Position::new(mouse.column, mouse.row);
        if let Some(region) = self.regions.hit(at) {
            let pointer = Pointer {
                kind: mouse.kind,
                at: region.local(at),
            };
            messages.extend((region.owner)(pointer));
        }
        messages
    }

    /// The active demo's reaction to a clock tick, if any.
    pub fn tick_messages(&self, now: DateTime<Local>) -> Vec<Message> {
        let routed = match self.active {
            DemoId::Spinners => map_tick(&self.demos.spinners, &self.states.spinners, now, Message::Spinners),
            DemoId::Canvas => map_tick(&self.demos.canvas, &self.states.canvas, now, Message::Canvas),
            DemoId::Input => map_tick(&self.demos.input, &self.states.input, now, Message::Input),
            DemoId::Mouse => map_tick(&self.demos.mouse, &self.states.mouse, now, Message::Mouse),
            DemoId::FlowLayout => map_tick(&self.demos.flow, &self.states.flow, now, Message::Flow),
            DemoId::GridLayout => map_tick(&self.demos.grid, &self.states.grid, now, Message::Grid),
            DemoId::Colors => map_tick(&self.demos.colors, &self.states.colors, now, Message::Colors),
            DemoId::Http => map_tick(&self.demos.http, &self.states.http, now, Message::Http),
        };
        routed.into_iter().collect()
    }
}

fn map_key<D: Program>(
    program: &D,
    slot: &Option<D::State>,
    key: KeyEvent,
    lift: fn(D::Msg) -> Message,
) -> Option<Message> {
    program.on_key(active_state(slot), key).map(lift)
}

fn map_tick<D: Program>(
    program: &D,
    slot: &Option<D::State>,
    now: DateTime<Local>,
    lift: fn(D::Msg) -> Message,
) -> Option<Message> {
    program.on_tick(active_state(slot), now).map(lift)
}

/// The active module always has a state; anything else is a deck bug.
pub(super) fn active_state<S>(slot: &Option<S>) -> &S {
    match slot {
        Some(state) => state,
        None => panic!("active demo has no state: activation or rotation skipped initial()"),
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// What happened to the module a message was routed to.
enum Step {
    Continued(Vec<Command<Message>>),
    Terminated,
}

impl Deck {
    /// Apply one message. Returns the commands the effects boundary must run.
    pub fn dispatch(&mut self, message: Message) -> Vec<Command<Message>> {
        match message {
            Message::Quit => {
                tracing::info!("quit requested");
                self.should_quit = true;
                Vec::new()
            }
            Message::KeyPress(key) => {
                self.log.push(format!("Pressed {}", describe_key(&key)));
                Vec::new()
            }
            Message::Pointer(mouse) => {
                self.log
                    .push(format!("Mouse {:?} at ({}, {})", mouse.kind, mouse.column, mouse.row));
                Vec::new()
            }
            Message::ResetLog => {
                self.log.clear();
                Vec::new()
            }
            Message::AppendLog(line) => {
                self.log.push(line);
                Vec::new()
            }
            scoped => self.dispatch_scoped(scoped),
        }
    }

    fn dispatch_scoped(&mut self, message: Message) -> Vec<Command<Message>> {
        let scope = message.scope();
        if scope != Some(self.active) {
            tracing::debug!(?scope, active = %self.active, "dropping message for inactive demo");
            return Vec::new();
        }

        let demos = &self.demos;
        let states = &mut self.states;
        let step = match message {
            Message::Spinners(msg) => step(&demos.spinners, &mut states.spinners, msg, Message::Spinners),
            Message::Canvas(msg) => step(&demos.canvas, &mut states.canvas, msg, Message::Canvas),
            Message::Input(msg) => step(&demos.input, &mut states.input, msg, Message::Input),
            Message::Mouse(msg) => step(&demos.mouse, &mut states.mouse, msg, Message::Mouse),
            Message::Flow(msg) => step(&demos.flow, &mut states.flow, msg, Message::Flow),
            Message::Grid(msg) => step(&demos.grid, &mut states.grid, msg, Message::Grid),
            Message::Colors(msg) => step(&demos.colors, &mut states.colors, msg, Message::Colors),
            Message::Http(msg) => step(&demos.http, &mut states.http, msg, Message::Http),
            Message::Quit
            | Message::KeyPress(_)
            | Message::Pointer(_)
            | Message::ResetLog
            | Message::AppendLog(_) => unreachable!("deck messages are handled before scoping"),
        };

        match step {
            Step::Continued(commands) => {
                let commands = self.take_log_lines(commands);
                self.track(self.active, &commands);
                commands
            }
            Step::Terminated => self.advance(),
        }
    }

    /// The active demo terminated: cancel what it left running, clear the
    /// log and hand over to the next demo.
    fn advance(&mut self) -> Vec<Command<Message>> {
        let finished = self.active;
        let mut commands: Vec<Command<Message>> = self
            .in_flight
            .remove(&finished)
            .unwrap_or_default()
            .into_iter()
            .filter(|handle| handle.is_live())
            .map(Command::Cancel)
            .collect();
        self.log.clear();

        let next = match (finished.next(), self.policy) {
            (Some(next), _) => next,
            (None, WrapPolicy::Cycle) => DemoId::ALL[0],
            (None, WrapPolicy::Exit) => {
                tracing::info!(demo = %finished, "last demo finished, exiting");
                self.should_quit = true;
                return commands;
            }
        };

        tracing::info!(from = %finished, to = %next, "rotating demo");
        self.active = next;
        commands.extend(self.activate(next));
        commands
    }

    /// Make a demo active. Its state is built by `initial` the first time
    /// only; after that the state it terminated with is resumed and no
    /// activation commands are issued.
    pub(super) fn activate(&mut self, demo: DemoId) -> Vec<Command<Message>> {
        let demos = &self.demos;
        let states = &mut self.states;
        let commands = match demo {
            DemoId::Spinners => init(&demos.spinners, &mut states.spinners, Message::Spinners),
            DemoId::Canvas => init(&demos.canvas, &mut states.canvas, Message::Canvas),
            DemoId::Input => init(&demos.input, &mut states.input, Message::Input),
            DemoId::Mouse => init(&demos.mouse, &mut states.mouse, Message::Mouse),
            DemoId::FlowLayout => init(&demos.flow, &mut states.flow, Message::Flow),
            DemoId::GridLayout => init(&demos.grid, &mut states.grid, Message::Grid),
            DemoId::Colors => init(&demos.colors, &mut states.colors, Message::Colors),
            DemoId::Http => init(&demos.http, &mut states.http, Message::Http),
        };
        let Some(commands) = commands else {
            tracing::debug!(%demo, "demo resumed");
            return Vec::new();
        };
        tracing::debug!(%demo, commands = commands.len(), "demo initialized");
        let commands = self.take_log_lines(commands);
        self.track(demo, &commands);
        commands
    }

    /// Module log lines are appended to the deck log right away, before
    /// anything else is dequeued.
    fn take_log_lines(&mut self, commands: Vec<Command<Message>>) -> Vec<Command<Message>> {
        commands
            .into_iter()
            .filter_map(|command| match command {
                Command::Log(line) => {
                    self.log.push(line);
                    None
                }
                other => Some(other),
            })
            .collect()
    }

    /// Remember the effects a demo issued so they can be cancelled when it
    /// terminates. Handles that already settled are forgotten.
    fn track(&mut self, demo: DemoId, commands: &[Command<Message>]) {
        let handles = self.in_flight.entry(demo).or_default();
        handles.retain(|handle| handle.is_live());
        for command in commands {
            if let Command::Issue(request) = command {
                handles.push(request.handle());
            }
        }
    }
}

fn step<D: Program>(
    program: &D,
    slot: &mut Option<D::State>,
    msg: D::Msg,
    lift: fn(D::Msg) -> Message,
) -> Step {
    let Some(state) = slot.take() else {
        panic!("message routed to a demo with no state");
    };
    match program.update(state, msg) {
        Transition::Continue(next, commands) => {
            *slot = Some(next);
            Step::Continued(commands.into_iter().map(|command| command.map(lift)).collect())
        }
        Transition::Terminate(last) => {
            *slot = Some(last);
            Step::Terminated
        }
    }
}

/// Build a demo's state unless this run already has one.
fn init<D: Program>(
    program: &D,
    slot: &mut Option<D::State>,
    lift: fn(D::Msg) -> Message,
) -> Option<Vec<Command<Message>>> {
    if slot.is_some() {
        return None;
    }
    let (state, commands) = program.initial();
    *slot = Some(state);
    Some(commands.into_iter().map(|command| command.map(lift)).collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseButton;

    use crate::config::DeckConfig;
    use crate::demos::{canvas, colors, flow, grid, http, input, mouse, spinners};
    use crate::effect::EffectKind;
    use crate::program::Claims;

    fn deck(initial: DemoId) -> Deck {
        deck_with(initial, WrapPolicy::Cycle)
    }

    fn deck_with(initial: DemoId, on_last: WrapPolicy) -> Deck {
        let config = DeckConfig {
            initial,
            on_last,
            ..DeckConfig::default()
        };
        Deck::start(&config).0
    }

    fn done(demo: DemoId) -> Message {
        match demo {
            DemoId::Spinners => Message::Spinners(spinners::Msg::Done),
            DemoId::Canvas => Message::Canvas(canvas::Msg::Done),
            DemoId::Input => Message::Input(input::Msg::Submit),
            DemoId::Mouse => Message::Mouse(mouse::Msg::Done),
            DemoId::FlowLayout => Message::Flow(flow::Msg::Done),
            DemoId::GridLayout => Message::Grid(grid::Msg::Done),
            DemoId::Colors => Message::Colors(colors::Msg::Done),
            DemoId::Http => Message::Http(http::Msg::Done),
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mouse_event(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    // -- rotation --

    #[test]
    fn demos_rotate_in_registration_order_and_cycle() {
        let mut deck = deck(DemoId::Spinners);
        for expected in DemoId::ALL.iter().skip(1).chain([DemoId::Spinners].iter()) {
            let finished = deck.active;
            deck.dispatch(done(finished));
            assert_eq!(deck.active, *expected);
        }
        assert!(!deck.should_quit);
        assert_eq!(deck.states.initialized(), DemoId::ALL.to_vec());
    }

    #[test]
    fn rotation_clears_the_log() {
        let mut deck = deck(DemoId::Spinners);
        deck.dispatch(Message::AppendLog("hello".into()));
        assert_eq!(deck.log, vec!["hello"]);
        deck.dispatch(done(DemoId::Spinners));
        assert!(deck.log.is_empty());
    }

    #[test]
    fn state_survives_a_full_cycle() {
        let mut deck = deck(DemoId::Colors);
        deck.dispatch(Message::Colors(colors::Msg::Pick(9)));
        for _ in 0..DemoId::ALL.len() {
            let finished = deck.active;
            deck.dispatch(done(finished));
        }
        assert_eq!(deck.active, DemoId::Colors);
        assert_eq!(deck.states.colors.map(|s| s.selected), Some(Some(9)));
    }

    #[test]
    fn demos_are_initialized_once_per_run() {
        let mut deck = deck(DemoId::Colors);
        let first = deck.dispatch(done(DemoId::Colors));
        assert_eq!(deck.active, DemoId::Http);
        assert!(matches!(first.as_slice(), [Command::Issue(_)]));

        let mut issued = 0;
        for _ in 0..DemoId::ALL.len() {
            let finished = deck.active;
            let commands = deck.dispatch(done(finished));
            issued += commands
                .iter()
                .filter(|command| matches!(command, Command::Issue(_)))
                .count();
        }
        assert_eq!(deck.active, DemoId::Http);
        assert_eq!(issued, 0);
        // The request was cancelled on the way out and is not re-sent.
        assert_eq!(
            deck.states.http.as_ref().map(|s| &s.fetch),
            Some(&http::Fetch::Aborted)
        );
    }

    #[test]
    fn start_leaves_other_demos_uninitialized() {
        let deck = deck(DemoId::Canvas);
        assert_eq!(deck.states.initialized(), vec![DemoId::Canvas]);
    }

    #[test]
    fn exit_policy_quits_after_last_demo() {
        let mut deck = deck_with(DemoId::Http, WrapPolicy::Exit);
        let commands = deck.dispatch(done(DemoId::Http));
        assert!(deck.should_quit);
        assert!(deck.states.http.is_some());
        // The activation request was still in flight.
        assert!(matches!(commands.as_slice(), [Command::Cancel(_)]));
    }

    // -- scoping --

    #[test]
    fn messages_for_inactive_demos_are_dropped() {
        let mut deck = deck(DemoId::Spinners);
        let before = deck.states.spinners.clone();
        let commands = deck.dispatch(Message::Canvas(canvas::Msg::Done));
        assert!(commands.is_empty());
        assert_eq!(deck.active, DemoId::Spinners);
        assert_eq!(deck.states.spinners, before);
        assert!(deck.states.canvas.is_none());
    }

    #[test]
    fn active_demo_update_is_applied() {
        let mut deck = deck(DemoId::Spinners);
        deck.dispatch(Message::Spinners(spinners::Msg::NextForeground));
        assert_eq!(deck.states.spinners.as_ref().map(|s| s.foreground), Some(1));
    }

    // -- effects --

    #[test]
    fn http_activation_issues_and_tracks_its_request() {
        let mut deck = deck(DemoId::Colors);
        let commands = deck.dispatch(done(DemoId::Colors));
        assert_eq!(deck.active, DemoId::Http);
        match commands.as_slice() {
            [Command::Issue(request)] => {
                assert!(matches!(request.kind(), EffectKind::HttpGet { .. }));
                assert_eq!(deck.in_flight[&DemoId::Http], vec![request.handle()]);
            }
            other => panic!("Expected one Issue, got {:?}", other),
        }
    }

    #[test]
    fn module_log_lines_are_appended_immediately() {
        let mut deck = deck(DemoId::Mouse);
        let commands = deck.dispatch(Message::Mouse(mouse::Msg::Paint(Position::new(1, 1))));
        assert!(commands.is_empty());
        assert_eq!(deck.log, vec!["drawables: 1"]);
    }

    #[test]
    fn module_log_line_does_not_follow_a_rotation() {
        let mut deck = deck(DemoId::Mouse);
        let mut pending: Vec<Command<Message>> = Vec::new();
        pending.extend(deck.dispatch(Message::Mouse(mouse::Msg::Paint(Position::new(1, 1)))));
        pending.extend(deck.dispatch(done(DemoId::Mouse)));
        for command in pending {
            if let Command::Post(message) = command {
                deck.dispatch(message);
            }
        }
        assert_eq!(deck.active, DemoId::FlowLayout);
        assert!(deck.log.is_empty());
    }

    // -- input mapping --

    #[test]
    fn ctrl_c_quits_before_the_demo_sees_it() {
        let deck = deck(DemoId::Input);
        let messages = deck.key_messages(press(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(messages, vec![Message::Quit]);
    }

    #[test]
    fn ctrl_k_resets_the_log() {
        let mut deck = deck(DemoId::Spinners);
        deck.dispatch(Message::AppendLog("x".into()));
        for message in deck.key_messages(press(KeyCode::Char('k'), KeyModifiers::CONTROL)) {
            deck.dispatch(message);
        }
        assert!(deck.log.is_empty());
    }

    #[test]
    fn key_is_logged_then_routed() {
        let deck = deck(DemoId::Spinners);
        let key = press(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(
            deck.key_messages(key),
            vec![Message::KeyPress(key), Message::Spinners(spinners::Msg::Toggle)]
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let deck = deck(DemoId::Spinners);
        let mut key = press(KeyCode::Enter, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(deck.key_messages(key).is_empty());
    }

    #[test]
    fn pressed_keys_are_logged_readably() {
        let mut deck = deck(DemoId::Spinners);
        deck.dispatch(Message::KeyPress(press(KeyCode::Char('a'), KeyModifiers::NONE)));
        deck.dispatch(Message::KeyPress(press(KeyCode::Char('x'), KeyModifiers::ALT)));
        deck.dispatch(Message::KeyPress(press(KeyCode::Enter, KeyModifiers::NONE)));
        assert_eq!(deck.log, vec!["Pressed a", "Pressed Alt-x", "Pressed Enter"]);
    }

    #[test]
    fn tick_goes_to_the_active_demo_only() {
        let deck = deck(DemoId::Canvas);
        let now = Local::now();
        assert_eq!(deck.tick_messages(now), vec![Message::Canvas(canvas::Msg::Tick(now))]);

        let deck = self::deck(DemoId::Colors);
        assert!(deck.tick_messages(now).is_empty());
    }

    #[test]
    fn pointer_hits_are_routed_in_local_coordinates() {
        let mut deck = deck(DemoId::Colors);
        {
            let mut claims = Claims::new(&mut deck.regions, Message::Colors);
            claims.on_click(ratatui::layout::Rect::new(10, 5, 2, 2), colors::Msg::Pick(3));
        }
        let messages = deck.pointer_messages(mouse_event(MouseEventKind::Down(MouseButton::Left), 11, 6));
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], Message::Pointer(_)));
        assert_eq!(messages[1], Message::Colors(colors::Msg::Pick(3)));
    }

    #[test]
    fn motion_is_routed_but_not_logged() {
        let deck = deck(DemoId::Colors);
        let messages = deck.pointer_messages(mouse_event(MouseEventKind::Moved, 0, 0));
        assert!(messages.is_empty());
    }
}
