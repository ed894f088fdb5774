//! Deck state algebra: pure types, zero effects.
//!
//! The deck composes the demos as a closed sum. Every demo keeps its own
//! state slot, filled by `initial` the first time the demo becomes active
//! and kept for the rest of the run, so a demo resumes where it left off.
//!
//! Design principle: module messages are tagged with the module they belong
//! to ([`Message::scope`]). The deck drops a tagged message whose module is
//! not active instead of routing it anywhere.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use crossterm::event::{KeyEvent, MouseEvent};

use crate::config::{DeckConfig, DemoId, WrapPolicy};
use crate::demos::{canvas, colors, flow, grid, http, input, mouse, spinners};
use crate::effect::{Command, Completion, EffectHandle};
use crate::program::PointerHandler;
use crate::regions::RegionClaimRegistry;

// ============================================================================
// APP EVENTS
// ============================================================================

/// Everything the event loop can receive from its channel.
///
/// Producers feeding the single mpsc channel:
/// - the input reader thread sends `Key`, `Mouse` and `Resize`
/// - the ticker thread sends `Tick` every 100 ms
/// - effect workers and posted commands arrive as `Inbound`
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Tick(DateTime<Local>),
    Resize,
    Inbound(Completion<Message>),
}

impl From<Completion<Message>> for AppEvent {
    fn from(completion: Completion<Message>) -> Self {
        AppEvent::Inbound(completion)
    }
}

// ============================================================================
// MESSAGES
// ============================================================================

/// The deck's message space.
///
/// Global variants are handled by the deck itself; the rest carry one
/// module's message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    /// Any key press, for the activity log.
    KeyPress(KeyEvent),
    /// Any non-motion pointer event, for the activity log.
    Pointer(MouseEvent),
    ResetLog,
    AppendLog(String),
    Spinners(spinners::Msg),
    Canvas(canvas::Msg),
    Input(input::Msg),
    Mouse(mouse::Msg),
    Flow(flow::Msg),
    Grid(grid::Msg),
    Colors(colors::Msg),
    Http(http::Msg),
}

impl Message {
    /// The module a message belongs to, or None for deck-level messages.
    pub fn scope(&self) -> Option<DemoId> {
        match self {
            Message::Quit
            | Message::KeyPress(_)
            | Message::Pointer(_)
            | Message::ResetLog
            | Message::AppendLog(_) => None,
            Message::Spinners(_) => Some(DemoId::Spinners),
            Message::Canvas(_) => Some(DemoId::Canvas),
            Message::Input(_) => Some(DemoId::Input),
            Message::Mouse(_) => Some(DemoId::Mouse),
            Message::Flow(_) => Some(DemoId::FlowLayout),
            Message::Grid(_) => Some(DemoId::GridLayout),
            Message::Colors(_) => Some(DemoId::Colors),
            Message::Http(_) => Some(DemoId::Http),
        }
    }
}

// ============================================================================
// DECK
// ============================================================================

/// The registered modules.
pub struct Demos {
    pub spinners: spinners::Spinners,
    pub canvas: canvas::Canvas,
    pub input: input::Input,
    pub mouse: mouse::Mouse,
    pub flow: flow::Flow,
    pub grid: grid::Grid,
    pub colors: colors::Colors,
    pub http: http::Http,
}

impl Demos {
    pub fn new(seed: u64) -> Self {
        Demos {
            spinners: spinners::Spinners,
            canvas: canvas::Canvas,
            input: input::Input,
            mouse: mouse::Mouse,
            flow: flow::Flow::new(seed),
            grid: grid::Grid::new(seed.wrapping_add(1)),
            colors: colors::Colors,
            http: http::Http,
        }
    }
}

/// One state slot per module. A slot is None until its module first runs.
#[derive(Debug, Default)]
pub struct DemoStates {
    pub spinners: Option<spinners::State>,
    pub canvas: Option<canvas::State>,
    pub input: Option<input::State>,
    pub mouse: Option<mouse::State>,
    pub flow: Option<flow::State>,
    pub grid: Option<grid::State>,
    pub colors: Option<colors::State>,
    pub http: Option<http::State>,
}

impl DemoStates {
    /// Demos that have been initialized this run, in registration order.
    pub fn initialized(&self) -> Vec<DemoId> {
        let slots = [
            (DemoId::Spinners, self.spinners.is_some()),
            (DemoId::Canvas, self.canvas.is_some()),
            (DemoId::Input, self.input.is_some()),
            (DemoId::Mouse, self.mouse.is_some()),
            (DemoId::FlowLayout, self.flow.is_some()),
            (DemoId::GridLayout, self.grid.is_some()),
            (DemoId::Colors, self.colors.is_some()),
            (DemoId::Http, self.http.is_some()),
        ];
        slots
            .into_iter()
            .filter_map(|(demo, present)| present.then_some(demo))
            .collect()
    }
}

/// Top-level model: the sequencer over all demos.
pub struct Deck {
    pub demos: Demos,
    pub states: DemoStates,
    pub active: DemoId,
    /// Shared activity log, cleared on every rotation.
    pub log: Vec<String>,
    pub policy: WrapPolicy,
    /// Pointer claims from the last rendered frame.
    pub regions: RegionClaimRegistry<PointerHandler<Message>>,
    /// Effects issued by each module that may still be live.
    pub in_flight: HashMap<DemoId, Vec<EffectHandle>>,
    pub should_quit: bool,
}

impl Deck {
    /// Build the deck and activate the configured first demo.
    ///
    /// The returned commands are that demo's activation commands.
    pub fn start(config: &DeckConfig) -> (Deck, Vec<Command<Message>>) {
        let mut deck = Deck {
            demos: Demos::new(config.seed),
            states: DemoStates::default(),
            active: config.initial,
            log: Vec::new(),
            policy: config.on_last,
            regions: RegionClaimRegistry::new(),
            in_flight: HashMap::new(),
            should_quit: false,
        };
        let commands = deck.activate(config.initial);
        (deck, commands)
    }
}

// ============================================================================
// TESTS
// ============================================================================
