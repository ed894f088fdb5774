//! The contract every demo module implements.
//!
//! A module is a pure state machine: `initial` builds its state, `update`
//! consumes state and message and returns the next state plus commands (or
//! terminates), `render` draws without mutating. Raw input reaches a module
//! only through its own pure mapping hooks (`on_key`, `on_tick`) and through
//! pointer regions it claimed while rendering.

use std::rc::Rc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyEvent, MouseButton, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::Frame;

use crate::effect::Command;
use crate::regions::RegionClaimRegistry;

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Result of one `update` step.
#[derive(Debug)]
pub enum Transition<S, M> {
    /// Keep running with this state; execute these commands.
    Continue(S, Vec<Command<M>>),
    /// The module is finished; hand control to the next one. The state is
    /// kept for the next time the module comes round.
    Terminate(S),
}

impl<S, M> Transition<S, M> {
    /// Continue with no commands.
    pub fn state(state: S) -> Self {
        Transition::Continue(state, Vec::new())
    }

    pub fn is_terminate(&self) -> bool {
        matches!(self, Transition::Terminate(_))
    }
}

// ============================================================================
// POINTER ROUTING
// ============================================================================

/// A pointer event in coordinates local to the region that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub kind: MouseEventKind,
    pub at: Position,
}

impl Pointer {
    /// Left button pressed or dragged.
    pub fn is_left_press(&self) -> bool {
        matches!(
            self.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        )
    }

    /// Left button pressed (a click starts here).
    pub fn is_left_down(&self) -> bool {
        matches!(self.kind, MouseEventKind::Down(MouseButton::Left))
    }
}

/// Turns a local pointer event into a message, or ignores it.
pub type PointerHandler<P> = Rc<dyn Fn(Pointer) -> Option<P>>;

/// A module's view of the frame's region table.
///
/// Claims are stored already lifted into the parent message space `P`, so the
/// sequencer can route a hit without knowing which module made the claim.
pub struct Claims<'a, M, P> {
    registry: &'a mut RegionClaimRegistry<PointerHandler<P>>,
    lift: fn(M) -> P,
}

impl<'a, M: 'static, P: 'static> Claims<'a, M, P> {
    pub fn new(registry: &'a mut RegionClaimRegistry<PointerHandler<P>>, lift: fn(M) -> P) -> Self {
        Claims { registry, lift }
    }

    /// Route pointer events inside `rect` through `handler`.
    pub fn on_pointer(&mut self, rect: Rect, handler: impl Fn(Pointer) -> Option<M> + 'static) {
        let lift = self.lift;
        self.registry
            .claim(rect, Rc::new(move |pointer| handler(pointer).map(lift)));
    }

    /// Emit `message` when `rect` is clicked with the left button.
    pub fn on_click(&mut self, rect: Rect, message: M)
    where
        M: Clone,
    {
        self.on_pointer(rect, move |pointer| {
            pointer.is_left_down().then(|| message.clone())
        });
    }
}

// ============================================================================
// PROGRAM
// ============================================================================

/// An independently defined model/update/view module.
pub trait Program {
    type State;
    type Msg: Send + 'static;

    /// Title shown in the sequencer chrome while this module is active.
    fn title(&self) -> &'static str;

    /// Initial state and the commands to run on first activation.
    fn initial(&self) -> (Self::State, Vec<Command<Self::Msg>>);

    /// Pure transition. Never performs I/O.
    fn update(&self, state: Self::State, msg: Self::Msg) -> Transition<Self::State, Self::Msg>;

    /// Draw into `area` and claim pointer regions.
    fn render<P: 'static>(
        &self,
        state: &Self::State,
        frame: &mut Frame,
        area: Rect,
        claims: &mut Claims<'_, Self::Msg, P>,
    );

    /// Map a key press to a message. Unmapped keys return None.
    fn on_key(&self, _state: &Self::State, _key: KeyEvent) -> Option<Self::Msg> {
        None
    }

    /// Map a clock tick (every 100 ms) to a message.
    fn on_tick(&self, _state: &Self::State, _now: DateTime<Local>) -> Option<Self::Msg> {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
