//! Flow layout of randomly sized letter squares.
//!
//! Squares are packed along the main axis and wrap onto a new line when
//! the next one would not fit. Right-to-left mirrors the cross axis order.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};

use super::render_instructions;

const GLYPHS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ12345678910";
const MIN_SIDE: u16 = 3;
const SIDE_RANGE: u16 = 10;

const INSTRUCTIONS: &[&str] = &["Press <Tab> to randomize the content."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => write!(f, "horizontal"),
            Orientation::Vertical => write!(f, "vertical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ltr,
    Rtl,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ltr => write!(f, "ltr"),
            Direction::Rtl => write!(f, "rtl"),
        }
    }
}

/// A square of one repeated character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub glyph: char,
    pub side: u16,
}

impl Square {
    fn text(&self) -> String {
        let row: String = std::iter::repeat_n(self.glyph, usize::from(self.side)).collect();
        vec![row; usize::from(self.side)].join("\n")
    }
}

pub struct Flow {
    seed: u64,
}

impl Flow {
    pub fn new(seed: u64) -> Self {
        Flow { seed }
    }
}

#[derive(Debug, Clone)]
pub struct State {
    pub orientation: Orientation,
    pub direction: Direction,
    pub squares: Vec<Square>,
    rng: StdRng,
}

impl State {
    fn randomized(mut rng: StdRng) -> Self {
        let orientation = if rng.gen_bool(0.5) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        let direction = if rng.gen_bool(0.5) {
            Direction::Ltr
        } else {
            Direction::Rtl
        };
        let squares = GLYPHS
            .chars()
            .map(|glyph| Square {
                glyph,
                side: MIN_SIDE + rng.gen_range(0..SIDE_RANGE),
            })
            .collect();
        State {
            orientation,
            direction,
            squares,
            rng,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Randomize,
    Done,
}

impl Program for Flow {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Flow Layout Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        (State::randomized(StdRng::seed_from_u64(self.seed)), Vec::new())
    }

    fn update(&self, state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Randomize => {
                let mut rng = state.rng;
                let reseeded = StdRng::seed_from_u64(rng.r#gen());
                Transition::state(State::randomized(reseeded))
            }
            Msg::Done => Transition::Terminate(state),
        }
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        _claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);
        if area.height == 0 {
            return;
        }
        frame.render_widget(
            Paragraph::new(format!("{}  ---  {}", state.orientation, state.direction)),
            Rect { height: 1, ..area },
        );

        let body = Rect {
            y: area.y + 1,
            height: area.height - 1,
            ..area
        };
        let sizes: Vec<u16> = state.squares.iter().map(|s| s.side).collect();
        let placed = flow_positions(&sizes, body.width, body.height, state.orientation, state.direction);
        for (square, slot) in state.squares.iter().zip(placed) {
            let Some(slot) = slot else { continue };
            let rect = Rect {
                x: body.x + slot.x,
                y: body.y + slot.y,
                ..slot
            };
            frame.render_widget(Paragraph::new(square.text()), rect);
        }
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Tab => Some(Msg::Randomize),
            KeyCode::Enter => Some(Msg::Done),
            _ => None,
        }
    }
}

/// Pack squares of the given sides into `width × height`, relative to the
/// origin. Squares that do not fit get None.
pub fn flow_positions(
    sides: &[u16],
    width: u16,
    height: u16,
    orientation: Orientation,
    direction: Direction,
) -> Vec<Option<Rect>> {
    // Work in (main, cross) coordinates and transpose for vertical flows.
    let (main_len, cross_len) = match orientation {
        Orientation::Horizontal => (width, height),
        Orientation::Vertical => (height, width),
    };

    let mut main = 0u16;
    let mut cross = 0u16;
    let mut line = 0u16;
    let mut placed = Vec::with_capacity(sides.len());

    for &side in sides {
        if main > 0 && main + side > main_len {
            cross += line;
            main = 0;
            line = 0;
        }
        if side > main_len || cross + side > cross_len {
            placed.push(None);
            continue;
        }

        let (x, y) = match orientation {
            Orientation::Horizontal => (main, cross),
            Orientation::Vertical => (cross, main),
        };
        let x = match direction {
            Direction::Ltr => x,
            Direction::Rtl => width - x - side,
        };
        placed.push(Some(Rect::new(x, y, side, side)));
        main += side;
        line = line.max(side);
    }
    placed
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_flow_wraps_onto_next_row() {
        let placed = flow_positions(&[3, 4, 5], 8, 20, Orientation::Horizontal, Direction::Ltr);
        assert_eq!(
            placed,
            vec![
                Some(Rect::new(0, 0, 3, 3)),
                Some(Rect::new(3, 0, 4, 4)),
                Some(Rect::new(0, 4, 5, 5)),
            ]
        );
    }

    #[test]
    fn rtl_mirrors_columns() {
        let placed = flow_positions(&[3, 4], 10, 10, Orientation::Horizontal, Direction::Rtl);
        assert_eq!(placed, vec![Some(Rect::new(7, 0, 3, 3)), Some(Rect::new(3, 0, 4, 4))]);
    }

    #[test]
    fn vertical_flow_fills_columns_first() {
        let placed = flow_positions(&[3, 3, 3], 20, 7, Orientation::Vertical, Direction::Ltr);
        assert_eq!(
            placed,
            vec![
                Some(Rect::new(0, 0, 3, 3)),
                Some(Rect::new(0, 3, 3, 3)),
                Some(Rect::new(3, 0, 3, 3)),
            ]
        );
    }

    #[test]
    fn overflow_is_left_unplaced() {
        let placed = flow_positions(&[4, 4, 12], 8, 4, Orientation::Horizontal, Direction::Ltr);
        assert_eq!(placed[2], None);
        assert!(placed[..2].iter().all(Option::is_some));
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let a = Flow::new(7).initial().0;
        let b = Flow::new(7).initial().0;
        assert_eq!(a.squares, b.squares);
        assert_eq!(a.orientation, b.orientation);
        assert_eq!(a.squares.len(), GLYPHS.chars().count());
        assert!(a.squares.iter().all(|s| (3..13).contains(&s.side)));
    }

    #[test]
    fn randomize_draws_a_new_layout() {
        let start = Flow::new(11).initial().0;
        let before = start.squares.clone();
        let next = match Flow::new(11).update(start, Msg::Randomize) {
            Transition::Continue(state, _) => state,
            Transition::Terminate(_) => panic!("Expected Continue"),
        };
        assert_ne!(next.squares, before);
    }

    #[test]
    fn square_text_is_side_by_side() {
        let square = Square { glyph: 'x', side: 3 };
        assert_eq!(square.text(), "xxx\nxxx\nxxx");
    }
}
