//! Weighted grid of patterned boxes.
//!
//! Each row and each column gets a random relative weight. Rows are
//! separated by a line of `-` and columns by a column of `|`.

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::Widget;
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};

use super::render_instructions;

const PATTERNS: [&str; 10] = [".", "%", "`", ",", "$", "#", "@", ":", "'", "?"];

const INSTRUCTIONS: &[&str] = &["Press <Tab> to randomize the content."];

pub struct Grid {
    seed: u64,
}

impl Grid {
    pub fn new(seed: u64) -> Self {
        Grid { seed }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub weight: f32,
    pub pattern: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub weight: f32,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone)]
pub struct State {
    pub rows: Vec<Row>,
    rng: StdRng,
}

impl State {
    fn randomized(mut rng: StdRng) -> Self {
        let row_count = rng.gen_range(2..6);
        let rows = (0..row_count)
            .map(|_| {
                let weight = 1.0 + 5.0 * rng.r#gen::<f32>();
                let col_count = rng.gen_range(2..6);
                let cells = (0..col_count)
                    .map(|_| Cell {
                        weight: 1.0 + 5.0 * rng.r#gen::<f32>(),
                        pattern: PATTERNS[rng.gen_range(0..PATTERNS.len())],
                    })
                    .collect();
                Row { weight, cells }
            })
            .collect();
        State { rows, rng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Randomize,
    Done,
}

impl Program for Grid {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Grid Layout Demo"
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
        let grid = Rect {
            y: area.y + area.height.min(1),
            height: area.height.saturating_sub(1),
            ..area
        };

        let row_areas = Layout::vertical(with_separators(state.rows.iter().map(|r| r.weight))).split(grid);
        for (i, row) in state.rows.iter().enumerate() {
            let col_areas =
                Layout::horizontal(with_separators(row.cells.iter().map(|c| c.weight))).split(row_areas[2 * i]);
            for (j, cell) in row.cells.iter().enumerate() {
                frame.render_widget(Fill(cell.pattern), col_areas[2 * j]);
                frame.render_widget(Fill("|"), col_areas[2 * j + 1]);
            }
            frame.render_widget(Fill("-"), row_areas[2 * i + 1]);
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

/// A fill constraint per weight, each followed by a one-cell separator.
pub fn with_separators(weights: impl Iterator<Item = f32>) -> Vec<Constraint> {
    weights
        .flat_map(|w| [Constraint::Fill((w * 10.0).round() as u16), Constraint::Length(1)])
        .collect()
}

/// Repeats one glyph over its whole area.
struct Fill(&'static str);

impl Widget for Fill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(self.0);
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
