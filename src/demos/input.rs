//! Two text inputs with keyboard and pointer focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};
use crate::tui::theme;

use super::render_instructions;

const CURSOR: &str = "█";
const INPUT_COUNT: usize = 2;

const INSTRUCTIONS: &[&str] = &[
    "Press tab to switch inputs,",
    "or click an input to focus it.",
    "Enter in the second input adds a line.",
];

pub struct Input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub active: usize,
    pub inputs: [String; INPUT_COUNT],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Insert(char),
    Backspace,
    Newline,
    Next,
    Prev,
    Focus(usize),
    Submit,
}

impl Program for Input {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Input Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        let state = State {
            active: 0,
            inputs: [String::new(), String::new()],
        };
        (state, Vec::new())
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Insert(c) => state.inputs[state.active].push(c),
            Msg::Backspace => {
                state.inputs[state.active].pop();
            }
            Msg::Newline => state.inputs[state.active].push('\n'),
            Msg::Next => state.active = (state.active + 1) % INPUT_COUNT,
            Msg::Prev => state.active = (state.active + INPUT_COUNT - 1) % INPUT_COUNT,
            Msg::Focus(index) if index < INPUT_COUNT => state.active = index,
            Msg::Focus(_) => {}
            Msg::Submit => return Transition::Terminate(state),
        }
        Transition::state(state)
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);
        let [single, multi, _] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(0),
        ])
        .areas(area);

        for (index, rect) in [single, multi].into_iter().enumerate() {
            let focused = state.active == index;
            let block = Block::default()
                .borders(Borders::ALL)
                .title(if index == 0 { " Name " } else { " Notes " })
                .border_style(if focused {
                    theme::STYLE_IMPORTANT
                } else {
                    theme::STYLE_DIM
                });
            let mut lines: Vec<Line> = state.inputs[index].split('\n').map(Line::raw).collect();
            if focused {
                if let Some(last) = lines.last_mut() {
                    last.push_span(Span::styled(CURSOR, theme::STYLE_INTERACTIVE));
                }
            }
            frame.render_widget(
                Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
                rect,
            );
            claims.on_click(rect, Msg::Focus(index));
        }
    }

    fn on_key(&self, state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Tab => Some(Msg::Next),
            KeyCode::BackTab => Some(Msg::Prev),
            KeyCode::Enter if state.active == 0 => Some(Msg::Submit),
            KeyCode::Enter => Some(Msg::Newline),
            KeyCode::Backspace => Some(Msg::Backspace),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Some(Msg::Insert(c)),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
