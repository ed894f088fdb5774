//! Clickable swatches for the 256-colour palette.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};

use super::render_instructions;

const SAMPLE: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890!@#$%^&*()-<>[]{}.";
const SAMPLE_TOP: u16 = 12;
const SAMPLE_LEFT: u16 = 4;

const INSTRUCTIONS: &[&str] = &["Click on the color you like."];

pub struct Colors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State {
    pub selected: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Pick(u8),
    Done,
}

/// Top-left cell of each colour's 2×2 swatch, relative to the demo area.
///
/// The sixteen system colours fill two columns of eight; the other 240 fill
/// forty columns of six.
pub fn swatch_origin(color: u8) -> (u16, u16) {
    let c = u16::from(color);
    let (col, row) = if c < 16 {
        (c / 8, c % 8)
    } else {
        (2 + (c - 16) / 6, (c - 16) % 6)
    };
    (col * 2, row * 2)
}

impl Program for Colors {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Colors Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        (State::default(), Vec::new())
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Pick(color) => {
                state.selected = Some(color);
                Transition::state(state)
            }
            Msg::Done => Transition::Terminate(state),
        }
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);

        for color in 0..=u8::MAX {
            let (x, y) = swatch_origin(color);
            let rect = Rect::new(area.x + x, area.y + y, 2, 2).intersection(area);
            if rect.is_empty() {
                continue;
            }
            let swatch = Style::new().bg(Color::Indexed(color));
            frame.render_widget(Paragraph::new(vec![Line::styled("  ", swatch); 2]), rect);
            claims.on_click(rect, Msg::Pick(color));
        }

        let Some(color) = state.selected else { return };
        let fg = Style::new().fg(Color::Indexed(color));
        let lines = vec![
            Line::raw(format!("Selected color: {}", color)),
            Line::styled(SAMPLE, fg),
            Line::styled(" ".repeat(SAMPLE.len()), Style::new().bg(Color::Indexed(color))),
            Line::styled(SAMPLE, fg.add_modifier(Modifier::REVERSED)),
        ];
        let sample = Rect {
            x: area.x + SAMPLE_LEFT,
            y: area.y + SAMPLE_TOP,
            width: area.width.saturating_sub(SAMPLE_LEFT),
            height: lines.len() as u16,
        }
        .intersection(area);
        frame.render_widget(Paragraph::new(lines), sample);
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter => Some(Msg::Done),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
