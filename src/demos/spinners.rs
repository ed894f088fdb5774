//! Spinner glyph sets animated on the deck tick, with palette controls.

use crossterm::event::{KeyCode, KeyEvent};
use chrono::{DateTime, Local};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::effect::Command;
use crate::program::{Claims, Program, Transition};

use super::render_instructions;

const SPINNERS: &[&[&str]] = &[
    &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    &["|", "/", "-", "\\"],
    &["◐", "◓", "◑", "◒"],
    &["▁", "▃", "▄", "▅", "▆", "▇", "█", "▇", "▆", "▅", "▄", "▃"],
    &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
    &["◢", "◣", "◤", "◥"],
    &["·", "•", "●", "•"],
    &["▖", "▘", "▝", "▗"],
];

/// Width of the bouncing bar spinner.
pub const WIDE_WIDTH: usize = 20;
const WIDE_BLOCK: usize = 3;

const INSTRUCTIONS: &[&str] = &[
    "Press ↓↑ to change background colors,",
    "and ←→ to change foreground colors.",
    "Space pauses the spinners.",
];

pub struct Spinners;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub animating: bool,
    pub foreground: u8,
    pub background: u8,
    pub frame: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    Tick,
    Toggle,
    NextForeground,
    PrevForeground,
    NextBackground,
    PrevBackground,
    Done,
}

impl Program for Spinners {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Spinners Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        let state = State {
            animating: true,
            foreground: 0,
            background: 0,
            frame: 0,
        };
        (state, Vec::new())
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Tick => state.frame = state.frame.wrapping_add(1),
            Msg::Toggle => state.animating = !state.animating,
            Msg::NextForeground => state.foreground = state.foreground.wrapping_add(1),
            Msg::PrevForeground => state.foreground = state.foreground.wrapping_sub(1),
            Msg::NextBackground => state.background = state.background.wrapping_add(1),
            Msg::PrevBackground => state.background = state.background.wrapping_sub(1),
            Msg::Done => return Transition::Terminate(state),
        }
        Transition::state(state)
    }

    fn render<P: 'static>(
        &self,
        state: &State,
        frame: &mut Frame,
        area: Rect,
        _claims: &mut Claims<'_, Msg, P>,
    ) {
        let area = render_instructions(INSTRUCTIONS, frame, area);
        let [palette_area, _, spinner_area, wide_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(palette_lines()), palette_area);

        let style = Style::new()
            .fg(Color::Indexed(state.foreground))
            .bg(Color::Indexed(state.background));
        let spinners: Vec<Span> = SPINNERS
            .iter()
            .flat_map(|glyphs| {
                [
                    Span::styled(glyphs[state.frame % glyphs.len()], style),
                    Span::raw(" "),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spinners)).centered(), spinner_area);
        frame.render_widget(
            Paragraph::new(Line::styled(wide_bar(state.frame), style)).centered(),
            wide_area,
        );
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter => Some(Msg::Done),
            KeyCode::Char(' ') => Some(Msg::Toggle),
            KeyCode::Up => Some(Msg::NextBackground),
            KeyCode::Down => Some(Msg::PrevBackground),
            KeyCode::Right => Some(Msg::NextForeground),
            KeyCode::Left => Some(Msg::PrevForeground),
            _ => None,
        }
    }

    fn on_tick(&self, state: &State, _now: DateTime<Local>) -> Option<Msg> {
        state.animating.then_some(Msg::Tick)
    }
}

/// A block bouncing back and forth inside a fixed-width track.
pub fn wide_bar(frame: usize) -> String {
    let travel = WIDE_WIDTH - WIDE_BLOCK;
    let step = frame % (2 * travel);
    let offset = if step <= travel { step } else { 2 * travel - step };
    let mut bar = String::with_capacity(WIDE_WIDTH * 3);
    for i in 0..WIDE_WIDTH {
        bar.push(if (offset..offset + WIDE_BLOCK).contains(&i) { '█' } else { '░' });
    }
    bar
}

/// All 256 indexed colours, sixteen to a row.
fn palette_lines() -> Vec<Line<'static>> {
    (0u16..16)
        .map(|row| {
            let spans: Vec<Span> = (0u16..16)
                .map(|col| {
                    let color = (row * 16 + col) as u8;
                    Span::styled(format!(" {:02X} ", color), Style::new().bg(Color::Indexed(color)))
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
