//! Fetches a book over HTTP through the effect executor.
//!
//! The request is issued on first activation. Re-requesting while one is in
//! flight cancels the old request and replaces it, so at most one result can
//! ever reach the state.

use crossterm::event::{KeyCode, KeyEvent};
use humansize::{format_size, DECIMAL};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::effect::{Command, EffectHandle, EffectRequest};
use crate::fetch::{FetchError, HttpResponse};
use crate::program::{Claims, Program, Transition};
use crate::tui::theme;

use super::render_instructions;
use super::spinners::wide_bar;

pub const BOOK_URL: &str = "http://www.gutenberg.org/cache/epub/1661/pg1661.txt";

const PAGE: i16 = 20;

const INSTRUCTIONS: &[&str] = &[
    "Press ↓↑ to scroll,",
    "x to abort,",
    "r to request again.",
];

pub struct Http;

/// Where the request stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetch {
    InFlight(EffectHandle),
    Loaded { status: u16, bytes: usize, text: String },
    Failed(String),
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub fetch: Fetch,
    pub offset: u16,
    pub spinner: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Send,
    Scroll(i16),
    Abort,
    Received(Result<HttpResponse, FetchError>),
    Tick,
    Done,
}

fn request() -> (EffectHandle, Command<Msg>) {
    let request = EffectRequest::http_get(BOOK_URL, Msg::Received);
    (request.handle(), Command::Issue(request))
}

impl Program for Http {
    type State = State;
    type Msg = Msg;

    fn title(&self) -> &'static str {
        "Http Demo"
    }

    fn initial(&self) -> (State, Vec<Command<Msg>>) {
        let (handle, issue) = request();
        let state = State {
            fetch: Fetch::InFlight(handle),
            offset: 0,
            spinner: 0,
        };
        (state, vec![issue])
    }

    fn update(&self, mut state: State, msg: Msg) -> Transition<State, Msg> {
        match msg {
            Msg::Send => {
                let mut commands = Vec::with_capacity(2);
                if let Fetch::InFlight(old) = &state.fetch {
                    commands.push(Command::Cancel(old.clone()));
                }
                let (handle, issue) = request();
                commands.push(issue);
                state.fetch = Fetch::InFlight(handle);
                state.offset = 0;
                Transition::Continue(state, commands)
            }
            Msg::Abort => match std::mem::replace(&mut state.fetch, Fetch::Aborted) {
                Fetch::InFlight(handle) => Transition::Continue(state, vec![Command::Cancel(handle)]),
                settled => {
                    state.fetch = settled;
                    Transition::state(state)
                }
            },
            Msg::Received(result) => {
                state.fetch = match result.and_then(|response| {
                    let text = response.text()?;
                    Ok((response.status, response.body.len(), text))
                }) {
                    Ok((status, bytes, text)) => Fetch::Loaded { status, bytes, text },
                    Err(error) => Fetch::Failed(error.to_string()),
                };
                Transition::state(state)
            }
            Msg::Scroll(dy) => {
                let max = match &state.fetch {
                    Fetch::Loaded { text, .. } => text.lines().count().saturating_sub(1),
                    _ => 0,
                };
                let max = u16::try_from(max).unwrap_or(u16::MAX);
                state.offset = state.offset.saturating_add_signed(dy).min(max);
                Transition::state(state)
            }
            Msg::Tick => {
                state.spinner = state.spinner.wrapping_add(1);
                Transition::state(state)
            }
            Msg::Done => {
                // The deck cancels whatever is still running when we leave.
                if matches!(state.fetch, Fetch::InFlight(_)) {
                    state.fetch = Fetch::Aborted;
                }
                Transition::Terminate(state)
            }
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
        let [status_area, body_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

        match &state.fetch {
            Fetch::InFlight(_) => {
                frame.render_widget(Paragraph::new(format!("GET {}", BOOK_URL)), status_area);
                let [_, middle, _] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(1),
                    Constraint::Fill(1),
                ])
                .areas(body_area);
                frame.render_widget(
                    Paragraph::new(Line::styled(wide_bar(state.spinner), theme::STYLE_INTERACTIVE))
                        .centered(),
                    middle,
                );
            }
            Fetch::Loaded { status, bytes, text } => {
                let style = if (200..300).contains(status) {
                    theme::STYLE_SAFE
                } else {
                    theme::STYLE_WARNING
                };
                frame.render_widget(
                    Paragraph::new(Line::styled(
                        format!("HTTP {} · {}", status, format_size(*bytes, DECIMAL)),
                        style,
                    )),
                    status_area,
                );
                let visible: Vec<Line> = text
                    .lines()
                    .skip(usize::from(state.offset))
                    .take(usize::from(body_area.height))
                    .map(Line::raw)
                    .collect();
                frame.render_widget(Paragraph::new(visible), body_area);
            }
            Fetch::Failed(error) => {
                frame.render_widget(
                    Paragraph::new(Line::styled(error.as_str(), theme::STYLE_DANGER)),
                    body_area,
                );
            }
            Fetch::Aborted => {
                frame.render_widget(Paragraph::new("Aborted."), body_area);
            }
        }
    }

    fn on_key(&self, _state: &State, key: KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Up => Some(Msg::Scroll(-1)),
            KeyCode::Down => Some(Msg::Scroll(1)),
            KeyCode::PageUp => Some(Msg::Scroll(-PAGE)),
            KeyCode::PageDown => Some(Msg::Scroll(PAGE)),
            KeyCode::Char('x') | KeyCode::Esc => Some(Msg::Abort),
            KeyCode::Char('r') => Some(Msg::Send),
            KeyCode::Enter => Some(Msg::Done),
            _ => None,
        }
    }

    fn on_tick(&self, state: &State, _now: chrono::DateTime<chrono::Local>) -> Option<Msg> {
        matches!(state.fetch, Fetch::InFlight(_)).then_some(Msg::Tick)
    }
}

// ============================================================================
// TESTS
// ============================================================================
