//! Rendering: the deck chrome around the active demo.
//!
//! The title sits on row 0, the active demo fills the middle, and the
//! activity log panel takes the bottom rows when the terminal is tall
//! enough. Rendering also rebuilds the pointer claim table, so the only
//! state touched here is `Deck::regions`.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::config::DemoId;
use crate::program::{Claims, PointerHandler, Program};
use crate::regions::RegionClaimRegistry;

use super::state::{Deck, Message};
use super::theme;
use super::update::active_state;

const LOG_MAX_HEIGHT: u16 = 10;
/// Rows a terminal needs beyond the demo before the log panel appears.
const LOG_THRESHOLD: u16 = 30;
const LOG_INSET: u16 = 10;

/// Height of the activity log panel for a screen of `height` rows.
pub fn log_height(height: u16) -> u16 {
    height.saturating_sub(LOG_THRESHOLD).min(LOG_MAX_HEIGHT)
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Render the deck and collect this frame's pointer claims.
pub fn render(deck: &mut Deck, frame: &mut Frame) {
    deck.regions.clear();
    let area = frame.area();

    let [title_area, demo_area, log_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(log_height(area.height)),
    ])
    .areas(area);

    let title = deck_title(deck);
    frame.render_widget(
        Paragraph::new(Line::styled(title, theme::STYLE_TITLE)).centered(),
        title_area,
    );

    let demos = &deck.demos;
    let states = &deck.states;
    let regions = &mut deck.regions;
    match deck.active {
        DemoId::Spinners => render_demo(&demos.spinners, &states.spinners, frame, demo_area, regions, Message::Spinners),
        DemoId::Canvas => render_demo(&demos.canvas, &states.canvas, frame, demo_area, regions, Message::Canvas),
        DemoId::Input => render_demo(&demos.input, &states.input, frame, demo_area, regions, Message::Input),
        DemoId::Mouse => render_demo(&demos.mouse, &states.mouse, frame, demo_area, regions, Message::Mouse),
        DemoId::FlowLayout => render_demo(&demos.flow, &states.flow, frame, demo_area, regions, Message::Flow),
        DemoId::GridLayout => render_demo(&demos.grid, &states.grid, frame, demo_area, regions, Message::Grid),
        DemoId::Colors => render_demo(&demos.colors, &states.colors, frame, demo_area, regions, Message::Colors),
        DemoId::Http => render_demo(&demos.http, &states.http, frame, demo_area, regions, Message::Http),
    }

    render_log(&deck.log, frame, log_area);
}

fn deck_title(deck: &Deck) -> &'static str {
    match deck.active {
        DemoId::Spinners => deck.demos.spinners.title(),
        DemoId::Canvas => deck.demos.canvas.title(),
        DemoId::Input => deck.demos.input.title(),
        DemoId::Mouse => deck.demos.mouse.title(),
        DemoId::FlowLayout => deck.demos.flow.title(),
        DemoId::GridLayout => deck.demos.grid.title(),
        DemoId::Colors => deck.demos.colors.title(),
        DemoId::Http => deck.demos.http.title(),
    }
}

fn render_demo<D: Program>(
    program: &D,
    slot: &Option<D::State>,
    frame: &mut Frame,
    area: Rect,
    regions: &mut RegionClaimRegistry<PointerHandler<Message>>,
    lift: fn(D::Msg) -> Message,
) {
    let mut claims = Claims::new(regions, lift);
    program.render(active_state(slot), frame, area, &mut claims);
}

// ============================================================================
// ACTIVITY LOG
// ============================================================================

/// Bordered panel showing the newest log entries that fit.
fn render_log(log: &[String], frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let panel = Rect {
        x: area.x + LOG_INSET.min(area.width),
        width: area.width.saturating_sub(2 * LOG_INSET),
        ..area
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::STYLE_DIM);
    let inner = block.inner(panel);
    let visible = usize::from(inner.height);
    let lines: Vec<Line> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|entry| Line::raw(format!(" {}", entry)))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), panel);
}

// ============================================================================
// TESTS
// ============================================================================
