//! Demo modules composed by the deck.
//!
//! Each module implements [`crate::program::Program`] and knows nothing
//! about the others. Shared here: the instruction footer every demo shows.

pub mod canvas;
pub mod colors;
pub mod flow;
pub mod grid;
pub mod http;
pub mod input;
pub mod mouse;
pub mod spinners;

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::theme;

/// Final line of every instruction footer.
pub const CONTINUE_HINT: &str = "Press <Enter> to continue.";

/// Greedily join instruction lines so each output line fits in `width`.
///
/// The continue hint is always appended last.
pub fn instructions(lines: &[&str], width: u16) -> Vec<String> {
    let mut joined = Vec::new();
    let mut buffer = String::new();
    for line in lines.iter().copied().chain(std::iter::once(CONTINUE_HINT)) {
        if buffer.is_empty() {
            buffer = line.to_string();
        } else if buffer.chars().count() + line.chars().count() + 1 < usize::from(width) {
            buffer.push(' ');
            buffer.push_str(line);
        } else {
            joined.push(std::mem::replace(&mut buffer, line.to_string()));
        }
    }
    joined.push(buffer);
    joined
}

/// Draw the footer at the bottom of `area`; returns the space above it.
pub fn render_instructions(lines: &[&str], frame: &mut Frame, area: Rect) -> Rect {
    let text: Vec<Line> = instructions(lines, area.width)
        .into_iter()
        .map(|line| Line::styled(line, theme::STYLE_HELP))
        .collect();
    let height = (text.len() as u16).min(area.height);
    let footer = Rect {
        y: area.bottom() - height,
        height,
        ..area
    };
    frame.render_widget(Paragraph::new(text), footer);
    Rect {
        height: area.height - height,
        ..area
    }
}

// ============================================================================
// TESTS
// ============================================================================
