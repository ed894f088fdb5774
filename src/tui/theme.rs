//! TUI color semantics and style constants.
//!
//! Centralized so the chrome and the demos agree on what a color means.
//!
//! Color semantics:
//! - Green: success (2xx responses)
//! - Yellow: attention (non-2xx responses)
//! - Red: failure text
//! - Cyan: live or interactive elements (cursor, spinners, canvas ink)
//! - Dim: de-emphasized (borders of unfocused widgets, footers)
//! - Bold: important (focused borders, the clock label)

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// SEMANTIC STYLES
// ============================================================================

/// Success: green.
pub const STYLE_SAFE: Style = Style::new().fg(Color::Green);

/// Attention needed: yellow.
pub const STYLE_WARNING: Style = Style::new().fg(Color::Yellow);

/// Failure: red.
pub const STYLE_DANGER: Style = Style::new().fg(Color::Red);

/// Interactive element: cyan.
pub const STYLE_INTERACTIVE: Style = Style::new().fg(Color::Cyan);

/// De-emphasized: dark gray.
pub const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);

/// Important text: bold.
pub const STYLE_IMPORTANT: Style = Style::new().add_modifier(Modifier::BOLD);

// ============================================================================
// UI ELEMENT STYLES
// ============================================================================

/// Deck title line: bold and underlined.
pub const STYLE_TITLE: Style = Style::new()
    .add_modifier(Modifier::BOLD)
    .add_modifier(Modifier::UNDERLINED);

/// Instruction footer.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================
