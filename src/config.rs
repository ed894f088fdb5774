//! Runtime configuration: which demo starts, what happens after the last one.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

/// The demos in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum DemoId {
    Spinners,
    Canvas,
    Input,
    Mouse,
    FlowLayout,
    GridLayout,
    Colors,
    Http,
}

impl DemoId {
    pub const ALL: [DemoId; 8] = [
        DemoId::Spinners,
        DemoId::Canvas,
        DemoId::Input,
        DemoId::Mouse,
        DemoId::FlowLayout,
        DemoId::GridLayout,
        DemoId::Colors,
        DemoId::Http,
    ];

    /// Position in registration order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The demo registered after this one, or None for the last.
    pub fn next(self) -> Option<DemoId> {
        DemoId::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for DemoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DemoId::Spinners => "spinners",
            DemoId::Canvas => "canvas",
            DemoId::Input => "input",
            DemoId::Mouse => "mouse",
            DemoId::FlowLayout => "flow-layout",
            DemoId::GridLayout => "grid-layout",
            DemoId::Colors => "colors",
            DemoId::Http => "http",
        };
        f.write_str(name)
    }
}

/// What the deck does when the last demo terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WrapPolicy {
    /// Start over at the first demo.
    #[default]
    Cycle,
    /// Quit the application.
    Exit,
}

/// Everything the runtime needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckConfig {
    pub initial: DemoId,
    pub on_last: WrapPolicy,
    /// Seed for the layout demos' randomness.
    pub seed: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for DeckConfig {
    fn default() -> Self {
        DeckConfig {
            initial: DemoId::Spinners,
            on_last: WrapPolicy::Cycle,
            seed: 0,
            log_file: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
