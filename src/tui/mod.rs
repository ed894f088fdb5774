//! TUI module: the deck that sequences the demos.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: Pure data types (Deck, Message, AppEvent)
//! - `update`: Pure transitions and input mapping
//! - `view`: Rendering and pointer claims
//! - `run`: Effects (terminal, threads, executor)
//! - `theme`: Shared styles

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;
