//! tuideck: an Elm-style terminal UI runtime and the demos that exercise it.

pub mod config;
pub mod demos;
pub mod effect;
pub mod fetch;
pub mod logging;
pub mod program;
pub mod projector;
pub mod regions;
pub mod tui;
