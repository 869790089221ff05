//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Phase dispatch and overlays
//! - `tags` - Tag sidebar widget
//! - `articles` - Article pane widget, built from `card` rows
//! - `form` - Create-tag form overlay
//! - `help` - Keybinding help overlay
//! - `status` - Status bar widget

mod articles;
mod card;
mod form;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;
mod tags;

pub use loop_runner::{run, Action};
