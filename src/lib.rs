//! Terminal client for the Cognos tag-driven news matching API.
//!
//! The binary in `main.rs` wires these together: [`config`] is read,
//! an [`api::ApiClient`] is built, and [`ui::run`] drives an [`app::App`]
//! whose network work is issued and applied by [`sync`].

pub mod api;
pub mod app;
pub mod config;
pub mod feed_view;
pub mod keybindings;
pub mod sync;
pub mod tag_form;
pub mod ui;
pub mod util;
