//! Client-side data synchronization.
//!
//! Bridges user actions, background API calls and `App` state:
//!
//! - `actions` - user-driven operations (select, delete, create, refresh)
//! - `events` - applies task results to `App`, dropping stale responses
//! - `tasks` - spawners that run one API call each and report an `AppEvent`

mod actions;
mod events;
mod tasks;

pub use actions::{
    cancel_confirm, confirm_delete, open_form, refresh_news, reload_articles, reload_tags,
    request_delete, select_tag, select_tag_under_cursor, start_bootstrap, submit_form, sync_feed,
};
pub use events::handle_app_event;
