use crate::api::{ApiClient, Article, DeleteAck, FetchResult, RequestError, Tag, User};
use crate::config::Config;
use crate::feed_view::{ArticleFeed, FetchTicket, LoadTicket};
use crate::keybindings::KeybindingRegistry;
use crate::tag_form::TagForm;
use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// How long a status bar message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Phase and Focus Enums
// ============================================================================

/// Bootstrap progress of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user list, then the first tag list.
    Bootstrapping,
    /// No user exists (or the user list could not be loaded). Terminal.
    NoUser,
    /// Tags are loaded; the two-pane layout is live.
    Ready,
    /// The first tag-list load failed. Terminal.
    Failed(String),
}

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tags,
    Articles,
}

// ============================================================================
// Overlays
// ============================================================================

/// Pending confirmation action for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTag { tag_id: i64, name: String },
}

/// A blocking alert. Any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Event Types
// ============================================================================

/// Completion events from background tasks.
///
/// Every response carries the identity it was issued for so the event
/// handler can drop anything stale.
#[derive(Debug)]
pub enum AppEvent {
    UsersLoaded(Result<Vec<User>, RequestError>),
    /// Tag list response for reload number `seq`.
    TagsLoaded {
        seq: u64,
        result: Result<Vec<Tag>, RequestError>,
    },
    ArticlesLoaded {
        ticket: LoadTicket,
        result: Result<Vec<Article>, RequestError>,
    },
    NewsFetched {
        ticket: FetchTicket,
        result: Result<FetchResult, RequestError>,
    },
    /// The post-fetch settle delay elapsed.
    ReloadDue(FetchTicket),
    TagCreated(Result<Tag, RequestError>),
    TagDeleted {
        tag_id: i64,
        name: String,
        result: Result<DeleteAck, RequestError>,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "load_articles")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state, owned by the event loop.
pub struct App {
    pub client: ApiClient,
    pub keybindings: KeybindingRegistry,

    // Settings
    pub min_score: Option<f64>,
    pub refresh_reload_delay: Duration,

    // Shell
    pub phase: Phase,
    /// The active user: the first one returned by the backend.
    pub user: Option<User>,
    pub tags: Vec<Tag>,
    /// Always an id present in `tags`, or `None`.
    pub selected_tag_id: Option<i64>,
    /// Keyboard cursor over `tags`. Independent of the selection.
    pub tag_cursor: usize,
    /// Sequence number of the most recently issued tag-list load.
    pub tags_reload_seq: u64,
    /// Tag ids with a delete request in flight.
    pub deleting: HashSet<i64>,

    // Child views
    pub feed: ArticleFeed,
    pub form: TagForm,

    // UI state
    pub focus: Focus,
    pub pending_confirm: Option<ConfirmAction>,
    pub alert: Option<Alert>,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    // Cow avoids allocation for static literals
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
    /// Current frame of the busy spinner.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: ApiClient, config: &Config) -> Self {
        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        Self {
            client,
            keybindings,
            min_score: config.min_score,
            refresh_reload_delay: config.refresh_reload_delay(),
            phase: Phase::Bootstrapping,
            user: None,
            tags: Vec::new(),
            selected_tag_id: None,
            tag_cursor: 0,
            tags_reload_seq: 0,
            deleting: HashSet::new(),
            feed: ArticleFeed::new(),
            form: TagForm::default(),
            focus: Focus::Tags,
            pending_confirm: None,
            alert: None,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn selected_tag(&self) -> Option<&Tag> {
        let id = self.selected_tag_id?;
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn tag_under_cursor(&self) -> Option<&Tag> {
        self.tags.get(self.tag_cursor)
    }

    pub fn is_deleting(&self, tag_id: i64) -> bool {
        self.deleting.contains(&tag_id)
    }

    /// Replace the tag list and re-derive selection.
    ///
    /// A selection that vanished from the list is cleared first; the first
    /// tag is then selected only if nothing is selected.
    pub fn replace_tags(&mut self, tags: Vec<Tag>) {
        self.tags = tags;

        if let Some(id) = self.selected_tag_id {
            if !self.tags.iter().any(|t| t.id == id) {
                tracing::debug!(tag_id = id, "Selected tag no longer exists, clearing selection");
                self.selected_tag_id = None;
            }
        }
        if self.selected_tag_id.is_none() {
            self.selected_tag_id = self.tags.first().map(|t| t.id);
        }

        self.tag_cursor = self
            .selected_tag_id
            .and_then(|id| self.tags.iter().position(|t| t.id == id))
            .unwrap_or_else(|| self.tag_cursor.min(self.tags.len().saturating_sub(1)));
    }

    /// Move the keyboard cursor in the focused panel.
    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Tags => {
                if self.tag_cursor + 1 < self.tags.len() {
                    self.tag_cursor += 1;
                }
            }
            Focus::Articles => self.feed.nav_down(),
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Tags => self.tag_cursor = self.tag_cursor.saturating_sub(1),
            Focus::Articles => self.feed.nav_up(),
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tags => Focus::Articles,
            Focus::Articles => Focus::Tags,
        };
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Whether any network work is visibly in flight (drives the spinner).
    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Bootstrapping
            || self.feed.loading
            || self.feed.fetching
            || self.form.submitting
            || !self.deleting.is_empty()
    }
}
