//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms, so users can remap them from the
//! `[keybindings]` table of config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Back,
    Select,
    NewTag,
    DeleteTag,
    RefreshNews,
    ReloadArticles,
    OpenInBrowser,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::CycleFocus => "Switch between tags and articles",
            Self::Back => "Go back / dismiss",
            Self::Select => "Select tag",
            Self::NewTag => "Create a new tag",
            Self::DeleteTag => "Delete tag",
            Self::RefreshNews => "Fetch fresh news for tag",
            Self::ReloadArticles => "Reload articles",
            Self::OpenInBrowser => "Open article in browser",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context. Determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    TagList,
    ArticleList,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::TagList => "Tags",
            Self::ArticleList => "Articles",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report `R` as `Char('R')` + SHIFT; the case already carries it.
    fn normalized(self) -> Self {
        match self.code {
            KeyCode::Char(_) => Self::new(self.code, self.modifiers.difference(KeyModifiers::SHIFT)),
            _ => self,
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let rest = rest.trim();
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "delete" | "del" => return Some(KeySpec::plain(KeyCode::Delete)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = n.parse::<u8>() {
            if (1..=12).contains(&n) {
                return Some(KeySpec::plain(KeyCode::F(n)));
            }
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// fall back to `Global`.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Bind `key` to `action` in `context`. A row the key previously
    /// belonged to is dropped so the help table stays truthful.
    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        if let Some(displaced) = self.lookup.insert((context, key), action) {
            tracing::debug!(?context, ?displaced, ?action, "Key rebound");
            self.bindings.retain(|(c, k, _)| !(*c == context && *k == key));
        }
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        // === Global ===
        self.bind(Context::Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Context::Global, KeySpec::ctrl('c'), Action::Quit);

        self.bind(Context::Global, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Down), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(Context::Global, KeySpec::plain(Up), Action::NavUp);

        self.bind(Context::Global, KeySpec::plain(Tab), Action::CycleFocus);
        self.bind(Context::Global, KeySpec::plain(Esc), Action::Back);
        self.bind(Context::Global, KeySpec::plain(Char('n')), Action::NewTag);
        self.bind(
            Context::Global,
            KeySpec::plain(Char('r')),
            Action::RefreshNews,
        );
        self.bind(
            Context::Global,
            KeySpec::plain(Char('R')),
            Action::ReloadArticles,
        );
        self.bind(Context::Global, KeySpec::plain(Char('?')), Action::ShowHelp);

        // === Tag list ===
        self.bind(Context::TagList, KeySpec::plain(Enter), Action::Select);
        self.bind(
            Context::TagList,
            KeySpec::plain(Char('d')),
            Action::DeleteTag,
        );

        // === Article list ===
        self.bind(
            Context::ArticleList,
            KeySpec::plain(Char('o')),
            Action::OpenInBrowser,
        );
        self.bind(
            Context::ArticleList,
            KeySpec::plain(Enter),
            Action::OpenInBrowser,
        );
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "refresh_news").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5"). An override
    /// replaces every default key for the action, in the same contexts.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers).normalized();

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "cycle_focus" | "cyclefocus" | "focus" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "select" => Some(Action::Select),
        "new_tag" | "newtag" | "create_tag" => Some(Action::NewTag),
        "delete_tag" | "deletetag" | "delete" => Some(Action::DeleteTag),
        "refresh_news" | "refreshnews" | "fetch_news" | "refresh" => Some(Action::RefreshNews),
        "reload_articles" | "reloadarticles" | "reload" => Some(Action::ReloadArticles),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
