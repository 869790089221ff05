//! Create-tag form state.
//!
//! The form owns a local draft (`name`, `keywords`, `category`) until it is
//! submitted. Validation and keyword normalization happen here; the network
//! call itself is issued by `sync::actions::submit_form`.
use crate::api::{NewTag, RequestError};
use thiserror::Error;

/// Shown when the create request fails without a server-provided detail.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create tag";

/// Client-side validation failure. Prevents submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Tag name is required")]
    NameRequired,
}

/// Which input of the form receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Keywords,
    Category,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Keywords,
            Self::Keywords => Self::Category,
            Self::Category => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Category,
            Self::Keywords => Self::Name,
            Self::Category => Self::Keywords,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Keywords => "Keywords",
            Self::Category => "Category",
        }
    }
}

/// Split comma-separated keyword text into trimmed, non-empty keywords.
///
/// Order is preserved and duplicates are kept.
pub fn normalize_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Draft and submission state of the create-tag form.
#[derive(Debug, Clone, Default)]
pub struct TagForm {
    pub open: bool,
    pub name: String,
    pub keywords: String,
    pub category: String,
    pub focused: FormField,
    pub submitting: bool,
    /// Inline error: a validation message or the server's failure detail.
    pub error: Option<String>,
}

impl TagForm {
    /// Maximum characters accepted per field.
    pub const MAX_FIELD_LEN: usize = 256;

    /// Open with the previous draft. Errors from an earlier attempt are dropped.
    pub fn open(&mut self) {
        self.open = true;
        self.focused = FormField::Name;
        self.error = None;
    }

    /// Close the form without submitting. The draft survives for the next open.
    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focused {
            FormField::Name => &mut self.name,
            FormField::Keywords => &mut self.keywords,
            FormField::Category => &mut self.category,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        let field = self.field_mut();
        if field.chars().count() < Self::MAX_FIELD_LEN {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.field_mut().pop();
    }

    pub fn next_field(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn prev_field(&mut self) {
        self.focused = self.focused.prev();
    }

    /// Build the create payload for `user_id` from the current draft.
    pub fn build(&self, user_id: i64) -> Result<NewTag, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::NameRequired);
        }
        let category = self.category.trim();
        Ok(NewTag {
            user_id,
            tag_name: name.to_string(),
            keywords: normalize_keywords(&self.keywords),
            category: (!category.is_empty()).then(|| category.to_string()),
        })
    }

    /// Validate and enter the submitting state.
    ///
    /// Returns `None` when a submit is already in flight or validation fails.
    /// A validation failure is recorded in `error`.
    pub fn begin_submit(&mut self, user_id: i64) -> Option<NewTag> {
        if self.submitting {
            return None;
        }
        match self.build(user_id) {
            Ok(payload) => {
                self.submitting = true;
                self.error = None;
                Some(payload)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Create succeeded: clear the draft and close.
    pub fn on_success(&mut self) {
        *self = Self::default();
    }

    /// Create failed: keep the draft, show the server detail if any.
    pub fn on_failure(&mut self, error: &RequestError) {
        self.submitting = false;
        self.error = Some(
            error
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| CREATE_FAILED_MESSAGE.to_string()),
        );
    }
}
