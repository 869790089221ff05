//! Article feed state for the selected tag.
//!
//! The feed is keyed by a tag id supplied from outside. Every response that
//! reaches it carries the identity it was issued for: loads carry
//! `(tag_id, seq)`, fetch-news results and scheduled reloads carry
//! `(tag_id, epoch)`. Anything that no longer matches is dropped, so a slow
//! response for a tag the user navigated away from never shows up.
use crate::api::{Article, FetchResult, RequestError};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load articles. Please try again.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch news. Please try again.";

/// Identity of an issued article load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub tag_id: i64,
    pub seq: u64,
}

/// Identity of an issued fetch-news call (and its follow-up reload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub tag_id: i64,
    pub epoch: u64,
}

#[derive(Debug, Default)]
pub struct ArticleFeed {
    tag_id: Option<i64>,
    pub articles: Vec<Article>,
    /// Result of the last successful fetch-news, until the next fetch or tag switch.
    pub fetch_result: Option<FetchResult>,
    pub error: Option<String>,
    pub loading: bool,
    pub fetching: bool,
    /// Cursor into `articles`.
    pub selected: usize,
    /// Bumped on every tag switch.
    epoch: u64,
    /// Bumped on every issued load.
    load_seq: u64,
}

impl ArticleFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag_id(&self) -> Option<i64> {
        self.tag_id
    }

    /// Point the feed at `tag_id`.
    ///
    /// A change (including to or from `None`) discards articles, the fetch
    /// result and the error, and clears both busy flags. For a non-null id
    /// the returned ticket is the fresh load to issue. Setting the current
    /// id again is a no-op.
    pub fn set_tag(&mut self, tag_id: Option<i64>) -> Option<LoadTicket> {
        if self.tag_id == tag_id {
            return None;
        }
        tracing::debug!(from = ?self.tag_id, to = ?tag_id, "Article feed switching tag");

        self.tag_id = tag_id;
        self.epoch = self.epoch.wrapping_add(1);
        self.articles.clear();
        self.fetch_result = None;
        self.error = None;
        self.loading = false;
        self.fetching = false;
        self.selected = 0;

        self.begin_load()
    }

    /// Start an article load for the current tag.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        let tag_id = self.tag_id?;
        self.load_seq = self.load_seq.wrapping_add(1);
        self.loading = true;
        self.error = None;
        Some(LoadTicket {
            tag_id,
            seq: self.load_seq,
        })
    }

    /// Apply a load response. Returns false when the response was stale.
    pub fn apply_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Article>, RequestError>,
    ) -> bool {
        if self.tag_id != Some(ticket.tag_id) || self.load_seq != ticket.seq {
            tracing::debug!(
                tag_id = ticket.tag_id,
                seq = ticket.seq,
                current_seq = self.load_seq,
                "Discarding stale article load"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(articles) => {
                tracing::debug!(tag_id = ticket.tag_id, count = articles.len(), "Articles loaded");
                self.articles = articles;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(tag_id = ticket.tag_id, error = %e, "Article load failed");
                self.articles.clear();
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
        self.clamp_selection();
        true
    }

    /// Start a fetch-news run. Ignored while one is already running.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.fetching {
            return None;
        }
        let tag_id = self.tag_id?;
        self.fetching = true;
        self.error = None;
        self.fetch_result = None;
        Some(FetchTicket {
            tag_id,
            epoch: self.epoch,
        })
    }

    /// Apply a fetch-news response.
    ///
    /// Returns true when the caller should schedule the follow-up reload.
    pub fn apply_fetched(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchResult, RequestError>,
    ) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(tag_id = ticket.tag_id, epoch = ticket.epoch, "Discarding stale fetch result");
            return false;
        }

        self.fetching = false;
        match result {
            Ok(summary) => {
                tracing::info!(
                    tag_id = ticket.tag_id,
                    fetched = summary.fetched,
                    new_articles = summary.new_articles,
                    matched = summary.matched_articles,
                    "News fetched"
                );
                self.fetch_result = Some(summary);
                true
            }
            Err(e) => {
                tracing::warn!(tag_id = ticket.tag_id, error = %e, "Fetch news failed");
                self.error = Some(FETCH_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// The post-fetch settle delay elapsed; reload if still on the same tag.
    pub fn reload_due(&mut self, ticket: FetchTicket) -> Option<LoadTicket> {
        if !self.is_current(ticket) {
            return None;
        }
        self.begin_load()
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.tag_id == Some(ticket.tag_id) && self.epoch == ticket.epoch
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles.get(self.selected)
    }

    pub fn nav_down(&mut self) {
        if self.selected + 1 < self.articles.len() {
            self.selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.articles.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(id: i64) -> Article {
        Article {
            id,
            title: format!("Article {}", id),
            source: None,
            description: None,
            published_at: None,
            relevance_score: None,
            url: format!("https://example.com/{}", id),
        }
    }

    fn summary() -> FetchResult {
        FetchResult {
            tag: Some("ai".to_string()),
            fetched: 10,
            new_articles: 4,
            matched_articles: 3,
            threshold: 0.5,
        }
    }

    fn server_error() -> RequestError {
        RequestError::Server {
            status: 500,
            payload: None,
        }
    }

    #[test]
    fn test_set_tag_issues_load() {
        let mut feed = ArticleFeed::new();
        let ticket = feed.set_tag(Some(3)).unwrap();
        assert_eq!(ticket.tag_id, 3);
        assert!(feed.loading);
        assert_eq!(feed.tag_id(), Some(3));
    }

    #[test]
    fn test_set_same_tag_is_noop() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(3));
        assert!(feed.set_tag(Some(3)).is_none());
    }

    #[test]
    fn test_set_none_clears_everything() {
        let mut feed = ArticleFeed::new();
        let ticket = feed.set_tag(Some(1)).unwrap();
        feed.apply_loaded(ticket, Ok(vec![article(1)]));
        feed.error = Some("x".to_string());

        assert!(feed.set_tag(None).is_none());
        assert!(feed.articles.is_empty());
        assert!(feed.error.is_none());
        assert!(!feed.loading);
        assert!(!feed.fetching);
    }

    #[test]
    fn test_stale_load_for_previous_tag_ignored() {
        let mut feed = ArticleFeed::new();
        let for_y = feed.set_tag(Some(1)).unwrap();
        let for_x = feed.set_tag(Some(2)).unwrap();

        assert!(!feed.apply_loaded(for_y, Ok(vec![article(100)])));
        assert!(feed.articles.is_empty());
        assert!(feed.loading);

        assert!(feed.apply_loaded(for_x, Ok(vec![article(200)])));
        assert_eq!(feed.articles[0].id, 200);
        assert!(!feed.loading);
    }

    #[test]
    fn test_superseded_load_same_tag_ignored() {
        let mut feed = ArticleFeed::new();
        let first = feed.set_tag(Some(1)).unwrap();
        let second = feed.begin_load().unwrap();
        assert!(!feed.apply_loaded(first, Ok(vec![article(1)])));
        assert!(feed.apply_loaded(second, Ok(vec![article(2)])));
        assert_eq!(feed.articles.len(), 1);
        assert_eq!(feed.articles[0].id, 2);
    }

    #[test]
    fn test_load_failure_sets_message_and_empties_list() {
        let mut feed = ArticleFeed::new();
        let ticket = feed.set_tag(Some(1)).unwrap();
        feed.apply_loaded(ticket, Ok(vec![article(1)]));

        let reload = feed.begin_load().unwrap();
        feed.apply_loaded(reload, Err(server_error()));
        assert_eq!(feed.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert!(feed.articles.is_empty());
        assert!(!feed.loading);
    }

    #[test]
    fn test_fetch_success_stores_result_and_requests_reload() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        let ticket = feed.begin_fetch().unwrap();
        assert!(feed.fetching);

        assert!(feed.apply_fetched(ticket, Ok(summary())));
        assert_eq!(feed.fetch_result, Some(summary()));
        assert!(!feed.fetching);

        let load = feed.reload_due(ticket).unwrap();
        assert_eq!(load.tag_id, 1);
    }

    #[test]
    fn test_fetch_ignored_while_fetching() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        assert!(feed.begin_fetch().is_some());
        assert!(feed.begin_fetch().is_none());
    }

    #[test]
    fn test_fetch_independent_of_loading() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        assert!(feed.loading);
        assert!(feed.begin_fetch().is_some());
    }

    #[test]
    fn test_fetch_without_tag_does_nothing() {
        let mut feed = ArticleFeed::new();
        assert!(feed.begin_fetch().is_none());
        assert!(!feed.fetching);
    }

    #[test]
    fn test_begin_fetch_clears_previous_result_and_error() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.apply_fetched(ticket, Ok(summary()));
        feed.error = Some("old".to_string());

        feed.begin_fetch();
        assert!(feed.fetch_result.is_none());
        assert!(feed.error.is_none());
    }

    #[test]
    fn test_fetch_failure_sets_message_no_reload() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        let ticket = feed.begin_fetch().unwrap();
        assert!(!feed.apply_fetched(ticket, Err(server_error())));
        assert_eq!(feed.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
        assert!(!feed.fetching);
    }

    #[test]
    fn test_fetch_result_dropped_after_tag_switch() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.set_tag(Some(2));

        assert!(!feed.apply_fetched(ticket, Ok(summary())));
        assert!(feed.fetch_result.is_none());
        assert!(feed.reload_due(ticket).is_none());
    }

    #[test]
    fn test_switch_back_does_not_revive_old_epoch() {
        let mut feed = ArticleFeed::new();
        feed.set_tag(Some(1));
        let ticket = feed.begin_fetch().unwrap();
        feed.set_tag(Some(2));
        feed.set_tag(Some(1));
        assert!(!feed.is_current(ticket));
    }

    #[test]
    fn test_cursor_clamped_after_shorter_load() {
        let mut feed = ArticleFeed::new();
        let ticket = feed.set_tag(Some(1)).unwrap();
        feed.apply_loaded(ticket, Ok(vec![article(1), article(2), article(3)]));
        feed.nav_down();
        feed.nav_down();
        feed.nav_down();
        assert_eq!(feed.selected, 2);

        let reload = feed.begin_load().unwrap();
        feed.apply_loaded(reload, Ok(vec![article(1)]));
        assert_eq!(feed.selected, 0);
        assert_eq!(feed.selected_article().map(|a| a.id), Some(1));

        feed.nav_up();
        assert_eq!(feed.selected, 0);
    }
}
