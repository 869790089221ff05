//! HTTP gateway to the Cognos backend.
//!
//! - `client` - [`ApiClient`] and the [`RequestError`] taxonomy
//! - `types` - wire entities (users, tags, articles, fetch results)

mod client;
mod types;

pub use client::{
    resolve_base_url, ApiClient, RequestError, DEFAULT_BASE_PATH, DEFAULT_ORIGIN, DEFAULT_TIMEOUT,
};
pub use types::{Article, DeleteAck, FetchResult, NewTag, NewUser, Tag, User};
