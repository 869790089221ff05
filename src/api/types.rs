//! Wire types for the Cognos API.
//!
//! Every entity is owned by the remote service; these are transient,
//! non-authoritative copies. Optional fields default when the backend omits
//! them (e.g. the create-tag response carries neither `user_id` nor `category`).
use serde::{Deserialize, Serialize};

/// A registered user. Only `id` drives client behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload for `POST /users`. Sent as query parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// A keyword-based interest filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(rename = "tag_name")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Payload for `POST /users/{user_id}/tags`.
///
/// `user_id` is carried in the body as well as the path so both backend
/// variants accept the same request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTag {
    pub user_id: i64,
    pub tag_name: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// An article matched to a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw timestamp text: RFC 3339 or a naive ISO 8601 datetime.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Match strength in 0.0..=1.0.
    #[serde(default)]
    pub relevance_score: Option<f64>,
    pub url: String,
}

/// Outcome of a fetch-news run for one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    #[serde(default)]
    pub tag: Option<String>,
    pub fetched: u64,
    pub new_articles: u64,
    pub matched_articles: u64,
    pub threshold: f64,
}

/// Acknowledgement returned by `DELETE /tags/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
