use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Represents a GitHub user profile from the `/users/{username}` API.
///
/// Only the fields the explorer renders are kept; the rest of the payload is
/// ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
}

impl GitHubUser {
    /// The name shown in the profile header. Accounts without a display name
    /// fall back to their login.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.login,
        }
    }
}

/// A single entry from the `/users/{username}/repos` API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    #[allow(dead_code)]
    pub id: u64,
    pub name: String,
    pub html_url: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    pub avatar_url: String,
}
