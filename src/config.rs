use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

use crate::calendar::ColorScheme;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_CONTRIBUTIONS_URL: &str = "https://github-contributions-api.jogruber.de";
pub const USER_AGENT: &str = "rust-github-profile-explorer";
pub const ACCEPT: &str = "application/vnd.github.v3+json";

/// What happens to the last successfully loaded profile when a later search fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Keep showing the previous profile underneath the error banner.
    #[default]
    RetainLastGood,
    /// Drop the previous profile and repositories.
    ClearOnError,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" | "retain-last-good" => Ok(ErrorPolicy::RetainLastGood),
            "clear" | "clear-on-error" => Ok(ErrorPolicy::ClearOnError),
            other => Err(format!("Invalid error policy: {other}. Use 'retain' or 'clear'")),
        }
    }
}

/// Everything the HTTP layer needs to talk to GitHub. Passed explicitly into
/// the client so tests can point it at a local mock server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_url: Url,
    pub contributions_url: Url,
    pub user_agent: String,
    /// Sent as a bearer token when present. Unset by default, so requests are anonymous.
    pub token: Option<String>,
    pub on_error: ErrorPolicy,
    pub calendar_scheme: ColorScheme,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            contributions_url: Url::parse(DEFAULT_CONTRIBUTIONS_URL)
                .expect("default contributions URL is valid"),
            user_agent: USER_AGENT.to_string(),
            token: None,
            on_error: ErrorPolicy::default(),
            calendar_scheme: ColorScheme::default(),
        }
    }
}

impl ApiConfig {
    /// Reads overrides from the process environment (after `.env` has been loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = var("GITHUB_API_URL") {
            config.api_url = parse_base_url("GITHUB_API_URL", &url)?;
        }
        if let Some(url) = var("CONTRIBUTIONS_API_URL") {
            config.contributions_url = parse_base_url("CONTRIBUTIONS_API_URL", &url)?;
        }
        config.token = var("GITHUB_TOKEN");
        if let Some(policy) = var("PROFILE_EXPLORER_ON_ERROR") {
            match policy.parse() {
                Ok(policy) => config.on_error = policy,
                Err(e) => warn!("{e}; keeping the previous profile on errors"),
            }
        }
        if let Some(scheme) = var("CALENDAR_COLOR_SCHEME") {
            match scheme.parse() {
                Ok(scheme) => config.calendar_scheme = scheme,
                Err(e) => warn!("{e}; using the dark calendar palette"),
            }
        }

        Ok(config)
    }

    pub fn user_url(&self, username: &str) -> String {
        endpoint(&self.api_url, &["users", username]).into()
    }

    pub fn repos_url(&self, username: &str) -> String {
        endpoint(&self.api_url, &["users", username, "repos"]).into()
    }

    pub fn contributions_url(&self, username: &str) -> String {
        let mut url = endpoint(&self.contributions_url, &["v4", username]);
        url.query_pairs_mut().append_pair("y", "last");
        url.into()
    }
}

/// Parses an API base URL, rejecting anything that cannot carry path segments.
pub fn parse_base_url(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid {name}: {raw}"))?;
    if url.cannot_be_a_base() {
        bail!("Invalid {name}: {raw} cannot be used as a base URL");
    }
    Ok(url)
}

/// Appends `segments` to `base`, percent-encoding each one so a username
/// stays inside its own path segment.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
