//! Fetch orchestration for a single profile lookup.
//!
//! [`ProfileExplorer`] owns the view state. Each accepted submission becomes an
//! attempt with its own sequence number; the profile and repository requests
//! run concurrently and are joined, and the merged result is applied only if
//! the attempt is still the most recent one. Subscribers observe state through
//! a `tokio::sync::watch` channel.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::client::ProfileService;
use crate::config::ErrorPolicy;
use crate::models::{GitHubUser, Repository};
use crate::validation::{validate_username, SearchCommand, ValidationError};

/// Message shown for every fetch failure. Details only go to the log.
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch GitHub data. Please check the username and try again.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub profile: Option<GitHubUser>,
    pub repos: Option<Vec<Repository>>,
    pub loading: bool,
    pub error: Option<String>,
    /// Field-level message from the username validator.
    pub validation_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input was rejected before any request was made.
    Invalid(ValidationError),
    Loaded,
    Failed,
    /// A newer attempt was issued while this one was in flight; its result was dropped.
    Superseded,
}

pub struct ProfileExplorer<S> {
    service: S,
    policy: ErrorPolicy,
    state: watch::Sender<ViewState>,
    latest_attempt: Mutex<u64>,
}

impl<S: ProfileService> ProfileExplorer<S> {
    pub fn new(service: S, policy: ErrorPolicy) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            service,
            policy,
            state,
            latest_attempt: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Validates `input` and, when it passes, runs a full lookup.
    pub async fn submit(&self, input: &str) -> Outcome {
        match validate_username(input) {
            Ok(command) => self.search(command).await,
            Err(err) => {
                self.state
                    .send_modify(|s| s.validation_error = Some(err.to_string()));
                Outcome::Invalid(err)
            }
        }
    }

    /// Fetches profile and repositories for an already validated username.
    pub async fn search(&self, command: SearchCommand) -> Outcome {
        let attempt = self.begin();
        let _release = LoadingRelease {
            state: &self.state,
            latest_attempt: &self.latest_attempt,
            attempt,
        };

        let username = command.username.as_str();
        info!(%username, attempt, "fetching GitHub profile");

        let result = tokio::try_join!(
            self.service.fetch_user(username),
            self.service.fetch_repos(username),
        );

        let policy = self.policy;
        let outcome = match result {
            Ok((profile, repos)) => {
                let repo_count = repos.len();
                self.apply(attempt, |s| {
                    s.profile = Some(profile);
                    s.repos = Some(repos);
                })
                .then(|| {
                    info!(%username, attempt, repo_count, "profile loaded");
                    Outcome::Loaded
                })
            }
            Err(err) => {
                error!(%username, attempt, error = ?err, "failed to fetch GitHub data");
                self.apply(attempt, |s| {
                    s.error = Some(FETCH_FAILED_MESSAGE.to_string());
                    if policy == ErrorPolicy::ClearOnError {
                        s.profile = None;
                        s.repos = None;
                    }
                })
                .then_some(Outcome::Failed)
            }
        };

        outcome.unwrap_or_else(|| {
            debug!(%username, attempt, "discarding result of superseded attempt");
            Outcome::Superseded
        })
    }

    /// Issues a new attempt number and flips the view into its loading state.
    fn begin(&self) -> u64 {
        let mut latest = lock(&self.latest_attempt);
        *latest += 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.validation_error = None;
        });
        *latest
    }

    /// Applies `update` only if `attempt` is still the latest one issued.
    fn apply(&self, attempt: u64, update: impl FnOnce(&mut ViewState)) -> bool {
        let latest = lock(&self.latest_attempt);
        if *latest != attempt {
            return false;
        }
        self.state.send_modify(update);
        true
    }
}

/// Clears the loading flag when an attempt settles, including by unwinding.
/// A superseded attempt leaves the flag alone; it belongs to the newer attempt.
struct LoadingRelease<'a> {
    state: &'a watch::Sender<ViewState>,
    latest_attempt: &'a Mutex<u64>,
    attempt: u64,
}

impl Drop for LoadingRelease<'_> {
    fn drop(&mut self) {
        let latest = lock(self.latest_attempt);
        if *latest == self.attempt {
            self.state.send_modify(|s| s.loading = false);
        }
    }
}

fn lock(mutex: &Mutex<u64>) -> MutexGuard<'_, u64> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
