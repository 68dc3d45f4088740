//! Turns [`ViewState`] into the flat strings the window displays.

use crate::explorer::ViewState;
use crate::models::{GitHubUser, Repository};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    pub loading: bool,
    pub error_banner: Option<String>,
    pub field_message: Option<String>,
    /// Present only when a profile has been loaded.
    pub profile: Option<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub login: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub profile_url: String,
    pub repos: String,
    pub followers: String,
    pub following: String,
    /// `None` until a repository listing arrived with the profile.
    pub repo_cards: Option<Vec<RepoCard>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoCard {
    pub name: String,
    pub url: String,
    pub language: String,
    pub created: String,
    pub owner_login: String,
    pub owner_avatar_url: String,
}

impl ProfileSummary {
    /// The profile avatar followed by every distinct owner avatar.
    pub fn avatar_urls(&self) -> Vec<String> {
        let mut urls = vec![self.avatar_url.clone()];
        for url in self.owner_avatar_urls() {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// Distinct owner avatar URLs, in card order.
    pub fn owner_avatar_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for card in self.repo_cards.iter().flatten() {
            if !urls.contains(&card.owner_avatar_url) {
                urls.push(card.owner_avatar_url.clone());
            }
        }
        urls
    }
}

pub fn present(state: &ViewState) -> Presentation {
    Presentation {
        loading: state.loading,
        error_banner: state.error.clone(),
        field_message: state.validation_error.clone(),
        profile: state
            .profile
            .as_ref()
            .map(|user| summarize(user, state.repos.as_deref())),
    }
}

fn summarize(user: &GitHubUser, repos: Option<&[Repository]>) -> ProfileSummary {
    ProfileSummary {
        login: user.login.clone(),
        display_name: user.display_name().to_string(),
        bio: user.bio.clone().unwrap_or_default(),
        avatar_url: user.avatar_url.clone(),
        profile_url: user.html_url.clone(),
        repos: user.public_repos.to_string(),
        followers: user.followers.to_string(),
        following: user.following.to_string(),
        repo_cards: repos.map(|repos| repos.iter().map(card).collect()),
    }
}

fn card(repo: &Repository) -> RepoCard {
    RepoCard {
        name: repo.name.clone(),
        url: repo.html_url.clone(),
        language: repo.language.clone().unwrap_or_default(),
        created: repo.created_at.format("%-m/%-d/%Y").to_string(),
        owner_login: repo.owner.login.clone(),
        owner_avatar_url: repo.owner.avatar_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryOwner;
    use chrono::{TimeZone, Utc};

    fn linus() -> GitHubUser {
        serde_json::from_str(
            r#"{"login":"torvalds","avatar_url":"https://avatars.example/u/1","html_url":"https://github.com/torvalds",
                "name":"Linus Torvalds","bio":null,"public_repos":10,"followers":200000,"following":1}"#,
        )
        .unwrap()
    }

    fn repo(id: u64, name: &str, language: Option<&str>, owner_avatar: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            html_url: format!("https://github.com/torvalds/{name}"),
            language: language.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2011, 9, 4, 22, 48, 12).unwrap(),
            owner: RepositoryOwner {
                login: "torvalds".to_string(),
                avatar_url: owner_avatar.to_string(),
            },
        }
    }

    #[test]
    fn renders_torvalds_profile_with_three_cards() {
        let state = ViewState {
            profile: Some(linus()),
            repos: Some(vec![
                repo(1, "linux", Some("C"), "https://avatars.example/u/1"),
                repo(2, "subsurface", Some("C++"), "https://avatars.example/u/1"),
                repo(3, "uemacs", None, "https://avatars.example/u/1"),
            ]),
            ..ViewState::default()
        };

        let profile = present(&state).profile.unwrap();
        assert_eq!(profile.followers, "200000");
        assert_eq!(profile.repos, "10");
        assert_eq!(profile.following, "1");
        assert_eq!(profile.display_name, "Linus Torvalds");
        assert_eq!(profile.bio, "");

        let cards = profile.repo_cards.as_ref().unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].name, "linux");
        assert_eq!(cards[0].created, "9/4/2011");
        assert_eq!(cards[2].language, "");
        assert_eq!(profile.owner_avatar_urls(), ["https://avatars.example/u/1"]);
        assert_eq!(profile.avatar_urls(), ["https://avatars.example/u/1"]);
    }

    #[test]
    fn avatar_urls_put_the_profile_first() {
        let state = ViewState {
            profile: Some(linus()),
            repos: Some(vec![
                repo(1, "fork", None, "https://avatars.example/u/2"),
                repo(2, "linux", Some("C"), "https://avatars.example/u/1"),
                repo(3, "other", None, "https://avatars.example/u/2"),
            ]),
            ..ViewState::default()
        };

        let profile = present(&state).profile.unwrap();
        assert_eq!(
            profile.avatar_urls(),
            ["https://avatars.example/u/1", "https://avatars.example/u/2"]
        );
    }

    #[test]
    fn hides_profile_until_loaded() {
        let state = ViewState {
            loading: true,
            ..ViewState::default()
        };
        let presentation = present(&state);
        assert!(presentation.loading);
        assert!(presentation.profile.is_none());
    }

    #[test]
    fn shows_error_and_field_message() {
        let state = ViewState {
            error: Some("boom".into()),
            validation_error: Some("Username is required".into()),
            ..ViewState::default()
        };
        let presentation = present(&state);
        assert_eq!(presentation.error_banner.as_deref(), Some("boom"));
        assert_eq!(presentation.field_message.as_deref(), Some("Username is required"));
    }

    #[test]
    fn stale_profile_stays_visible_under_error() {
        let state = ViewState {
            profile: Some(linus()),
            repos: Some(vec![]),
            error: Some("failed".into()),
            ..ViewState::default()
        };
        let presentation = present(&state);
        assert!(presentation.error_banner.is_some());
        assert_eq!(presentation.profile.unwrap().repo_cards, Some(vec![]));
    }
}
