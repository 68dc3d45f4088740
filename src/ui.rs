//! Glue between explorer state and the Slint window.
//!
//! Network work happens on the tokio runtime; everything that touches the
//! window is marshalled onto the event loop with `invoke_from_event_loop`.

use std::cell::RefCell;
use std::collections::HashMap;

use slint::{Color, ComponentHandle, Image, ModelRc, Rgba8Pixel, SharedPixelBuffer, VecModel, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::debug;

use crate::avatar::{self, AvatarPixels, OWNER_AVATAR_SIZE, PROFILE_AVATAR_SIZE};
use crate::calendar::{self, ActivityCalendar, CalendarOptions};
use crate::client::GitHubClient;
use crate::explorer::ViewState;
use crate::presenter::{present, Presentation, ProfileSummary};
use crate::{AppWindow, CalendarWeek, RepoItem};

thread_local! {
    // Only ever touched on the event loop thread.
    static AVATARS: RefCell<HashMap<String, Image>> = RefCell::new(HashMap::new());
    static SHOWN: RefCell<Option<Presentation>> = const { RefCell::new(None) };
}

pub fn apply_calendar_options(app: &AppWindow, options: &CalendarOptions) {
    app.set_calendar_block_size(options.block_size);
    app.set_calendar_block_margin(options.block_margin);
    app.set_calendar_font_size(options.font_size);

    let palette: Vec<Color> = options
        .palette()
        .iter()
        .map(|&(r, g, b)| Color::from_rgb_u8(r, g, b))
        .collect();
    app.set_calendar_palette(ModelRc::new(VecModel::from(palette)));
}

/// Mirrors every explorer state change into the window, and starts loading
/// avatars and the activity calendar whenever a different profile appears.
pub fn forward_updates(
    app: &AppWindow,
    runtime: &Handle,
    mut updates: watch::Receiver<ViewState>,
    client: GitHubClient,
) {
    let app_weak = app.as_weak();
    let runtime_inner = runtime.clone();

    runtime.spawn(async move {
        let mut shown_login: Option<String> = None;

        while updates.changed().await.is_ok() {
            let presentation = present(&updates.borrow_and_update());
            let new_profile = presentation
                .profile
                .clone()
                .filter(|p| shown_login.as_deref() != Some(p.login.as_str()));
            shown_login = presentation.profile.as_ref().map(|p| p.login.clone());

            let app_render = app_weak.clone();
            let _ = slint::invoke_from_event_loop(move || {
                if let Some(app) = app_render.upgrade() {
                    render(&app, presentation);
                }
            });

            if let Some(profile) = new_profile {
                load_media(&runtime_inner, app_weak.clone(), client.clone(), profile);
            }
        }
    });
}

fn render(app: &AppWindow, presentation: Presentation) {
    app.set_is_loading(presentation.loading);
    app.set_error_message(presentation.error_banner.clone().unwrap_or_default().into());
    app.set_field_message(presentation.field_message.clone().unwrap_or_default().into());

    match &presentation.profile {
        Some(profile) => {
            app.set_has_profile(true);
            app.set_login_name(profile.login.as_str().into());
            app.set_display_name(profile.display_name.as_str().into());
            app.set_bio(profile.bio.as_str().into());
            app.set_repos(profile.repos.as_str().into());
            app.set_followers(profile.followers.as_str().into());
            app.set_following(profile.following.as_str().into());
            app.set_profile_url(profile.profile_url.as_str().into());
            app.set_avatar(cached_avatar(&profile.avatar_url));

            app.set_has_repos(profile.repo_cards.is_some());
            let items: Vec<RepoItem> = profile
                .repo_cards
                .iter()
                .flatten()
                .map(|card| RepoItem {
                    name: card.name.as_str().into(),
                    url: card.url.as_str().into(),
                    language: card.language.as_str().into(),
                    created: card.created.as_str().into(),
                    owner_login: card.owner_login.as_str().into(),
                    owner_avatar: cached_avatar(&card.owner_avatar_url),
                })
                .collect();
            app.set_repo_list(ModelRc::new(VecModel::from(items)));

            if app.get_calendar_username().as_str() != profile.login {
                app.set_calendar_username(profile.login.as_str().into());
                show_calendar(app, &profile.login, None);
            }
        }
        None => {
            app.set_has_profile(false);
            app.set_has_repos(false);
            app.set_repo_list(ModelRc::default());
            app.set_calendar_username("".into());
            show_calendar(app, "", None);
        }
    }

    let keep = presentation
        .profile
        .as_ref()
        .map(ProfileSummary::avatar_urls)
        .unwrap_or_default();
    AVATARS.with(|avatars| retain_avatars(&mut avatars.borrow_mut(), &keep));

    SHOWN.with(|shown| *shown.borrow_mut() = Some(presentation));
}

/// Drops cached avatars the shown profile no longer references.
fn retain_avatars<V>(cache: &mut HashMap<String, V>, keep: &[String]) {
    cache.retain(|url, _| keep.contains(url));
}

/// `None` shows the calendar as still loading.
fn show_calendar(app: &AppWindow, username: &str, calendar: Option<&ActivityCalendar>) {
    let weeks: Vec<CalendarWeek> = calendar
        .map(|c| c.weeks.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|week| {
            let days: Vec<i32> = week.iter().map(|day| day.map_or(-1, i32::from)).collect();
            CalendarWeek {
                days: ModelRc::new(VecModel::from(days)),
            }
        })
        .collect();

    let summary = calendar.map(|c| c.summary(username)).unwrap_or_default();

    app.set_calendar_weeks(ModelRc::new(VecModel::from(weeks)));
    app.set_calendar_summary(summary.into());
}

fn load_media(runtime: &Handle, app_weak: Weak<AppWindow>, client: GitHubClient, profile: ProfileSummary) {
    {
        let client = client.clone();
        let app_weak = app_weak.clone();
        let login = profile.login.clone();

        runtime.spawn(async move {
            let calendar = calendar::load_calendar(&client, &login)
                .await
                .unwrap_or_else(|e| {
                    debug!(%login, error = ?e, "failed to load activity calendar");
                    ActivityCalendar::default()
                });

            let _ = slint::invoke_from_event_loop(move || {
                if let Some(app) = app_weak.upgrade() {
                    // a newer profile may have replaced this one meanwhile
                    if app.get_calendar_username().as_str() == login {
                        show_calendar(&app, &login, Some(&calendar));
                    }
                }
            });
        });
    }

    for url in profile.avatar_urls() {
        let size = if url == profile.avatar_url {
            PROFILE_AVATAR_SIZE
        } else {
            OWNER_AVATAR_SIZE
        };
        let client = client.clone();
        let app_weak = app_weak.clone();

        runtime.spawn(async move {
            if let Some(pixels) = avatar::download(client.http(), &url, size).await {
                let _ = slint::invoke_from_event_loop(move || {
                    if let Some(app) = app_weak.upgrade() {
                        store_avatar(&app, url, &pixels);
                    }
                });
            }
        });
    }
}

fn store_avatar(app: &AppWindow, url: String, pixels: &AvatarPixels) {
    let buffer =
        SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(&pixels.rgba, pixels.width, pixels.height);
    AVATARS.with(|avatars| avatars.borrow_mut().insert(url, Image::from_rgba8(buffer)));

    if let Some(presentation) = SHOWN.with(|shown| shown.borrow_mut().take()) {
        render(app, presentation);
    }
}

fn cached_avatar(url: &str) -> Image {
    AVATARS.with(|avatars| avatars.borrow().get(url).cloned().unwrap_or_default())
}
