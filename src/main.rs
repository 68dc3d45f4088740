#![windows_subsystem = "windows"]
mod avatar;
mod calendar;
mod client;
mod config;
mod explorer;
mod models;
mod presenter;
mod ui;
mod validation;
slint::include_modules!();

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::calendar::CalendarOptions;
use crate::client::GitHubClient;
use crate::config::ApiConfig;
use crate::explorer::ProfileExplorer;

fn main() -> anyhow::Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::from_env()?;
    info!(api = %config.api_url, authenticated = config.token.is_some(), "starting profile explorer");

    // Shared HTTP Client
    let client = GitHubClient::new(config.clone())?;
    let explorer = Arc::new(ProfileExplorer::new(client.clone(), config.on_error));

    // Background tokio runtime for async HTTP
    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    // Create the UI
    let app = AppWindow::new().context("Failed to create the main window")?;
    ui::apply_calendar_options(&app, &CalendarOptions::with_scheme(config.calendar_scheme));
    ui::forward_updates(&app, rt.handle(), explorer.subscribe(), client);

    // =============================================
    //  CALLBACK: search-requested
    // =============================================
    {
        let explorer = explorer.clone();
        let handle = rt.handle().clone();

        app.on_search_requested(move |query| {
            let explorer = explorer.clone();
            let query = query.to_string();

            handle.spawn(async move {
                explorer.submit(&query).await;
            });
        });
    }

    // =============================================
    //  CALLBACK: profile-clicked / repo-clicked
    // =============================================
    app.on_profile_clicked(|url| open_in_browser(url.as_str()));
    app.on_repo_clicked(|url| open_in_browser(url.as_str()));

    // Run the Slint event loop
    app.run()?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("github_profile_explorer=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn open_in_browser(url: &str) {
    if let Err(e) = open::that(url) {
        warn!(%url, error = %e, "failed to open browser");
    }
}
