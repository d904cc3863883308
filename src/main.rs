#![windows_subsystem = "windows"]
mod avatar;
mod client;
mod config;
mod controller;
mod models;
mod screen;
mod store;
#[cfg(test)]
mod test_support;
mod view;
slint::include_modules!();

use std::rc::Rc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::GithubClient;
use crate::config::Config;
use crate::controller::ProfileFetchController;
use crate::screen::SlintExecutor;
use crate::store::ProfileStore;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,github_profile_search=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(api_base = %config.api_base, authenticated = config.token.is_some(), "starting");

    // Shared HTTP Client
    let client = GithubClient::new(&config)?;

    // Background tokio runtime for async HTTP
    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    let app = AppWindow::new()?;

    let controller = Rc::new(ProfileFetchController::new(
        client.clone(),
        ProfileStore::new(),
        rt.handle().clone(),
        SlintExecutor,
    ));
    let store = controller.store().clone();

    let _binding = screen::bind(
        &app,
        &store,
        client.http().clone(),
        rt.handle().clone(),
        config.avatar_size,
    );
    tracing::debug!(observers = store.subscriber_count(), "window bound to profile store");

    {
        let controller = controller.clone();
        app.on_search_submitted(move |term| {
            controller.on_search_submitted(&term);
        });
    }
    {
        let controller = controller.clone();
        app.on_search_edited(move |text| controller.on_search_text_changed(&text));
    }
    // The window callbacks now own the controller; it aborts any request when they drop.
    drop(controller);

    app.run()?;
    tracing::debug!(last = ?store.current(), "window closed");

    Ok(())
}
