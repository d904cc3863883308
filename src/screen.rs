//! Binds the profile store to the slint window.

use slint::{ComponentHandle, Image, Rgba8Pixel, SharedPixelBuffer};
use tokio::runtime::Handle;

use crate::avatar::{AvatarLoader, AvatarPixels};
use crate::controller::{LocalTask, UiExecutor};
use crate::store::{ProfileStore, Subscription};
use crate::view;
use crate::AppWindow;

/// Spawns onto the slint event loop.
pub struct SlintExecutor;

impl UiExecutor for SlintExecutor {
    fn spawn_local(&self, task: LocalTask) {
        if let Err(err) = slint::spawn_local(task) {
            tracing::error!(%err, "cannot schedule work on the UI event loop");
        }
    }
}

/// Renders every store value into `app`. The window stays bound while the
/// returned subscription is alive.
pub fn bind(
    app: &AppWindow,
    store: &ProfileStore,
    http: reqwest::Client,
    runtime: Handle,
    avatar_size: u32,
) -> Subscription {
    let app_weak = app.as_weak();

    let avatar_target = app.as_weak();
    let avatars = AvatarLoader::new(
        http,
        runtime,
        SlintExecutor,
        avatar_size,
        move |pixels: Option<&AvatarPixels>| {
            let Some(app) = avatar_target.upgrade() else { return };
            let image = match pixels {
                Some(pixels) => Image::from_rgba8(SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
                    &pixels.rgba,
                    pixels.width,
                    pixels.height,
                )),
                None => Image::default(),
            };
            app.set_avatar(image);
        },
    );

    store.subscribe(move |state| {
        let Some(app) = app_weak.upgrade() else { return };
        if state.is_absent() {
            tracing::debug!(failure = ?state.failure(), "showing empty profile");
        }
        let view = view::render(state);

        app.set_name_text(view.name.into());
        app.set_login_text(view.login.into());
        app.set_followers_text(view.followers.into());
        app.set_following_text(view.following.into());
        avatars.show(&view.avatar);
    })
}
