use std::cell::{Cell, RefCell};
use std::rc::Rc;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use url::Url;

use crate::controller::UiExecutor;
use crate::view::AvatarView;

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("failed to download avatar: {0}")]
    Request(#[from] reqwest::Error),
    #[error("avatar server answered {0}")]
    Status(u16),
    #[error("failed to decode avatar image: {0}")]
    Image(#[from] image::ImageError),
}

/// Square RGBA8 pixels ready for `slint::SharedPixelBuffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPixels {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// GitHub serves a resized avatar when asked with `s=<size>`.
pub fn sized_url(url: &Url, size: u32) -> Url {
    let mut sized = url.clone();
    sized.query_pairs_mut().append_pair("s", &size.to_string());
    sized
}

/// Downloads avatar image bytes and decodes them into `size`x`size` RGBA pixels.
pub async fn fetch_avatar(client: &Client, url: &Url, size: u32) -> Result<AvatarPixels, AvatarError> {
    let response = client.get(sized_url(url, size)).send().await?;
    if !response.status().is_success() {
        return Err(AvatarError::Status(response.status().as_u16()));
    }
    let bytes = response.bytes().await?;

    // The server may ignore `s` (cached avatars often come back larger).
    let rgba = image::load_from_memory(&bytes)?
        .thumbnail_exact(size, size)
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(AvatarPixels {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

type AvatarSink = Rc<dyn Fn(Option<&AvatarPixels>)>;

/// Shows the avatar for whatever profile is currently rendered.
///
/// Every [`show`](Self::show) clears the sink at once and supersedes the
/// previous download; pixels only reach the sink if no newer `show` happened
/// meanwhile. A failed download leaves the avatar cleared.
pub struct AvatarLoader<E: UiExecutor> {
    http: Client,
    runtime: Handle,
    executor: E,
    size: u32,
    sink: AvatarSink,
    generation: Rc<Cell<u64>>,
    in_flight: RefCell<Option<AbortHandle>>,
}

impl<E: UiExecutor> AvatarLoader<E> {
    pub fn new<F>(http: Client, runtime: Handle, executor: E, size: u32, sink: F) -> Self
    where
        F: Fn(Option<&AvatarPixels>) + 'static,
    {
        Self {
            http,
            runtime,
            executor,
            size,
            sink: Rc::new(sink),
            generation: Rc::new(Cell::new(0)),
            in_flight: RefCell::new(None),
        }
    }

    pub fn show(&self, avatar: &AvatarView) {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        if let Some(previous) = self.in_flight.borrow_mut().take() {
            previous.abort();
        }
        (self.sink)(None);

        let AvatarView::Load(url) = avatar else { return };

        let http = self.http.clone();
        let size = self.size;
        let download = self.runtime.spawn({
            let url = url.clone();
            async move { fetch_avatar(&http, &url, size).await }
        });
        *self.in_flight.borrow_mut() = Some(download.abort_handle());

        let url = url.clone();
        let sink = self.sink.clone();
        let current = Rc::downgrade(&self.generation);
        self.executor.spawn_local(Box::pin(async move {
            let finished = download.await;
            if current.upgrade().map(|g| g.get()) != Some(generation) {
                tracing::debug!(%url, "discarding stale avatar");
                return;
            }
            match finished {
                Ok(Ok(pixels)) => sink(Some(&pixels)),
                Ok(Err(err)) => tracing::warn!(%url, error = %err, "avatar load failed"),
                Err(err) if err.is_cancelled() => {}
                Err(err) => tracing::error!(%url, %err, "avatar task failed"),
            }
        }));
    }
}

impl<E: UiExecutor> Drop for AvatarLoader<E> {
    fn drop(&mut self) {
        if let Some(download) = self.in_flight.get_mut().take() {
            download.abort();
        }
    }
}
