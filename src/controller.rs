//! Turns search submissions into profile lookups.
//!
//! HTTP runs on the background tokio runtime. The completion is awaited from
//! a task spawned on the UI executor, so the store is only ever written on
//! the UI thread. Each submission gets a sequence number; only the latest one
//! may write the store, and submitting again aborts the previous request.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinError};
use tracing::{debug, error, info, warn};

use crate::client::{FetchError, GithubClient};
use crate::models::{FailureKind, Profile, ProfileState};
use crate::store::ProfileStore;

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs `!Send` futures on the UI thread.
pub trait UiExecutor {
    fn spawn_local(&self, task: LocalTask);
}

pub struct ProfileFetchController<E: UiExecutor> {
    client: GithubClient,
    store: ProfileStore,
    runtime: Handle,
    executor: E,
    latest: Rc<Cell<u64>>,
    in_flight: RefCell<Option<AbortHandle>>,
}

impl<E: UiExecutor> ProfileFetchController<E> {
    pub fn new(client: GithubClient, store: ProfileStore, runtime: Handle, executor: E) -> Self {
        Self {
            client,
            store,
            runtime,
            executor,
            latest: Rc::new(Cell::new(0)),
            in_flight: RefCell::new(None),
        }
    }

    /// Starts a lookup for `term` and returns its sequence number.
    ///
    /// Blank terms are ignored and return `None`.
    pub fn on_search_submitted(&self, term: &str) -> Option<u64> {
        let username = term.trim();
        if username.is_empty() {
            return None;
        }

        let seq = self.latest.get() + 1;
        self.latest.set(seq);

        if let Some(previous) = self.in_flight.borrow_mut().take() {
            previous.abort();
        }

        info!(seq, username, "searching");

        let client = self.client.clone();
        let owned = username.to_owned();
        let request = self
            .runtime
            .spawn(async move { client.fetch_profile(&owned).await });
        *self.in_flight.borrow_mut() = Some(request.abort_handle());

        let store = self.store.clone();
        let latest = Rc::downgrade(&self.latest);
        let username = username.to_owned();
        self.executor.spawn_local(Box::pin(async move {
            let finished = request.await;
            apply_completion(&store, &latest, seq, &username, finished);
        }));

        Some(seq)
    }

    /// Live text-change hook from the search field. Logged only.
    pub fn on_search_text_changed(&self, text: &str) {
        debug!(text, "search text changed");
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }
}

impl<E: UiExecutor> Drop for ProfileFetchController<E> {
    fn drop(&mut self) {
        if let Some(request) = self.in_flight.get_mut().take() {
            request.abort();
        }
    }
}

/// Writes a finished request into the store, unless the controller is gone
/// or a newer submission has been issued since.
fn apply_completion(
    store: &ProfileStore,
    latest: &Weak<Cell<u64>>,
    seq: u64,
    username: &str,
    finished: Result<Result<Profile, FetchError>, JoinError>,
) {
    let Some(latest) = latest.upgrade() else {
        return;
    };
    if latest.get() != seq {
        debug!(seq, latest = latest.get(), "discarding stale response");
        return;
    }

    let state = match finished {
        Ok(outcome) => settle(username, outcome),
        Err(err) if err.is_cancelled() => {
            debug!(seq, "request cancelled");
            return;
        }
        Err(err) => {
            error!(seq, %err, "profile request task failed");
            ProfileState::Failed(FailureKind::Transport)
        }
    };
    store.set(state);
}

fn settle(username: &str, outcome: Result<Profile, FetchError>) -> ProfileState {
    match outcome {
        Ok(profile) => {
            info!(login = %profile.login, "profile loaded");
            ProfileState::Loaded(profile)
        }
        Err(err) => {
            warn!(username, error = %err, "profile lookup failed");
            ProfileState::Failed(err.kind())
        }
    }
}
