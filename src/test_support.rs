//! A local stand-in for the GitHub API, served by axum on an ephemeral port.

use std::collections::HashMap;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use url::Url;

use crate::controller::{LocalTask, UiExecutor};

/// Runs UI-side tasks on the surrounding `LocalSet`.
pub struct LocalExecutor;

impl UiExecutor for LocalExecutor {
    fn spawn_local(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Hit {
    pub login: String,
    pub content_type: Option<String>,
    pub query: Option<String>,
}

struct MockState {
    replies: HashMap<String, Reply>,
    avatar_png: Vec<u8>,
    hits: Mutex<Vec<Hit>>,
}

pub struct MockGithub {
    pub base: Url,
    state: Arc<MockState>,
}

impl MockGithub {
    /// Unknown logins answer 404. `/avatars/{file}` serves a 4x2 PNG;
    /// `slow.png` takes 300ms, `missing.png` is 404 and `corrupt.png` is not an image.
    pub async fn start(replies: Vec<(&str, Reply)>) -> Self {
        let state = Arc::new(MockState {
            replies: replies
                .into_iter()
                .map(|(login, reply)| (login.to_owned(), reply))
                .collect(),
            avatar_png: tiny_png(4, 2),
            hits: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/users/{login}", get(user))
            .route("/avatars/{file}", get(avatar))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            state,
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn avatar_url(&self, file: &str) -> Url {
        self.base.join(&format!("avatars/{file}")).unwrap()
    }
}

async fn user(
    State(state): State<Arc<MockState>>,
    Path(login): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    state.hits.lock().unwrap().push(Hit {
        login: login.clone(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        query,
    });

    let Some(reply) = state.replies.get(&login).cloned() else {
        return (StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#).into_response();
    };
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    (
        StatusCode::from_u16(reply.status).unwrap(),
        [(CONTENT_TYPE, "application/json")],
        reply.body,
    )
        .into_response()
}

async fn avatar(State(state): State<Arc<MockState>>, Path(file): Path<String>) -> Response {
    if file == "missing.png" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if file == "slow.png" {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if file == "corrupt.png" {
        return ([(CONTENT_TYPE, "image/png")], b"not an image".to_vec()).into_response();
    }
    ([(CONTENT_TYPE, "image/png")], state.avatar_png.clone()).into_response()
}

pub fn profile_json(login: &str, name: &str, followers: u64, following: u64, avatar: &str) -> String {
    serde_json::json!({
        "login": login,
        "id": 1,
        "name": name,
        "followers": followers,
        "following": following,
        "avatar_url": avatar,
        "html_url": format!("https://github.com/{login}"),
    })
    .to_string()
}

/// A base URL nothing listens on.
pub fn closed_port_base() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/")).unwrap()
}

fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}
