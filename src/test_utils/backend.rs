//! A fake finance backend for handler tests.
//!
//! Tests describe the backend as an axum router, serve it on an ephemeral
//! port and point the [AppState] at it. Every request the fake receives is
//! recorded so tests can check what was sent.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{DEFAULT_COOKIE_DURATION, UserData, set_session_cookie},
    pagination::PaginationConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// The body decoded as JSON.
    #[track_caller]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

pub(crate) struct FakeBackend {
    pub url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeBackend {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The recorded requests with `method` to `path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .collect()
    }
}

async fn record(
    State(requests): State<Arc<Mutex<Vec<RecordedRequest>>>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    requests.lock().unwrap().push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        authorization: parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        body: String::from_utf8_lossy(&bytes).to_string(),
    });

    next.run(Request::from_parts(parts, bytes.into())).await
}

/// Serve `router` on 127.0.0.1 with an OS-assigned port.
pub(crate) async fn spawn_backend(router: Router) -> FakeBackend {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let router = router.layer(middleware::from_fn_with_state(requests.clone(), record));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    FakeBackend {
        url: format!("http://{address}"),
        requests,
    }
}

/// App state whose backend and rate table are both served at `url`.
pub(crate) fn test_state(url: &str) -> AppState {
    AppState::new("foobar", url, url, "Etc/UTC", PaginationConfig::default())
}

pub(crate) fn test_user() -> UserData {
    UserData {
        token: "test-token".to_owned(),
        login: "test.user".to_owned(),
        currency: "UAH".to_owned(),
        id: Uuid::nil(),
    }
}

/// The encrypted session cookie for `user`, as the browser would send it back.
pub(crate) fn session_cookie_for_key(key: &Key, user: &UserData) -> Cookie<'static> {
    let jar = set_session_cookie(PrivateCookieJar::new(key.clone()), user, DEFAULT_COOKIE_DURATION)
        .unwrap();
    let response = jar.into_response();
    let header = response
        .headers()
        .get(SET_COOKIE)
        .expect("no session cookie set")
        .to_str()
        .unwrap()
        .to_owned();

    Cookie::parse(header).unwrap()
}

pub(crate) fn session_cookie(state: &AppState, user: &UserData) -> Cookie<'static> {
    session_cookie_for_key(&state.cookie_key, user)
}
