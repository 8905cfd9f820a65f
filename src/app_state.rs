//! Implements a struct that holds the state of the web server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    auth::DEFAULT_COOKIE_DURATION,
    client::{ApiClient, RateClient},
    pagination::PaginationConfig,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The client for the finance backend.
    pub api: ApiClient,

    /// The client for the currency-rate table.
    pub rates: RateClient,
}

impl AppState {
    /// Create a new [AppState] that talks to the backend at `backend_url` and
    /// looks up exchange rates at `rates_url`.
    ///
    /// Both clients share one connection pool.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Kyiv".
    pub fn new(
        cookie_secret: &str,
        backend_url: &str,
        rates_url: &str,
        local_timezone: &str,
        pagination_config: PaginationConfig,
    ) -> Self {
        let http = reqwest::Client::new();

        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            pagination_config,
            api: ApiClient::new(http.clone(), backend_url),
            rates: RateClient::new(http, rates_url),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for ApiClient {
    fn from_ref(state: &AppState) -> Self {
        state.api.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
