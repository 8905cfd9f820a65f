//! The client for the finance backend REST API.
//!
//! Every call takes the session token, which is attached as a bearer token.
//! Non-success responses are normalized into [ApiError] so that handlers can
//! show the backend's message, or a generic fallback when there is none.

use std::{collections::BTreeMap, fmt::Display};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Shown to the user when a request fails and the backend did not explain why.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// The ways a call to the backend can fail.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ApiError {
    /// The backend rejected the session token, so the session is over.
    #[error("the backend rejected the session token")]
    Unauthorized,

    /// The backend responded with a non-success status code.
    #[error("the backend responded with {status}: {message:?}")]
    Backend {
        /// The HTTP status code of the response.
        status: u16,
        /// The `message` field of the error body, if there was one.
        message: Option<String>,
        /// Field level validation errors formatted as "field: message".
        details: Vec<String>,
    },

    /// The request never got a response, e.g. the backend is down.
    #[error("could not reach the backend: {0}")]
    Network(String),

    /// The backend responded with a body that could not be decoded.
    #[error("could not decode the backend response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// The message to show the user: the backend's own message when present,
    /// otherwise [GENERIC_ERROR_MESSAGE].
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Backend {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message,
            _ => GENERIC_ERROR_MESSAGE,
        }
    }

    /// The status code to forward to the browser for this error.
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            ApiError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
            ApiError::Backend { status, .. } => axum::http::StatusCode::from_u16(*status)
                .ok()
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(axum::http::StatusCode::BAD_GATEWAY),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => {
                axum::http::StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// The error body the backend sends with 4xx and 5xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    validation_errors: BTreeMap<String, String>,
}

/// A cheaply cloneable client for the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend served at `base_url`, e.g. "http://localhost:8080".
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{method} {url}");

        let request = self.http.request(method, url);

        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, ApiError> {
        let response = send(self.request(Method::GET, path, Some(token)), true).await?;
        decode(response).await
    }

    /// GET `path` with `query` as the query string and decode the JSON response.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q, token: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, path, Some(token)).query(query);
        let response = send(request, true).await?;
        decode(response).await
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    ///
    /// `token` is `None` for the sign-in and sign-up endpoints, which also
    /// means a 401 is reported as a normal backend error instead of
    /// [ApiError::Unauthorized].
    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, token).json(body);
        let response = send(request, token.is_some()).await?;
        decode(response).await
    }

    /// POST `body` as JSON to `path` and ignore the response body.
    pub async fn post_empty<B>(&self, path: &str, body: &B, token: Option<&str>) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path, token).json(body);
        send(request, token.is_some()).await.map(|_| ())
    }

    /// PUT `body` as JSON to `path` and decode the JSON response.
    pub async fn put<B, T>(&self, path: &str, body: &B, token: &str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path, Some(token)).json(body);
        let response = send(request, true).await?;
        decode(response).await
    }

    /// PUT to `path` without a body and ignore the response body.
    pub async fn put_empty(&self, path: &str, token: &str) -> Result<(), ApiError> {
        let request = self.request(Method::PUT, path, Some(token));
        send(request, true).await.map(|_| ())
    }

    /// DELETE `path` and ignore the response body.
    pub async fn delete(&self, path: &str, token: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path, Some(token));
        send(request, true).await.map(|_| ())
    }
}

async fn send(request: RequestBuilder, authenticated: bool) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(|error| {
        tracing::error!("Could not reach the backend: {error}");
        ApiError::Network(error.to_string())
    })?;

    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED && authenticated {
        tracing::info!("The backend rejected the session token for {}", response.url());
        return Err(ApiError::Unauthorized);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    tracing::warn!("The backend responded with {status}: {text}");

    Err(ApiError::Backend {
        status: status.as_u16(),
        message: body.message,
        details: format_details(body.validation_errors),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let url = response.url().clone();

    response.json::<T>().await.map_err(|error| {
        tracing::error!("Could not decode the response from {url}: {error}");
        ApiError::InvalidResponse(error.to_string())
    })
}

fn format_details<K: Display, V: Display>(errors: BTreeMap<K, V>) -> Vec<String> {
    errors
        .into_iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect()
}
