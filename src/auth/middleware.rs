//! Authentication middleware that reads the session cookie and handles expired sessions.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;

use crate::{
    AppState,
    auth::{
        cookie::{get_session, invalidate_session_cookie},
        redirect::{build_sign_in_redirect_url, build_sign_in_redirect_url_from_target},
    },
    endpoints,
    error::SessionExpired,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Checks for a session cookie and runs the request with the session as an
/// `Extension<UserData>`, otherwise redirects to the sign-in page using `get_redirect`.
///
/// If the backend rejected the session token while handling the request, the
/// response carries a [SessionExpired] marker. It is replaced here with a
/// redirect to the sign-in page and the session cookie is deleted.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let sign_in_redirect_url = build_sign_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to dashboard."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to dashboard.");
        }

        build_sign_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::SIGN_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to sign in page.");
            return get_redirect(&sign_in_redirect_url);
        }
    };
    let Some(user) = get_session(&jar) else {
        return get_redirect(&sign_in_redirect_url);
    };

    parts.extensions.insert(user);
    let response = next.run(Request::from_parts(parts, body)).await;

    if response.extensions().get::<SessionExpired>().is_some() {
        tracing::info!("The session has expired. Redirecting to sign in page.");
        return (
            invalidate_session_cookie(jar),
            get_redirect(&sign_in_redirect_url),
        )
            .into_response();
    }

    response
}

/// Middleware function for page routes, redirects with a 303 when there is no session.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<UserData>` to receive the session.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function for htmx routes, redirects with the HX-Redirect header when there is no session.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<UserData>` to receive the session.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
