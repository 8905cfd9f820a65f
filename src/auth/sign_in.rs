//! This file defines the routes for displaying the sign-in page and handling sign-in requests.
//! The backend checks the credentials and hands back the session token.

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState,
    auth::{UserData, invalidate_session_cookie, normalize_redirect_url, set_session_cookie},
    client::{ApiClient, ApiError, GENERIC_ERROR_MESSAGE},
    endpoints,
    html::{LINK_STYLE, auth_card, base, field_error, input_field, submit_button},
    validation::{validate_login, validate_password},
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Invalid login credentials. Please try again.";

/// The state needed to sign in or sign up.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    pub api: ApiClient,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the sign-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignInForm {
    pub login: String,
    pub password: String,
    /// Optional URL to redirect to after signing in.
    /// Only accepted from the sign-in form submission.
    pub redirect_url: Option<String>,
}

#[derive(Default)]
struct SignInErrors {
    login: Option<String>,
    password: Option<String>,
    form: Option<String>,
}

fn sign_in_form(login: &str, errors: &SignInErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (input_field("Login", "text", "login", login, errors.login.as_deref()))
            (input_field("Password", "password", "password", "", errors.password.as_deref()))

            (field_error(errors.form.as_deref()))

            (submit_button("Sign in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "
                a href=(endpoints::FORGOT_PASSWORD_VIEW) class=(LINK_STYLE) { "Reset it here" }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                a href=(endpoints::SIGN_UP_VIEW) class=(LINK_STYLE) { "Sign up here" }
            }
        }
    }
}

pub(super) fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the sign-in page.
pub async fn get_sign_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "sign-in query");
    let form = sign_in_form("", &SignInErrors::default(), redirect_url.as_deref());
    let content = auth_card("Sign in to your account", &form);

    base("Sign In", &[], &content).into_response()
}

/// The message to show under a sign-in or sign-up form when the backend refused it.
pub(super) fn refusal_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Backend { status, .. } if (400..500).contains(status) => {
            match error.user_message() {
                GENERIC_ERROR_MESSAGE => fallback.to_owned(),
                message => message.to_owned(),
            }
        }
        error => error.user_message().to_owned(),
    }
}

/// Store `user` in the session cookie and send the client on to `redirect_url`.
pub(super) fn start_session(
    jar: PrivateCookieJar,
    user: &UserData,
    duration: Duration,
    redirect_url: Option<&str>,
) -> Response {
    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_session_cookie(jar.clone(), user, duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting session cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
                .into_response()
        }
    }
}

/// Handler for sign-in requests via the POST method.
///
/// On a successful sign-in request, the session cookie is set and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "sign-in form");
    let redirect_url = redirect_url.as_deref();

    let errors = SignInErrors {
        login: validate_login(&form.login).err(),
        password: validate_password(&form.password).err(),
        form: None,
    };

    if errors.login.is_some() || errors.password.is_some() {
        return sign_in_form(&form.login, &errors, redirect_url).into_response();
    }

    let body = serde_json::json!({ "login": form.login, "password": form.password });
    let user: UserData = match state.api.post("/auth/signin", &body, None).await {
        Ok(user) => user,
        Err(error) => {
            let errors = SignInErrors {
                form: Some(refusal_message(&error, INVALID_CREDENTIALS_ERROR_MSG)),
                ..Default::default()
            };
            return sign_in_form(&form.login, &errors, redirect_url).into_response();
        }
    };

    tracing::info!("{} signed in", user.login);
    start_session(jar, &user, state.cookie_duration, redirect_url)
}
