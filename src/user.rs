//! Changing the signed-in user's default currency.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use maud::html;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{UserData, set_session_cookie},
    client::ApiClient,
    currency::find_currency,
    manage::currency_form,
};

/// The state needed to change the user's settings and refresh their session.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which session cookies are valid.
    pub cookie_duration: Duration,
    pub api: ApiClient,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api: state.api.clone(),
        }
    }
}

impl FromRef<UserState> for Key {
    fn from_ref(state: &UserState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    pub currency: String,
}

/// Ask the backend to change the default currency of the user.
pub async fn change_currency(api: &ApiClient, token: &str, code: &str) -> Result<(), Error> {
    Ok(api
        .put_empty(&format!("/user/changeCurrency/{code}"), token)
        .await?)
}

/// Change the user's default currency and store it in the session so new
/// forms and formatted amounts pick it up.
pub async fn change_currency_endpoint(
    State(state): State<UserState>,
    Extension(user): Extension<UserData>,
    jar: PrivateCookieJar,
    Form(form): Form<CurrencyForm>,
) -> Response {
    let Some(currency) = find_currency(&form.currency) else {
        let error = format!("Unsupported currency \"{}\"", form.currency.trim());
        return currency_form(user.currency().code, Some(&error)).into_response();
    };

    if let Err(error) = change_currency(&state.api, &user.token, currency.code).await {
        tracing::error!("Could not change the currency of user {}: {error}", user.id);
        return error.into_alert_response();
    }

    let user = UserData {
        currency: currency.code.to_owned(),
        ..user
    };
    let jar = match set_session_cookie(jar, &user, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => return error.into_alert_response(),
    };
    tracing::info!("User {} changed their currency to {}", user.id, currency.code);

    (
        jar,
        html! {
            (currency_form(currency.code, None))
            (Alert::SuccessSimple {
                message: format!("Default currency changed to {}", currency.code),
            }
            .into_oob_html())
        },
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Router,
        extract::{FromRef, State},
        http::{HeaderMap, StatusCode, header::COOKIE},
        routing::put,
    };
    use axum_extra::extract::{Form, PrivateCookieJar, cookie::Cookie};

    use crate::{
        auth::get_session,
        test_utils::{
            element_text, get_header, must_get_form, parse_html_fragment, spawn_backend,
            test_state, test_user,
        },
    };

    use super::{CurrencyForm, UserState, change_currency_endpoint};

    #[tokio::test]
    async fn changes_currency_and_updates_session() {
        let backend = spawn_backend(
            Router::new().route("/user/changeCurrency/{code}", put(|| async {})),
        )
        .await;
        let state = UserState::from_ref(&test_state(&backend.url));
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = change_currency_endpoint(
            State(state.clone()),
            Extension(test_user()),
            jar,
            Form(CurrencyForm {
                currency: "eur".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            backend.requests_to("PUT", "/user/changeCurrency/EUR")[0]
                .authorization
                .as_deref(),
            Some("Bearer test-token")
        );

        let cookie = Cookie::parse(get_header(&response, "set-cookie")).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("{}={}", cookie.name(), cookie.value()).parse().unwrap(),
        );
        let jar = PrivateCookieJar::from_headers(&headers, state.cookie_key);
        let session = get_session(&jar);
        assert_eq!(session.map(|user| user.currency), Some("EUR".to_owned()));

        let html = parse_html_fragment(response).await;
        must_get_form(&html);
        assert_eq!(
            element_text(&html, "#alert-container p"),
            ["Default currency changed to EUR"]
        );
    }

    #[tokio::test]
    async fn unknown_currency_is_not_sent() {
        let backend = spawn_backend(Router::new()).await;
        let state = UserState::from_ref(&test_state(&backend.url));
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = change_currency_endpoint(
            State(state),
            Extension(test_user()),
            jar,
            Form(CurrencyForm {
                currency: "XYZ".to_owned(),
            }),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_eq!(
            element_text(&html, "form p"),
            ["Unsupported currency \"XYZ\""]
        );
        assert!(backend.requests().is_empty());
    }
}
