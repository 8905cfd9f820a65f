//! Sign-out route handler that invalidates the session cookie and redirects users.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_session_cookie, endpoints};

/// Invalidate the session cookie and redirect the client to the sign-in page.
pub async fn get_sign_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::SIGN_IN_VIEW)).into_response()
}

#[cfg(test)]
mod sign_out_tests {
    use axum::http::header::SET_COOKIE;
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{DEFAULT_COOKIE_DURATION, cookie::COOKIE_SESSION, set_session_cookie},
        endpoints,
        test_utils::{assert_redirect, test_user},
    };

    use super::get_sign_out;

    #[tokio::test]
    async fn sign_out_invalidates_session_cookie_and_redirects() {
        let jar = PrivateCookieJar::new(create_cookie_key("42"));
        let jar = set_session_cookie(jar, &test_user(), DEFAULT_COOKIE_DURATION).unwrap();

        let response = get_sign_out(jar).await;

        assert_redirect(&response, endpoints::SIGN_IN_VIEW);
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_SESSION)
            .expect("session cookie not cleared");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }
}
