//! Stores the signed-in user's session in an encrypted private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    Error,
    currency::{Currency, DEFAULT_CURRENCY, find_currency},
};

pub(crate) const COOKIE_SESSION: &str = "user_data";
/// The default duration for which session cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::days(7);

/// The signed-in user, as returned by the backend's sign-in endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// The bearer token for backend calls.
    pub token: String,
    pub login: String,
    /// The code of the user's default currency.
    pub currency: String,
    pub id: Uuid,
}

impl UserData {
    /// The user's default currency, falling back to [DEFAULT_CURRENCY] for unknown codes.
    pub fn currency(&self) -> &'static Currency {
        find_currency(&self.currency).unwrap_or(DEFAULT_CURRENCY)
    }
}

fn session_cookie<'a>(value: String) -> Cookie<'a> {
    Cookie::build((COOKIE_SESSION, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the session cookie to the cookie jar, indicating that `user` is signed in.
///
/// The cookie expires `duration` from now.
///
/// # Errors
///
/// Returns a [Error::JSONSerializationError] if `user` cannot be serialized.
pub fn set_session_cookie(
    jar: PrivateCookieJar,
    user: &UserData,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(user)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    let mut cookie = session_cookie(value);
    cookie.set_expires(OffsetDateTime::now_utc() + duration);

    Ok(jar.add(cookie))
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub fn invalidate_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = session_cookie("deleted".to_owned());
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie.set_max_age(Duration::ZERO);

    jar.add(cookie)
}

/// The signed-in user, or `None` if the cookie is missing or cannot be read.
pub fn get_session(jar: &PrivateCookieJar) -> Option<UserData> {
    let cookie = jar.get(COOKIE_SESSION)?;

    match serde_json::from_str(cookie.value_trimmed()) {
        Ok(user) => Some(user),
        Err(error) => {
            tracing::debug!("Ignoring unreadable session cookie: {error}");
            None
        }
    }
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::SameSite};
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::cookie::{COOKIE_SESSION, DEFAULT_COOKIE_DURATION},
        test_utils::test_user,
    };

    use super::{get_session, invalidate_session_cookie, set_session_cookie};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("foobar"))
    }

    #[test]
    fn can_round_trip_session() {
        let user = test_user();

        let jar = set_session_cookie(get_jar(), &user, DEFAULT_COOKIE_DURATION).unwrap();

        assert_eq!(get_session(&jar), Some(user));
    }

    #[test]
    fn cookie_is_locked_down() {
        let jar = set_session_cookie(get_jar(), &test_user(), Duration::days(7)).unwrap();

        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        let expires = cookie.expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + Duration::days(7);
        assert!((expires - want).abs() < Duration::seconds(1));
    }

    #[test]
    fn invalidated_cookie_has_no_session() {
        let jar = set_session_cookie(get_jar(), &test_user(), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_session_cookie(jar);
        let cookie = jar.get(COOKIE_SESSION).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_session(&jar), None);
    }

    #[test]
    fn unknown_currency_falls_back_to_default() {
        let mut user = test_user();
        user.currency = "XXX".to_owned();

        assert_eq!(user.currency().code, "USD");
    }
}
