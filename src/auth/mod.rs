//! Session handling and the pages for signing in, signing up and resetting passwords.

mod cookie;
mod middleware;
mod password_reset;
mod redirect;
mod sign_in;
mod sign_out;
mod sign_up;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, UserData, get_session, invalidate_session_cookie, set_session_cookie,
};
#[cfg(test)]
pub(crate) use cookie::COOKIE_SESSION;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password_reset::{
    get_forgot_password_page, get_reset_password_page, post_forgot_password, post_reset_password,
};
pub use redirect::normalize_redirect_url;
pub use sign_in::{SignInState, get_sign_in_page, post_sign_in};
pub use sign_out::get_sign_out;
pub use sign_up::{get_sign_up_page, post_sign_up};
