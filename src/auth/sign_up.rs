//! The registration page and the endpoint that creates an account and signs the new user in.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{
        UserData,
        sign_in::{SignInState, refusal_message, start_session},
    },
    endpoints,
    html::{LINK_STYLE, auth_card, base, field_error, input_field, submit_button},
    validation::{validate_email, validate_login, validate_password},
};

const REGISTRATION_FAILED_MSG: &str = "Could not create your account. Please try again.";

#[derive(Clone, Serialize, Deserialize)]
pub struct SignUpForm {
    pub login: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Default)]
struct SignUpErrors {
    login: Option<String>,
    email: Option<String>,
    password: Option<String>,
    confirm_password: Option<String>,
    form: Option<String>,
}

impl SignUpErrors {
    fn any_field(&self) -> bool {
        self.login.is_some()
            || self.email.is_some()
            || self.password.is_some()
            || self.confirm_password.is_some()
    }
}

fn sign_up_form(login: &str, email: &str, errors: &SignUpErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_UP_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            (input_field("Login", "text", "login", login, errors.login.as_deref()))
            (input_field("Email", "email", "email", email, errors.email.as_deref()))
            (input_field("Password", "password", "password", "", errors.password.as_deref()))
            (input_field(
                "Confirm password",
                "password",
                "confirm_password",
                "",
                errors.confirm_password.as_deref()
            ))

            (field_error(errors.form.as_deref()))

            (submit_button("Create account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::SIGN_IN_VIEW) class=(LINK_STYLE) { "Sign in here" }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form("", "", &SignUpErrors::default());
    let content = auth_card("Create an account", &form);

    base("Sign Up", &[], &content).into_response()
}

/// Register a new user and start their session.
///
/// Invalid fields are reported inline and nothing is sent to the backend.
pub async fn post_sign_up(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    let errors = SignUpErrors {
        login: validate_login(&form.login).err(),
        email: validate_email(&form.email).err(),
        password: validate_password(&form.password).err(),
        confirm_password: (form.password != form.confirm_password)
            .then(|| "Passwords do not match".to_owned()),
        form: None,
    };

    if errors.any_field() {
        return sign_up_form(&form.login, &form.email, &errors).into_response();
    }

    let body = serde_json::json!({
        "login": form.login,
        "password": form.password,
        "email": form.email,
    });
    let user: UserData = match state.api.post("/auth/signup", &body, None).await {
        Ok(user) => user,
        Err(error) => {
            let errors = SignUpErrors {
                form: Some(refusal_message(&error, REGISTRATION_FAILED_MSG)),
                ..Default::default()
            };
            return sign_up_form(&form.login, &form.email, &errors).into_response();
        }
    };

    tracing::info!("Registered new user {}", user.login);
    start_session(jar, &user, state.cookie_duration, None)
}
