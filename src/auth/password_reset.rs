//! The two steps of resetting a forgotten password: asking the backend to
//! e-mail a reset link, then setting a new password with the token from that link.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ApiClient, GENERIC_ERROR_MESSAGE},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, auth_card, base, field_error, input_field, submit_button,
    },
    validation::{validate_email, validate_password},
};

pub const RESET_LINK_SENT_MSG: &str = "Password reset link has been sent to your email! \
    If you cannot find the message, check your spam folder.";
const SEND_RESET_FAILED_MSG: &str = "Failed to send reset email. Please try again.";
const RESET_FAILED_MSG: &str = "Failed to reset password. Please try again.";

fn back_to_sign_in() -> Markup {
    html! {
        p class="text-sm font-light text-gray-500 dark:text-gray-400"
        {
            "Remembered it? "
            a href=(endpoints::SIGN_IN_VIEW) class=(LINK_STYLE) { "Back to sign in" }
        }
    }
}

fn forgot_password_form(email: &str, error: Option<&str>, sent: bool) -> Markup {
    html! {
        form
            hx-post=(endpoints::FORGOT_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Enter your email address and we will send you a link to reset your password."
            }

            (input_field("Email", "email", "email", email, error))

            @if sent {
                p class="text-sm text-green-600 dark:text-green-400" { (RESET_LINK_SENT_MSG) }
            }

            (submit_button("Send reset link"))

            (back_to_sign_in())
        }
    }
}

/// Display the page for requesting a password reset e-mail.
pub async fn get_forgot_password_page() -> Response {
    let content = auth_card("Forgot your password?", &forgot_password_form("", None, false));

    base("Forgot Password", &[], &content).into_response()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Ask the backend to e-mail a reset link to the given address.
///
/// On success the form is cleared and a confirmation is shown under it.
pub async fn post_forgot_password(
    State(api): State<ApiClient>,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    if let Err(error) = validate_email(&form.email) {
        return forgot_password_form(&form.email, Some(&error), false).into_response();
    }

    let body = serde_json::json!({ "email": form.email });

    match api.post_empty("/auth/forgot-password", &body, None).await {
        Ok(()) => forgot_password_form("", None, true).into_response(),
        Err(error) => {
            let message = match error.user_message() {
                GENERIC_ERROR_MESSAGE => SEND_RESET_FAILED_MSG,
                message => message,
            };
            forgot_password_form(&form.email, Some(message), false).into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct ResetTokenQuery {
    pub token: Option<String>,
}

#[derive(Default)]
struct ResetErrors {
    new_password: Option<String>,
    confirm_password: Option<String>,
    form: Option<String>,
}

fn reset_password_form(token: &str, errors: &ResetErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::RESET_PASSWORD_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            input type="hidden" name="token" value=(token);

            (input_field(
                "New password",
                "password",
                "new_password",
                "",
                errors.new_password.as_deref()
            ))
            p class="text-xs text-gray-500 dark:text-gray-400"
            {
                "6 to 50 characters: letters, digits and $ / - _"
            }
            (input_field(
                "Confirm new password",
                "password",
                "confirm_password",
                "",
                errors.confirm_password.as_deref()
            ))

            (field_error(errors.form.as_deref()))

            (submit_button("Reset password"))

            (back_to_sign_in())
        }
    }
}

fn invalid_reset_link() -> Markup {
    html! {
        div class="space-y-4"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "The password reset link is invalid or has expired."
            }

            a href=(endpoints::FORGOT_PASSWORD_VIEW) class=(BUTTON_PRIMARY_STYLE)
            {
                "Request a new reset link"
            }
        }
    }
}

/// Display the page for choosing a new password, reached from the reset e-mail.
pub async fn get_reset_password_page(Query(query): Query<ResetTokenQuery>) -> Response {
    let content = match query.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => {
            auth_card("Reset password", &reset_password_form(token, &ResetErrors::default()))
        }
        _ => auth_card("Invalid reset link", &invalid_reset_link()),
    };

    base("Reset Password", &[], &content).into_response()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Set a new password and send the user to the sign-in page.
pub async fn post_reset_password(
    State(api): State<ApiClient>,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let errors = ResetErrors {
        new_password: validate_password(&form.new_password).err(),
        confirm_password: (form.new_password != form.confirm_password)
            .then(|| "Passwords do not match".to_owned()),
        form: form
            .token
            .trim()
            .is_empty()
            .then(|| "Invalid reset token".to_owned()),
    };

    if errors.new_password.is_some() || errors.confirm_password.is_some() || errors.form.is_some()
    {
        return reset_password_form(&form.token, &errors).into_response();
    }

    let body = serde_json::json!({ "token": form.token, "newPassword": form.new_password });

    match api.post_empty("/auth/reset-password", &body, None).await {
        Ok(()) => {
            tracing::info!("Password reset completed");
            (
                HxRedirect(endpoints::SIGN_IN_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            let message = match error.user_message() {
                GENERIC_ERROR_MESSAGE => RESET_FAILED_MSG,
                message => message,
            };
            let errors = ResetErrors {
                form: Some(message.to_owned()),
                ..Default::default()
            };
            reset_password_form(&form.token, &errors).into_response()
        }
    }
}
