//! Alert system for displaying success and error messages to users.
//!
//! Error alerts are swapped into `#alert-container` by htmx through
//! `hx-target-error`. Success alerts ride along with a normal response as an
//! out-of-band swap, see [Alert::into_oob_html].

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// The id of the element every page reserves for alerts.
pub const ALERT_CONTAINER_ID: &str = "alert-container";

const ALERT_CONTAINER_STYLE: &str = "w-full max-w-md px-4";
const ALERT_CONTAINER_POSITION: &str =
    "position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;";

/// A dismissable message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something worked, with an explanation.
    Success { message: String, details: String },
    /// Something worked.
    SuccessSimple { message: String },
    /// Something failed, with an explanation or a fix.
    Error { message: String, details: String },
    /// Something failed.
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    /// Render the alert on its own.
    pub fn into_html(self) -> Markup {
        let style = if self.is_success() {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg border shadow-lg \
            text-green-800 bg-green-50 border-green-300 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start gap-3 p-4 mb-4 text-sm rounded-lg border shadow-lg \
            text-red-800 bg-red-50 border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };

        let (message, details) = match self {
            Alert::Success { message, details } | Alert::Error { message, details } => {
                (message, details)
            }
            Alert::SuccessSimple { message } | Alert::ErrorSimple { message } => {
                (message, String::new())
            }
        };

        html! {
            div role="alert" class=(style)
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @for line in details.lines().filter(|line| !line.trim().is_empty()) {
                        p class="mt-1" { (line) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold leading-none"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert wrapped in a replacement for `#alert-container`, so
    /// htmx swaps it in out-of-band next to the main response content.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div
                id=(ALERT_CONTAINER_ID)
                hx-swap-oob="true"
                class=(ALERT_CONTAINER_STYLE)
                style=(ALERT_CONTAINER_POSITION)
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_oob_html().into_response()
    }
}

/// The empty container every page renders for alerts.
pub fn alert_container() -> Markup {
    html! {
        div
            id=(ALERT_CONTAINER_ID)
            class=(ALERT_CONTAINER_STYLE)
            style=(ALERT_CONTAINER_POSITION)
        {}
    }
}
