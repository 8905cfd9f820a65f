//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert, client::ApiError, internal_server_error::InternalServerError,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The backend rejected the session token.
    ///
    /// Handlers never redirect on this error themselves. The response carries
    /// a [SessionExpired] marker and the auth middleware clears the session
    /// cookie and sends the client to the sign-in page.
    #[error("the session has expired")]
    Unauthorized,

    /// A call to the backend failed.
    #[error("backend request failed: {0}")]
    Api(ApiError),

    /// The backend sent a currency code that is not in the currency table.
    #[error("unsupported currency \"{0}\"")]
    UnsupportedCurrency(String),

    /// A date string from the backend or a query string could not be parsed.
    #[error("invalid date \"{0}\"")]
    InvalidDate(String),

    /// The start of a date range is after its end, or the range is too long.
    #[error("invalid date range from {from} to {to}")]
    InvalidDateRange {
        /// The first day of the requested range.
        from: Date,
        /// The last day of the requested range.
        to: Date,
    },

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The transactions could not be written as CSV.
    #[error("could not export CSV: {0}")]
    CsvExport(String),
}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Error::Unauthorized,
            ApiError::Backend { status: 404, .. } => Error::NotFound,
            error => Error::Api(error),
        }
    }
}

/// Response extension telling the auth middleware that the backend rejected
/// the session token while handling the request.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

fn session_expired_response() -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.extensions_mut().insert(SessionExpired);
    response
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized => session_expired_response(),
            Error::NotFound => NotFoundError.into_response(),
            Error::Api(error) => {
                let status = error.status_code();
                let mut response = InternalServerError {
                    description: "Could not load this page",
                    fix: error.user_message(),
                }
                .into_response();
                *response.status_mut() = status;
                response
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Unauthorized => return session_expired_response(),
            Error::Api(error) => (
                error.status_code(),
                Alert::Error {
                    message: error.user_message().to_owned(),
                    details: match &error {
                        ApiError::Backend { details, .. } => details.join("\n"),
                        _ => String::new(),
                    },
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found. \
                        Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidDateRange { from, to } => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date range".to_owned(),
                    details: format!("{from} to {to} is not a valid date range."),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::ErrorSimple {
                        message: crate::client::GENERIC_ERROR_MESSAGE.to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        client::ApiError,
        error::SessionExpired,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[test]
    fn backend_401_becomes_unauthorized() {
        assert_eq!(Error::from(ApiError::Unauthorized), Error::Unauthorized);
    }

    #[test]
    fn backend_404_becomes_not_found() {
        let error = ApiError::Backend {
            status: 404,
            message: None,
            details: vec![],
        };

        assert_eq!(Error::from(error), Error::NotFound);
    }

    #[test]
    fn unauthorized_marks_response_as_session_expired() {
        for response in [
            Error::Unauthorized.into_response(),
            Error::Unauthorized.into_alert_response(),
        ] {
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(response.extensions().get::<SessionExpired>().is_some());
        }
    }

    #[tokio::test]
    async fn alert_shows_backend_message() {
        let error = Error::Api(ApiError::Backend {
            status: 409,
            message: Some("Category already exists".to_owned()),
            details: vec![],
        });

        let response = error.into_alert_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Category already exists"), "got {text}");
    }

    #[tokio::test]
    async fn alert_falls_back_to_generic_message() {
        let response = Error::Api(ApiError::Network("refused".to_owned())).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("Something went wrong. Please try again later."),
            "got {text}"
        );
    }
}
