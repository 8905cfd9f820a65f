//! The endpoint URIs served to the browser.
//!
//! For endpoints that take a parameter, e.g., '/cashboxes/{cashbox_id}/edit', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for signed in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for managing cashboxes, categories and the default currency.
pub const MANAGE_VIEW: &str = "/manage";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The route for downloading the filtered transactions as CSV.
pub const TRANSACTIONS_EXPORT: &str = "/transactions/export";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for creating a new cashbox.
pub const NEW_CASHBOX_VIEW: &str = "/cashboxes/new";
/// The page for editing an existing cashbox.
pub const EDIT_CASHBOX_VIEW: &str = "/cashboxes/{cashbox_id}/edit";
/// The page for moving money out of a cashbox.
pub const TRANSFER_VIEW: &str = "/cashboxes/{cashbox_id}/transfer";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page listing the user's Monobank cards.
pub const MONOBANK_VIEW: &str = "/monobank";
/// The route for getting the sign-in page.
pub const SIGN_IN_VIEW: &str = "/sign_in";
/// The route for getting the sign-up page.
pub const SIGN_UP_VIEW: &str = "/sign_up";
/// The page for requesting a password reset e-mail.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page linked from the password reset e-mail.
pub const RESET_PASSWORD_VIEW: &str = "/reset_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for signing in.
pub const SIGN_IN_API: &str = "/api/sign_in";
/// The route for registering a new user.
pub const SIGN_UP_API: &str = "/api/sign_up";
/// The route for requesting a password reset e-mail.
pub const FORGOT_PASSWORD_API: &str = "/api/forgot_password";
/// The route for setting a new password.
pub const RESET_PASSWORD_API: &str = "/api/reset_password";
/// The route for the client to sign out the current user.
pub const SIGN_OUT: &str = "/api/sign_out";
/// The route to create a cashbox.
pub const CASHBOXES_API: &str = "/api/cashboxes";
/// The route to update or delete a cashbox.
pub const CASHBOX_API: &str = "/api/cashboxes/{cashbox_id}";
/// The route to move money between cashboxes.
pub const TRANSFERS_API: &str = "/api/transfers";
/// The route that re-renders the coefficient field of the transfer form.
pub const TRANSFER_COEFFICIENT_API: &str = "/api/transfers/coefficient";
/// The route to create a category.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY_API: &str = "/api/categories/{category_id}";
/// The route that re-renders the MCC code widget of the category forms.
pub const CATEGORY_MCC_API: &str = "/api/categories/mcc";
/// The route to create a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to update or delete a transaction.
pub const TRANSACTION_API: &str = "/api/transactions/{transaction_id}";
/// The route that re-renders the coefficient field of the transaction forms.
pub const TRANSACTION_COEFFICIENT_API: &str = "/api/transactions/coefficient";
/// The route to change the user's default currency.
pub const USER_CURRENCY_API: &str = "/api/user/currency";
/// The route to start connecting a Monobank account.
pub const MONOBANK_CONNECT_API: &str = "/api/monobank/connect";
/// The route to start importing a card's statements.
pub const MONOBANK_MONITOR_API: &str = "/api/monobank/cards/{card_id}/monitor";
/// The route to stop importing a card's statements.
pub const MONOBANK_UNMONITOR_API: &str = "/api/monobank/cards/{card_id}/unmonitor";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace. For example, in the endpoint path '/cashboxes/{cashbox_id}',
/// '{cashbox_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
