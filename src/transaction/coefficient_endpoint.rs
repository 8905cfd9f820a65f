use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::UserData,
    cashbox::get_cashbox,
    coefficient::{
        Coefficient, CoefficientEvent, CoefficientMode, coefficient_field, parse_coefficient,
        update_coefficient,
    },
    endpoints,
    transaction::form::TransactionState,
};

/// The fields the coefficient endpoint reads from the transaction form.
#[derive(Debug, Deserialize)]
pub struct TransactionCoefficientForm {
    /// The currency the amount is entered in.
    pub currency: String,
    pub cashbox: Option<Uuid>,
    #[serde(default)]
    pub coefficient_mode: CoefficientMode,
    pub coefficient: Option<String>,
    pub event: CoefficientEvent,
}

/// Re-render the coefficient field after the currency or cashbox changed, or
/// the user edited the value.
///
/// The coefficient converts the entered currency into the cashbox's currency.
pub async fn transaction_coefficient_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<UserData>,
    Form(form): Form<TransactionCoefficientForm>,
) -> Response {
    let edited_value = parse_coefficient(form.coefficient.as_deref());
    let current = Coefficient::from_form(form.coefficient_mode, edited_value);

    let target_currency = match (form.event, form.cashbox) {
        (CoefficientEvent::TargetChanged, Some(id)) => {
            match get_cashbox(&state.api, &user.token, id).await {
                Ok(cashbox) => Some(cashbox.currency),
                Err(error) => return error.into_alert_response(),
            }
        }
        _ => None,
    };

    let (coefficient, error) = update_coefficient(
        &state.rates,
        current,
        form.event,
        edited_value,
        &form.currency,
        target_currency.as_deref(),
    )
    .await;

    coefficient_field(
        coefficient,
        endpoints::TRANSACTION_COEFFICIENT_API,
        error.as_deref(),
    )
    .into_response()
}
