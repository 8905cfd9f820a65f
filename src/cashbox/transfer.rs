//! Moving money out of one cashbox into another, possibly across currencies.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserData,
    cashbox::{Cashbox, TransferRequest, get_cashbox, get_cashboxes, transfer},
    client::{ApiClient, RateClient},
    coefficient::{
        COEFFICIENT_FIELD_ID, Coefficient, CoefficientEvent, CoefficientMode, coefficient_field,
        coefficient_trigger_vals, parse_coefficient, update_coefficient,
        validate_submitted_coefficient,
    },
    endpoints,
    html::{
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base,
        field_error, submit_button,
    },
    navigation::NavBar,
    timezone::today,
    validation::{validate_amount, validate_date},
};

/// The state needed for the transfer page and endpoints.
#[derive(Debug, Clone)]
pub struct TransferState {
    pub api: ApiClient,
    pub rates: RateClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            rates: state.rates.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferForm {
    pub amount: String,
    pub cashbox_from: Uuid,
    pub cashbox_to: Option<Uuid>,
    #[serde(default)]
    pub coefficient_mode: CoefficientMode,
    /// Missing when the field is disabled for a same-currency transfer.
    pub coefficient: Option<String>,
    pub date: Date,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
struct TransferFormValues {
    amount: String,
    cashbox_to: Option<Uuid>,
    coefficient: Coefficient,
    date: Date,
    description: String,
}

impl TransferFormValues {
    fn new(today: Date) -> Self {
        Self {
            amount: String::new(),
            cashbox_to: None,
            coefficient: Coefficient::Unselected,
            date: today,
            description: String::new(),
        }
    }
}

#[derive(Debug, Default)]
struct TransferFormErrors {
    amount: Option<String>,
    cashbox_to: Option<String>,
    coefficient: Option<String>,
    date: Option<String>,
}

impl TransferFormErrors {
    fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.cashbox_to.is_none()
            && self.coefficient.is_none()
            && self.date.is_none()
    }
}

struct ValidTransfer {
    amount: f64,
    cashbox_to: Uuid,
    coefficient: f64,
}

/// Check the submitted form. The coefficient is checked against the currencies
/// of `from` and of the chosen target in `cashboxes`, not the submitted mode alone.
fn validate_transfer_form(
    form: TransferForm,
    from: &Cashbox,
    cashboxes: &[Cashbox],
    today: Date,
) -> (TransferFormValues, Result<ValidTransfer, TransferFormErrors>) {
    let raw_coefficient = parse_coefficient(form.coefficient.as_deref());
    let target_currency = form
        .cashbox_to
        .and_then(|id| cashboxes.iter().find(|cashbox| cashbox.id == id))
        .map(|cashbox| cashbox.currency.as_str());
    let (coefficient_state, coefficient) = validate_submitted_coefficient(
        Coefficient::from_form(form.coefficient_mode, raw_coefficient),
        raw_coefficient,
        target_currency.map(|target| (from.currency.as_str(), target)),
    );
    let values = TransferFormValues {
        amount: form.amount,
        cashbox_to: form.cashbox_to,
        coefficient: coefficient_state,
        date: form.date,
        description: form.description,
    };

    let amount = validate_amount(&values.amount);
    let cashbox_to = match values.cashbox_to {
        None => Err("Please select a cashbox to transfer to".to_owned()),
        Some(id) if id == form.cashbox_from => {
            Err("Cannot transfer to the same cashbox".to_owned())
        }
        Some(id) => Ok(id),
    };

    let errors = TransferFormErrors {
        amount: amount.as_ref().err().cloned(),
        cashbox_to: cashbox_to.as_ref().err().cloned(),
        coefficient: coefficient.as_ref().err().cloned(),
        date: validate_date(values.date, today).err(),
    };

    let result = match (amount, cashbox_to, coefficient) {
        (Ok(amount), Ok(cashbox_to), Ok(coefficient)) if errors.is_empty() => Ok(ValidTransfer {
            amount,
            cashbox_to,
            coefficient,
        }),
        _ => Err(errors),
    };

    (values, result)
}

fn find_cashbox(cashboxes: &[Cashbox], id: Uuid) -> Result<&Cashbox, Error> {
    cashboxes
        .iter()
        .find(|cashbox| cashbox.id == id)
        .ok_or(Error::NotFound)
}

fn transfer_form(
    from: &Cashbox,
    cashboxes: &[Cashbox],
    values: &TransferFormValues,
    errors: &TransferFormErrors,
    max_date: Date,
) -> Markup {
    let targets = cashboxes.iter().filter(|cashbox| cashbox.id != from.id);

    html! {
        form
            hx-post=(endpoints::TRANSFERS_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            input type="hidden" name="cashbox_from" value=(from.id);
            input type="hidden" name="source_currency" value=(from.currency);

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount (" (from.currency) ")" }

                input
                    type="number"
                    name="amount"
                    id="amount"
                    step="0.01"
                    min="0.01"
                    value=(values.amount)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.amount.as_deref()))
            }

            div
            {
                label for="cashbox_to" class=(FORM_LABEL_STYLE) { "To cashbox" }

                select
                    name="cashbox_to"
                    id="cashbox_to"
                    required
                    hx-post=(endpoints::TRANSFER_COEFFICIENT_API)
                    hx-trigger="change"
                    hx-vals=(coefficient_trigger_vals())
                    hx-include="closest form"
                    hx-target={ "#" (COEFFICIENT_FIELD_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.cashbox_to.is_none()] { "Select a cashbox" }

                    @for cashbox in targets {
                        option value=(cashbox.id) selected[values.cashbox_to == Some(cashbox.id)]
                        {
                            (cashbox.name) " (" (cashbox.currency) ")"
                        }
                    }
                }

                (field_error(errors.cashbox_to.as_deref()))
            }

            (coefficient_field(
                values.coefficient,
                endpoints::TRANSFER_COEFFICIENT_API,
                errors.coefficient.as_deref(),
            ))

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    value=(values.date)
                    max=(max_date)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.date.as_deref()))
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    value=(values.description)
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Transfer"))
        }
    }
}

fn transfer_view(from: &Cashbox, cashboxes: &[Cashbox], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();
    let form = transfer_form(
        from,
        cashboxes,
        &TransferFormValues::new(today),
        &TransferFormErrors::default(),
        today,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-1 text-xl font-bold" { "Transfer from " (from.name) }
            p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Balance: " (from.formatted_balance())
            }
            (form)
            a href=(endpoints::MANAGE_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Back to manage" }
        }
    };

    base("Transfer", &[], &content)
}

/// Render the page for moving money out of a cashbox.
pub async fn get_transfer_page(
    State(state): State<TransferState>,
    Extension(user): Extension<UserData>,
    Path(cashbox_id): Path<Uuid>,
) -> Result<Response, Error> {
    let cashboxes = get_cashboxes(&state.api, &user.token).await?;
    let from = find_cashbox(&cashboxes, cashbox_id)?;
    let today = today(&state.local_timezone)?;

    Ok(transfer_view(from, &cashboxes, today).into_response())
}

/// Handle transfer form submission.
///
/// On success the form is reset, keeping the source cashbox, and a success
/// alert is swapped in.
pub async fn create_transfer_endpoint(
    State(state): State<TransferState>,
    Extension(user): Extension<UserData>,
    Form(form): Form<TransferForm>,
) -> Response {
    match try_create_transfer(&state, &user, form).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn try_create_transfer(
    state: &TransferState,
    user: &UserData,
    form: TransferForm,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let cashbox_from = form.cashbox_from;
    let cashboxes = get_cashboxes(&state.api, &user.token).await?;
    let from = find_cashbox(&cashboxes, cashbox_from)?;
    let (values, result) = validate_transfer_form(form, from, &cashboxes, today);

    let valid = match result {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(transfer_form(from, &cashboxes, &values, &errors, today).into_response());
        }
    };

    let request = TransferRequest {
        amount: valid.amount,
        currency_coefficient: valid.coefficient,
        cashbox_from_id: cashbox_from,
        cashbox_to_id: valid.cashbox_to,
        date: values.date,
        description: values.description.trim(),
    };

    transfer(&state.api, &user.token, &request)
        .await
        .inspect_err(|error| tracing::error!("Could not create transfer: {error}"))?;
    tracing::info!("Transferred from {cashbox_from} to {}", valid.cashbox_to);

    let cashboxes = get_cashboxes(&state.api, &user.token).await?;
    let from = find_cashbox(&cashboxes, cashbox_from)?;

    Ok(html! {
        (transfer_form(from, &cashboxes, &TransferFormValues::new(today), &TransferFormErrors::default(), today))
        (Alert::SuccessSimple { message: "Transfer created".to_owned() }.into_oob_html())
    }
    .into_response())
}

/// The fields the coefficient endpoint reads from the transfer form.
#[derive(Debug, Deserialize)]
pub struct TransferCoefficientForm {
    pub source_currency: String,
    pub cashbox_to: Option<Uuid>,
    #[serde(default)]
    pub coefficient_mode: CoefficientMode,
    pub coefficient: Option<String>,
    pub event: CoefficientEvent,
}

/// Re-render the coefficient field after the target cashbox changed or the
/// user edited the value.
pub async fn transfer_coefficient_endpoint(
    State(state): State<TransferState>,
    Extension(user): Extension<UserData>,
    Form(form): Form<TransferCoefficientForm>,
) -> Response {
    let edited_value = parse_coefficient(form.coefficient.as_deref());
    let current = Coefficient::from_form(form.coefficient_mode, edited_value);

    let target_currency = match (form.event, form.cashbox_to) {
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
        &form.source_currency,
        target_currency.as_deref(),
    )
    .await;

    coefficient_field(
        coefficient,
        endpoints::TRANSFER_COEFFICIENT_API,
        error.as_deref(),
    )
    .into_response()
}
