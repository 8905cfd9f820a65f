//! The transaction form shared by the create and edit pages.

use axum::extract::FromRef;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    AppState,
    cashbox::Cashbox,
    category::Category,
    client::{ApiClient, RateClient},
    coefficient::{
        COEFFICIENT_FIELD_ID, Coefficient, CoefficientMode, coefficient_field,
        coefficient_trigger_vals, parse_coefficient, validate_submitted_coefficient,
    },
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, currency_options, field_error, submit_button,
    },
    transaction::{CategoryRef, Transaction, TransactionRequest},
    transaction_type::TransactionType,
    validation::{validate_amount, validate_currency, validate_date},
};

/// The state needed for the transaction pages and form endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub api: ApiClient,
    pub rates: RateClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            rates: state.rates.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: String,
    pub category: Option<Uuid>,
    pub cashbox: Option<Uuid>,
    pub currency: String,
    #[serde(default)]
    pub coefficient_mode: CoefficientMode,
    /// Missing when the field is disabled because both currencies match.
    pub coefficient: Option<String>,
    pub date: Date,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct TransactionFormValues {
    pub transaction_type: TransactionType,
    pub amount: String,
    pub category: Option<Uuid>,
    pub cashbox: Option<Uuid>,
    pub currency: String,
    pub coefficient: Coefficient,
    pub date: Date,
    pub description: String,
}

impl TransactionFormValues {
    /// The defaults of a new transaction of `transaction_type`.
    pub fn new(transaction_type: TransactionType, currency: &str, today: Date) -> Self {
        Self {
            transaction_type,
            amount: String::new(),
            category: None,
            cashbox: None,
            currency: currency.to_owned(),
            coefficient: Coefficient::Unselected,
            date: today,
            description: String::new(),
        }
    }

    pub fn from_transaction(transaction: &Transaction, coefficient: Coefficient) -> Self {
        Self {
            transaction_type: transaction.transaction_type,
            amount: format!("{:.2}", transaction.amount),
            category: Some(transaction.category.id),
            cashbox: transaction.cashbox_id,
            currency: transaction.currency.code.to_owned(),
            coefficient,
            date: transaction.transaction_date,
            description: transaction.description().to_owned(),
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct TransactionFormErrors {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub cashbox: Option<String>,
    pub currency: Option<String>,
    pub coefficient: Option<String>,
    pub date: Option<String>,
}

/// The checked values of a submitted form.
pub(super) struct ValidTransaction {
    amount: f64,
    category: Uuid,
    cashbox: Uuid,
    coefficient: f64,
}

impl ValidTransaction {
    pub fn request<'a>(&self, values: &'a TransactionFormValues) -> TransactionRequest<'a> {
        let description = values.description.trim();

        TransactionRequest {
            category: CategoryRef { id: self.category },
            transaction_type: values.transaction_type,
            amount: self.amount,
            description: (!description.is_empty()).then_some(description),
            currency: values.currency.trim(),
            transaction_date: values.date,
            cashbox_id: self.cashbox,
            currency_coefficient: self.coefficient,
        }
    }
}

fn required(value: Option<Uuid>, message: &str) -> Result<Uuid, String> {
    value.ok_or_else(|| message.to_owned())
}

/// Check the submitted form. The coefficient is checked against the entered
/// currency and the currency of the chosen cashbox in `cashboxes`.
pub(super) fn validate_transaction_form(
    form: TransactionForm,
    cashboxes: &[Cashbox],
    today: Date,
) -> (
    TransactionFormValues,
    Result<ValidTransaction, TransactionFormErrors>,
) {
    let raw_coefficient = parse_coefficient(form.coefficient.as_deref());
    let cashbox_currency = form
        .cashbox
        .and_then(|id| cashboxes.iter().find(|cashbox| cashbox.id == id))
        .map(|cashbox| cashbox.currency.as_str());
    let (coefficient_state, coefficient) = validate_submitted_coefficient(
        Coefficient::from_form(form.coefficient_mode, raw_coefficient),
        raw_coefficient,
        cashbox_currency.map(|target| (form.currency.as_str(), target)),
    );
    let values = TransactionFormValues {
        transaction_type: form.transaction_type,
        amount: form.amount,
        category: form.category,
        cashbox: form.cashbox,
        currency: form.currency,
        coefficient: coefficient_state,
        date: form.date,
        description: form.description,
    };

    let amount = validate_amount(&values.amount);
    let category = required(values.category, "Please select a category");
    let cashbox = required(values.cashbox, "Please select a cashbox");
    let currency = validate_currency(&values.currency);
    let date = validate_date(values.date, today);

    let result = match (amount, category, cashbox, coefficient, currency, date) {
        (Ok(amount), Ok(category), Ok(cashbox), Ok(coefficient), Ok(()), Ok(())) => {
            Ok(ValidTransaction {
                amount,
                category,
                cashbox,
                coefficient,
            })
        }
        (amount, category, cashbox, coefficient, currency, date) => Err(TransactionFormErrors {
            amount: amount.err(),
            category: category.err(),
            cashbox: cashbox.err(),
            currency: currency.err(),
            coefficient: coefficient.err(),
            date: date.err(),
        }),
    };

    (values, result)
}

pub(super) enum TransactionFormAction<'a> {
    Create,
    Update(&'a str),
}

pub(super) fn transaction_form(
    action: TransactionFormAction<'_>,
    values: &TransactionFormValues,
    errors: &TransactionFormErrors,
    categories: &[Category],
    cashboxes: &[Cashbox],
    max_date: Date,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        TransactionFormAction::Create => (
            Some(endpoints::TRANSACTIONS_API),
            None,
            "Create transaction",
        ),
        TransactionFormAction::Update(endpoint) => (None, Some(endpoint), "Save changes"),
    };
    let categories = categories
        .iter()
        .filter(|category| category.transaction_type == values.transaction_type);

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            input type="hidden" name="type" value=(values.transaction_type.as_str());

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Type: " (values.transaction_type.label())
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

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
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select
                    name="currency"
                    id="currency"
                    required
                    hx-post=(endpoints::TRANSACTION_COEFFICIENT_API)
                    hx-trigger="change"
                    hx-vals=(coefficient_trigger_vals())
                    hx-include="closest form"
                    hx-target={ "#" (COEFFICIENT_FIELD_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (currency_options(&values.currency))
                }

                (field_error(errors.currency.as_deref()))
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.category.is_none()] { "Select a category" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[values.category == Some(category.id)]
                        {
                            (category.display_name())
                        }
                    }
                }

                (field_error(errors.category.as_deref()))
            }

            div
            {
                label for="cashbox" class=(FORM_LABEL_STYLE) { "Cashbox" }

                select
                    name="cashbox"
                    id="cashbox"
                    required
                    hx-post=(endpoints::TRANSACTION_COEFFICIENT_API)
                    hx-trigger="change"
                    hx-vals=(coefficient_trigger_vals())
                    hx-include="closest form"
                    hx-target={ "#" (COEFFICIENT_FIELD_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[values.cashbox.is_none()] { "Select a cashbox" }

                    @for cashbox in cashboxes {
                        option value=(cashbox.id) selected[values.cashbox == Some(cashbox.id)]
                        {
                            (cashbox.name) " (" (cashbox.currency) ")"
                        }
                    }
                }

                (field_error(errors.cashbox.as_deref()))
            }

            (coefficient_field(
                values.coefficient,
                endpoints::TRANSACTION_COEFFICIENT_API,
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

            (submit_button(button_text))
        }
    }
}
