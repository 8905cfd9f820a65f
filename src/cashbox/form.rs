//! The cashbox form shared by the create and edit pages.

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    cashbox::{Cashbox, CashboxRequest},
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, currency_options, field_error, input_field,
        submit_button,
    },
    validation::{validate_balance, validate_currency, validate_name},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CashboxForm {
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct CashboxFormValues {
    pub name: String,
    pub currency: String,
    /// Kept as typed so a rejected value is shown back unchanged.
    pub balance: String,
}

impl CashboxFormValues {
    /// The empty form, preset to the user's default currency.
    pub fn new(currency: &str) -> Self {
        Self {
            name: String::new(),
            currency: currency.to_owned(),
            balance: "0".to_owned(),
        }
    }

    pub fn from_cashbox(cashbox: &Cashbox) -> Self {
        Self {
            name: cashbox.name.clone(),
            currency: cashbox.currency.clone(),
            balance: format!("{:.2}", cashbox.balance),
        }
    }

    pub fn request(&self, balance: f64) -> CashboxRequest<'_> {
        CashboxRequest {
            name: self.name.trim(),
            currency: self.currency.trim(),
            balance,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct CashboxFormErrors {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub balance: Option<String>,
}

/// Check the submitted form.
///
/// Returns the values to render along with either the parsed balance or the
/// field errors.
pub(super) fn validate_cashbox_form(
    form: CashboxForm,
) -> (CashboxFormValues, Result<f64, CashboxFormErrors>) {
    let values = CashboxFormValues {
        name: form.name,
        currency: form.currency,
        balance: form.balance,
    };

    let name = validate_name(&values.name).err();
    let currency = validate_currency(&values.currency).err();
    let balance = validate_balance(&values.balance);

    let result = match (name, currency, balance) {
        (None, None, Ok(balance)) => Ok(balance),
        (name, currency, balance) => Err(CashboxFormErrors {
            name,
            currency,
            balance: balance.err(),
        }),
    };

    (values, result)
}

pub(super) enum CashboxFormAction<'a> {
    Create(&'a str),
    Update(&'a str),
}

pub(super) fn cashbox_form(
    action: CashboxFormAction<'_>,
    values: &CashboxFormValues,
    errors: &CashboxFormErrors,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        CashboxFormAction::Create(endpoint) => (Some(endpoint), None, "Create cashbox"),
        CashboxFormAction::Update(endpoint) => (None, Some(endpoint), "Save changes"),
    };

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
            (input_field("Name", "text", "name", &values.name, errors.name.as_deref()))

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                select name="currency" id="currency" required class=(FORM_TEXT_INPUT_STYLE)
                {
                    (currency_options(&values.currency))
                }

                (field_error(errors.currency.as_deref()))
            }

            div
            {
                label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                input
                    type="number"
                    name="balance"
                    id="balance"
                    step="0.01"
                    min="0"
                    value=(values.balance)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.balance.as_deref()))
            }

            (submit_button(button_text))
        }
    }
}
