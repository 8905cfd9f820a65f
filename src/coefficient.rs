//! The currency coefficient used when a transaction or transfer crosses currencies.
//!
//! The field's state travels with the form as a hidden `coefficient_mode`
//! next to the numeric `coefficient`, and htmx re-renders the field whenever
//! the target currency changes or the user edits the value.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    client::RateClient,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error},
    validation::validate_coefficient,
};

/// The id of the element the coefficient endpoints replace.
pub const COEFFICIENT_FIELD_ID: &str = "coefficient-field";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coefficient {
    /// No target chosen yet.
    Unselected,
    /// Source and target share a currency, the value is exactly 1 and locked.
    SameCurrency,
    /// Filled from the rate table, rounded to cents.
    AutoFilled(f64),
    /// Entered by the user. Only selecting a same-currency target replaces it.
    Overridden(f64),
}

/// The tag of a [Coefficient] as it appears in the hidden form field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientMode {
    #[default]
    Unselected,
    SameCurrency,
    AutoFilled,
    Overridden,
}

impl CoefficientMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CoefficientMode::Unselected => "unselected",
            CoefficientMode::SameCurrency => "same_currency",
            CoefficientMode::AutoFilled => "auto_filled",
            CoefficientMode::Overridden => "overridden",
        }
    }
}

/// What made the browser ask for a new coefficient field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientEvent {
    /// The target cashbox or the source currency changed.
    TargetChanged,
    /// The user typed a new value.
    Edited,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn same_currency(source: &str, target: &str) -> bool {
    source.trim().eq_ignore_ascii_case(target.trim())
}

impl Coefficient {
    /// Rebuild the state from the submitted form fields.
    ///
    /// A same-currency field is disabled in the browser and therefore never
    /// submitted, so `value` is ignored for it.
    pub fn from_form(mode: CoefficientMode, value: Option<f64>) -> Self {
        let value = value.unwrap_or(1.0);

        match mode {
            CoefficientMode::Unselected => Coefficient::Unselected,
            CoefficientMode::SameCurrency => Coefficient::SameCurrency,
            CoefficientMode::AutoFilled => Coefficient::AutoFilled(value),
            CoefficientMode::Overridden => Coefficient::Overridden(value),
        }
    }

    pub fn mode(&self) -> CoefficientMode {
        match self {
            Coefficient::Unselected => CoefficientMode::Unselected,
            Coefficient::SameCurrency => CoefficientMode::SameCurrency,
            Coefficient::AutoFilled(_) => CoefficientMode::AutoFilled,
            Coefficient::Overridden(_) => CoefficientMode::Overridden,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Coefficient::Unselected | Coefficient::SameCurrency => 1.0,
            Coefficient::AutoFilled(value) | Coefficient::Overridden(value) => *value,
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, Coefficient::SameCurrency)
    }

    /// Whether choosing `target` should consult the rate table.
    pub fn needs_rate(&self, source: &str, target: &str) -> bool {
        !same_currency(source, target) && !matches!(self, Coefficient::Overridden(_))
    }

    /// The state after a target currency was chosen.
    ///
    /// `rate` is the looked-up rate, `None` when the lookup failed or was not needed.
    pub fn select_target(self, source: &str, target: &str, rate: Option<f64>) -> Self {
        if same_currency(source, target) {
            return Coefficient::SameCurrency;
        }

        match (self, rate) {
            (Coefficient::Overridden(value), _) => Coefficient::Overridden(value),
            (_, Some(rate)) => Coefficient::AutoFilled(round2(rate)),
            (prior, None) => Coefficient::AutoFilled(prior.value()),
        }
    }

    /// The state after the target was unselected.
    pub fn clear_target(self) -> Self {
        match self {
            Coefficient::Overridden(value) => Coefficient::Overridden(value),
            _ => Coefficient::Unselected,
        }
    }

    /// The state after the user typed `value`.
    pub fn edit(self, value: f64) -> Self {
        match self {
            Coefficient::SameCurrency => Coefficient::SameCurrency,
            _ => Coefficient::Overridden(value),
        }
    }
}

/// Parse the raw `coefficient` field, which is empty when the input was cleared.
pub fn parse_coefficient(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

const INVALID_COEFFICIENT: &str = "Coefficient must be a positive number with at most 2 decimals";

/// Check a submitted coefficient against the currencies it converts between.
///
/// `currencies` is the source and target currency, `None` while the target is
/// unknown. Matching currencies always give a locked 1. Differing currencies
/// need a rate, so a locked or unselected field from a stale form is rejected
/// and handed back editable.
pub fn validate_submitted_coefficient(
    coefficient: Coefficient,
    raw_value: Option<f64>,
    currencies: Option<(&str, &str)>,
) -> (Coefficient, Result<f64, String>) {
    match (coefficient, currencies) {
        (_, Some((source, target))) if same_currency(source, target) => {
            (Coefficient::SameCurrency, Ok(1.0))
        }
        (Coefficient::Unselected | Coefficient::SameCurrency, Some((source, target))) => (
            Coefficient::Unselected,
            Err(format!(
                "Enter the coefficient for converting {} to {}",
                source.trim().to_uppercase(),
                target.trim().to_uppercase()
            )),
        ),
        (coefficient, _) if coefficient.is_editable() && raw_value.is_none() => {
            (coefficient, Err(INVALID_COEFFICIENT.to_owned()))
        }
        (coefficient, _) => (coefficient, validate_coefficient(coefficient.value())),
    }
}

/// Apply `event` to `current` and return the new state with an inline error, if any.
///
/// `target` is `None` when the target select was reset to its placeholder.
pub async fn update_coefficient(
    rates: &RateClient,
    current: Coefficient,
    event: CoefficientEvent,
    edited_value: Option<f64>,
    source: &str,
    target: Option<&str>,
) -> (Coefficient, Option<String>) {
    match event {
        CoefficientEvent::Edited => match edited_value.map(validate_coefficient) {
            Some(Ok(value)) => (current.edit(value), None),
            Some(Err(error)) => (current, Some(error)),
            None => (current, Some(INVALID_COEFFICIENT.to_owned())),
        },
        CoefficientEvent::TargetChanged => match target {
            None => (current.clear_target(), None),
            Some(target) => {
                let rate = if current.needs_rate(source, target) {
                    rates.fetch_rate(source, target).await
                } else {
                    None
                };

                (current.select_target(source, target, rate), None)
            }
        },
    }
}

/// The attributes a target or source select needs to refresh the coefficient field.
pub fn coefficient_trigger_vals() -> &'static str {
    r#"{"event": "target_changed"}"#
}

/// Render the coefficient input and its hidden mode field.
///
/// `endpoint` is the htmx route that re-renders this field.
pub fn coefficient_field(coefficient: Coefficient, endpoint: &str, error: Option<&str>) -> Markup {
    let is_editable = coefficient.is_editable();
    let value = format!("{:.2}", coefficient.value());

    html! {
        div id=(COEFFICIENT_FIELD_ID)
        {
            input type="hidden" name="coefficient_mode" value=(coefficient.mode().as_str());

            label for="coefficient" class=(FORM_LABEL_STYLE) { "Currency coefficient" }

            input
                name="coefficient"
                id="coefficient"
                type="number"
                step="0.01"
                min="0.01"
                value=(value)
                required
                disabled[!is_editable]
                hx-post=(endpoint)
                hx-trigger="change"
                hx-vals=r#"{"event": "edited"}"#
                hx-include="closest form"
                hx-target={ "#" (COEFFICIENT_FIELD_ID) }
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class=(FORM_TEXT_INPUT_STYLE);

            @if !is_editable {
                p class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                {
                    "Both sides use the same currency."
                }
            }

            (field_error(error))
        }
    }
}
