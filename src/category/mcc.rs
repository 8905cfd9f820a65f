//! Entry of merchant category codes (MCC) on the category forms.
//!
//! The codes live in the form as repeated hidden `mcc_codes` fields. Adding
//! or removing codes posts the whole form to [mcc_codes_endpoint], which
//! answers with the re-rendered widget.

use std::collections::BTreeSet;

use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    endpoints,
    html::{BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error},
};

pub const MCC_FIELD_ID: &str = "mcc-field";

const EMPTY_INPUT_MSG: &str = "Please enter at least one MCC code";

/// The result of reading a comma separated list of codes.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedMccCodes {
    /// The codes that were positive integers, in input order.
    pub valid: Vec<u32>,
    /// The tokens that were not, as typed.
    pub invalid: Vec<String>,
}

impl ParsedMccCodes {
    /// The message listing the rejected tokens, if any were rejected.
    pub fn error(&self) -> Option<String> {
        if self.invalid.is_empty() {
            return None;
        }

        Some(format!(
            "Invalid MCC codes: {}. Must be positive integers.",
            self.invalid.join(", ")
        ))
    }
}

fn parse_token(token: &str) -> Option<u32> {
    if !token.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    token.parse::<u32>().ok().filter(|code| *code > 0)
}

/// Split `input` on commas and sort the tokens into valid codes and invalid tokens.
///
/// # Errors
///
/// Returns an error if `input` holds no tokens at all.
pub fn parse_mcc_codes(input: &str) -> Result<ParsedMccCodes, String> {
    let tokens = input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>();

    if tokens.is_empty() {
        return Err(EMPTY_INPUT_MSG.to_owned());
    }

    let mut parsed = ParsedMccCodes::default();

    for token in tokens {
        match parse_token(token) {
            Some(code) => parsed.valid.push(code),
            None => parsed.invalid.push(token.to_owned()),
        }
    }

    Ok(parsed)
}

/// Add the valid codes in `input` to `codes`, skipping ones already present.
///
/// Returns the message to show when some or all of the input was rejected.
pub fn add_mcc_codes(codes: &mut BTreeSet<u32>, input: &str) -> Option<String> {
    match parse_mcc_codes(input) {
        Ok(parsed) => {
            codes.extend(parsed.valid.iter().copied());
            parsed.error()
        }
        Err(error) => Some(error),
    }
}

/// Render the MCC widget.
///
/// `pending_input` is put back into the text input, which is how a rejected
/// entry survives for the user to fix.
pub fn mcc_field(codes: &BTreeSet<u32>, pending_input: &str, error: Option<&str>) -> Markup {
    let target = format!("#{MCC_FIELD_ID}");

    html! {
        div id=(MCC_FIELD_ID)
        {
            label for="mcc_input" class=(FORM_LABEL_STYLE) { "MCC codes" }

            @for code in codes {
                input type="hidden" name="mcc_codes" value=(code);
            }

            div class="flex flex-wrap gap-2 mb-2"
            {
                @for code in codes {
                    span class=(BADGE_STYLE) data-mcc-code=(code)
                    {
                        (code)

                        button
                            type="button"
                            aria-label={ "Remove " (code) }
                            hx-post=(endpoints::CATEGORY_MCC_API)
                            hx-include="closest form"
                            hx-vals={ r#"{"remove": "# (code) "}" }
                            hx-target=(target)
                            hx-swap="outerHTML"
                            hx-target-error="#alert-container"
                        {
                            "×"
                        }
                    }
                }

                @if codes.is_empty() {
                    span class="text-sm text-gray-500 dark:text-gray-400" { "No MCC codes" }
                }
            }

            div class="flex gap-2"
            {
                input
                    type="text"
                    name="mcc_input"
                    id="mcc_input"
                    value=(pending_input)
                    placeholder="e.g. 5411, 5499"
                    onkeydown="if (event.key === 'Enter') { event.preventDefault(); this.nextElementSibling.click(); }"
                    class=(FORM_TEXT_INPUT_STYLE);

                button
                    type="button"
                    hx-post=(endpoints::CATEGORY_MCC_API)
                    hx-include="closest form"
                    hx-target=(target)
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Add"
                }
            }

            (field_error(error))
        }
    }
}

/// The MCC fields of a category form.
#[derive(Debug, Default, Deserialize)]
pub struct MccForm {
    #[serde(default)]
    pub mcc_codes: Vec<u32>,
    #[serde(default)]
    pub mcc_input: String,
    /// The code whose remove button was pressed.
    pub remove: Option<u32>,
}

/// Add the typed codes to, or remove one code from, the MCC widget.
///
/// The text input is cleared only if every typed token was accepted.
pub async fn mcc_codes_endpoint(Form(form): Form<MccForm>) -> Markup {
    let mut codes = form.mcc_codes.into_iter().collect::<BTreeSet<_>>();

    if let Some(code) = form.remove {
        codes.remove(&code);
        return mcc_field(&codes, &form.mcc_input, None);
    }

    match add_mcc_codes(&mut codes, &form.mcc_input) {
        None => mcc_field(&codes, "", None),
        Some(error) => mcc_field(&codes, &form.mcc_input, Some(&error)),
    }
}
