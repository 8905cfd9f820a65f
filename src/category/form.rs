//! The category form shared by the create and edit pages.

use std::collections::BTreeSet;

use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    category::{
        Category, CategoryRequest,
        mcc::{add_mcc_codes, mcc_field},
    },
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, field_error, input_field, submit_button},
    transaction_type::TransactionType,
    validation::{validate_icon, validate_name},
};

/// The raw data entered by the user in the category form.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub mcc_codes: Vec<u32>,
    /// Codes typed but not added with the "Add" button yet.
    #[serde(default)]
    pub mcc_input: String,
}

/// What the form shows in its fields.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryFormValues {
    pub name: String,
    pub icon: String,
    pub transaction_type: TransactionType,
    pub mcc_codes: BTreeSet<u32>,
    pub mcc_input: String,
}

impl CategoryFormValues {
    /// The empty form for a new category of `transaction_type`.
    pub fn new(transaction_type: TransactionType) -> Self {
        Self {
            name: String::new(),
            icon: String::new(),
            transaction_type,
            mcc_codes: BTreeSet::new(),
            mcc_input: String::new(),
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            icon: category.icon.clone(),
            transaction_type: category.transaction_type,
            mcc_codes: category.mcc_codes.clone(),
            mcc_input: String::new(),
        }
    }

    pub fn request(&self) -> CategoryRequest<'_> {
        CategoryRequest {
            name: self.name.trim(),
            icon: self.icon.trim(),
            transaction_type: self.transaction_type,
            mcc_codes: &self.mcc_codes,
        }
    }
}

#[derive(Debug, Default)]
pub(super) struct CategoryFormErrors {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub mcc: Option<String>,
}

impl CategoryFormErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.mcc.is_none()
    }
}

/// Check the submitted form, adding any codes still sitting in the MCC input.
pub(super) fn validate_category_form(form: CategoryForm) -> (CategoryFormValues, CategoryFormErrors) {
    let mut values = CategoryFormValues {
        name: form.name,
        icon: form.icon,
        transaction_type: form.transaction_type,
        mcc_codes: form.mcc_codes.into_iter().collect(),
        mcc_input: form.mcc_input,
    };

    let mcc = if values.mcc_input.trim().is_empty() {
        None
    } else {
        add_mcc_codes(&mut values.mcc_codes, &values.mcc_input)
    };

    if mcc.is_none() {
        values.mcc_input.clear();
    }

    let errors = CategoryFormErrors {
        name: validate_name(&values.name).err(),
        icon: validate_icon(&values.icon).err(),
        mcc,
    };

    (values, errors)
}

/// Where the form is sent.
pub(super) enum CategoryFormAction<'a> {
    Create(&'a str),
    Update(&'a str),
}

pub(super) fn category_form(
    action: CategoryFormAction<'_>,
    values: &CategoryFormValues,
    errors: &CategoryFormErrors,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        CategoryFormAction::Create(endpoint) => (Some(endpoint), None, "Create category"),
        CategoryFormAction::Update(endpoint) => (None, Some(endpoint), "Save changes"),
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
            input type="hidden" name="type" value=(values.transaction_type.as_str());

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Type: " (values.transaction_type.label())
            }

            (input_field("Name", "text", "name", &values.name, errors.name.as_deref()))

            div
            {
                label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }

                input
                    type="text"
                    name="icon"
                    id="icon"
                    value=(values.icon)
                    placeholder="e.g. 🛒"
                    class=(FORM_TEXT_INPUT_STYLE);

                (field_error(errors.icon.as_deref()))
            }

            (mcc_field(&values.mcc_codes, &values.mcc_input, errors.mcc.as_deref()))

            (submit_button(button_text))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::transaction_type::TransactionType;

    use super::{CategoryForm, validate_category_form};

    fn form(name: &str, mcc_input: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            icon: String::new(),
            transaction_type: TransactionType::Expense,
            mcc_codes: vec![5411],
            mcc_input: mcc_input.to_owned(),
        }
    }

    #[test]
    fn pending_codes_are_added_on_submit() {
        let (values, errors) = validate_category_form(form("Groceries", "5499"));

        assert!(errors.is_empty());
        assert_eq!(values.mcc_codes, BTreeSet::from([5411, 5499]));
        assert_eq!(values.mcc_input, "");
    }

    #[test]
    fn short_name_and_bad_codes_are_reported() {
        let (values, errors) = validate_category_form(form("ab", "x1"));

        assert_eq!(
            errors.name.as_deref(),
            Some("Name must be between 3 and 20 characters")
        );
        assert_eq!(
            errors.mcc.as_deref(),
            Some("Invalid MCC codes: x1. Must be positive integers.")
        );
        assert_eq!(values.mcc_input, "x1");
    }
}
