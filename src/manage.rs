//! The manage page: the user's cashboxes, their categories by type and the
//! default currency.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    auth::UserData,
    cashbox::{Cashbox, get_cashboxes},
    category::{Category, get_categories},
    client::ApiClient,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        currency_options, edit_delete_action_links, field_error,
    },
    navigation::NavBar,
    transaction_type::TransactionType,
};

/// The id of the form that changes the user's default currency.
pub const CURRENCY_FORM_ID: &str = "user-currency-form";

/// Display the cashboxes, the categories and the currency selector.
pub async fn get_manage_page(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
) -> Result<Response, Error> {
    let (cashboxes, income, expense) = tokio::try_join!(
        get_cashboxes(&api, &user.token),
        get_categories(&api, &user.token, TransactionType::Income),
        get_categories(&api, &user.token, TransactionType::Expense),
    )?;

    Ok(manage_view(&user, &cashboxes, &income, &expense).into_response())
}

fn manage_view(
    user: &UserData,
    cashboxes: &[Cashbox],
    income: &[Category],
    expense: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl space-y-8"
            {
                (cashboxes_section(cashboxes))
                (categories_section(TransactionType::Income, income))
                (categories_section(TransactionType::Expense, expense))
                (currency_section(user))
            }
        }
    };

    base("Manage", &[], &content)
}

fn section_header(title: &str, new_url: &str, new_label: &str) -> Markup {
    html! {
        div class="flex items-center justify-between mb-2"
        {
            h2 class="text-lg font-semibold" { (title) }
            a href=(new_url) class=(LINK_STYLE) { (new_label) }
        }
    }
}

fn cashboxes_section(cashboxes: &[Cashbox]) -> Markup {
    html! {
        section id="cashboxes"
        {
            (section_header("Cashboxes", endpoints::NEW_CASHBOX_VIEW, "New cashbox"))

            @if cashboxes.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No cashboxes yet. Create one to start recording transactions."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                    tbody
                    {
                        @for cashbox in cashboxes {
                            tr class=(TABLE_ROW_STYLE) data-cashbox-id=(cashbox.id)
                            {
                                td class=(TABLE_CELL_STYLE) { (cashbox.name) }
                                td class=(TABLE_CELL_STYLE) { (cashbox.currency) }
                                td class=(TABLE_CELL_STYLE) { (cashbox.formatted_balance()) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    div class="flex gap-4"
                                    {
                                        a
                                            href=(format_endpoint(endpoints::TRANSFER_VIEW, cashbox.id))
                                            class=(LINK_STYLE)
                                        {
                                            "Transfer"
                                        }
                                        (edit_delete_action_links(
                                            &format_endpoint(endpoints::EDIT_CASHBOX_VIEW, cashbox.id),
                                            &format_endpoint(endpoints::CASHBOX_API, cashbox.id),
                                            &format!("Delete the cashbox \"{}\"?", cashbox.name),
                                        ))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn categories_section(transaction_type: TransactionType, categories: &[Category]) -> Markup {
    let title = format!("{} categories", transaction_type.label());
    let new_url = format!(
        "{}?type={}",
        endpoints::NEW_CATEGORY_VIEW,
        transaction_type.as_str()
    );

    html! {
        section id={ (transaction_type.as_str()) "-categories" }
        {
            (section_header(&title, &new_url, "New category"))

            @if categories.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No categories yet." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "MCC codes" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }
                    tbody
                    {
                        @for category in categories {
                            tr class=(TABLE_ROW_STYLE) data-category-id=(category.id)
                            {
                                td class=(TABLE_CELL_STYLE) { (category.display_name()) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    div class="flex flex-wrap gap-1"
                                    {
                                        @for code in &category.mcc_codes {
                                            span class=(BADGE_STYLE) { (code) }
                                        }
                                    }
                                }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    (edit_delete_action_links(
                                        &format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id),
                                        &format_endpoint(endpoints::CATEGORY_API, category.id),
                                        &format!("Delete the category \"{}\"?", category.name),
                                    ))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn currency_section(user: &UserData) -> Markup {
    html! {
        section id="default-currency"
        {
            h2 class="mb-2 text-lg font-semibold" { "Default currency" }
            (currency_form(user.currency().code, None))
        }
    }
}

/// The form that changes the user's default currency, with `selected`
/// preselected.
pub(crate) fn currency_form(selected: &str, error: Option<&str>) -> Markup {
    html! {
        form
            id=(CURRENCY_FORM_ID)
            hx-post=(endpoints::USER_CURRENCY_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="flex flex-wrap items-end gap-4"
        {
            div class="grow"
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                select name="currency" id="currency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    (currency_options(selected))
                }
                (field_error(error))
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Save" }
        }
    }
}
