//! The page and endpoint for recording a new transaction.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    alert::Alert,
    auth::UserData,
    cashbox::{Cashbox, get_cashboxes},
    category::{Category, get_categories},
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
    timezone::today,
    transaction::{
        create_transaction,
        form::{
            TransactionForm, TransactionFormAction, TransactionFormErrors, TransactionFormValues,
            TransactionState, transaction_form, validate_transaction_form,
        },
    },
    transaction_type::TransactionType,
};

#[derive(Debug, Deserialize)]
pub struct NewTransactionQuery {
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
}

fn new_transaction_view(
    transaction_type: TransactionType,
    values: &TransactionFormValues,
    categories: &[Category],
    cashboxes: &[Cashbox],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let form = transaction_form(
        TransactionFormAction::Create,
        values,
        &TransactionFormErrors::default(),
        categories,
        cashboxes,
        today,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "New " (transaction_type.as_str()) }
            (form)
            a href=(endpoints::TRANSACTIONS_VIEW) class={ "mt-4 " (LINK_STYLE) }
            {
                "Back to transactions"
            }
        }
    };

    base("Create Transaction", &[], &content)
}

/// Render the page for recording an income or an expense.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
    Extension(user): Extension<UserData>,
    Query(query): Query<NewTransactionQuery>,
) -> Result<Response, Error> {
    let (categories, cashboxes) = tokio::try_join!(
        get_categories(&state.api, &user.token, query.transaction_type),
        get_cashboxes(&state.api, &user.token),
    )?;
    let today = today(&state.local_timezone)?;
    let values = TransactionFormValues::new(query.transaction_type, user.currency().code, today);

    Ok(new_transaction_view(
        query.transaction_type,
        &values,
        &categories,
        &cashboxes,
        today,
    )
    .into_response())
}

/// Handle transaction form submission.
///
/// On success the form is reset to the defaults for the same transaction type
/// and a success alert is swapped in.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<UserData>,
    Form(form): Form<TransactionForm>,
) -> Response {
    match try_create_transaction(&state, &user, form).await {
        Ok(response) => response,
        Err(error) => error.into_alert_response(),
    }
}

async fn try_create_transaction(
    state: &TransactionState,
    user: &UserData,
    form: TransactionForm,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let transaction_type = form.transaction_type;
    let (categories, cashboxes) = tokio::try_join!(
        get_categories(&state.api, &user.token, transaction_type),
        get_cashboxes(&state.api, &user.token),
    )?;
    let (values, result) = validate_transaction_form(form, &cashboxes, today);

    let valid = match result {
        Ok(valid) => valid,
        Err(errors) => {
            return Ok(transaction_form(
                TransactionFormAction::Create,
                &values,
                &errors,
                &categories,
                &cashboxes,
                today,
            )
            .into_response());
        }
    };

    create_transaction(&state.api, &user.token, &valid.request(&values))
        .await
        .inspect_err(|error| tracing::error!("Could not create transaction: {error}"))?;
    tracing::info!("Created {transaction_type} transaction");

    let defaults = TransactionFormValues::new(transaction_type, user.currency().code, today);

    Ok(html! {
        (transaction_form(
            TransactionFormAction::Create,
            &defaults,
            &TransactionFormErrors::default(),
            &categories,
            &cashboxes,
            today,
        ))
        (Alert::SuccessSimple {
            message: format!("{} created", transaction_type.label()),
        }
        .into_oob_html())
    }
    .into_response())
}
