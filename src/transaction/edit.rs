use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    auth::UserData,
    cashbox::{Cashbox, get_cashboxes},
    category::{Category, get_categories},
    coefficient::{Coefficient, CoefficientEvent, update_coefficient},
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
    timezone::today,
    transaction::{
        Transaction, get_transaction,
        form::{
            TransactionForm, TransactionFormAction, TransactionFormErrors, TransactionFormValues,
            TransactionState, transaction_form, validate_transaction_form,
        },
        update_transaction,
    },
};

fn edit_transaction_view(
    transaction: &Transaction,
    values: &TransactionFormValues,
    categories: &[Category],
    cashboxes: &[Cashbox],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let update_url = format_endpoint(endpoints::TRANSACTION_API, transaction.id);
    let form = transaction_form(
        TransactionFormAction::Update(&update_url),
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
            h1 class="mb-4 text-xl font-bold" { "Edit " (transaction.transaction_type.as_str()) }
            (form)
            a href=(endpoints::TRANSACTIONS_VIEW) class={ "mt-4 " (LINK_STYLE) }
            {
                "Back to transactions"
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

/// Render the page for editing a transaction.
///
/// The coefficient starts out as if the transaction's cashbox had just been
/// selected, so a cross-currency transaction shows the current rate.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    Extension(user): Extension<UserData>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Response, Error> {
    let transaction =
        get_transaction(&state.api, &user.token, transaction_id, user.currency()).await?;
    let (categories, cashboxes) = tokio::try_join!(
        get_categories(&state.api, &user.token, transaction.transaction_type),
        get_cashboxes(&state.api, &user.token),
    )?;
    let today = today(&state.local_timezone)?;

    let target_currency = cashboxes
        .iter()
        .find(|cashbox| Some(cashbox.id) == transaction.cashbox_id)
        .map(|cashbox| cashbox.currency.as_str());
    let (coefficient, _) = update_coefficient(
        &state.rates,
        Coefficient::Unselected,
        CoefficientEvent::TargetChanged,
        None,
        transaction.currency.code,
        target_currency,
    )
    .await;
    let values = TransactionFormValues::from_transaction(&transaction, coefficient);

    Ok(edit_transaction_view(&transaction, &values, &categories, &cashboxes, today).into_response())
}

/// Handle transaction edit form submission, redirecting to the transactions page on success.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<UserData>,
    Path(transaction_id): Path<Uuid>,
    Form(form): Form<TransactionForm>,
) -> Response {
    match try_update_transaction(&state, &user, transaction_id, form).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

async fn try_update_transaction(
    state: &TransactionState,
    user: &UserData,
    transaction_id: Uuid,
    form: TransactionForm,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let transaction_type = form.transaction_type;
    let cashboxes = get_cashboxes(&state.api, &user.token).await?;
    let (values, result) = validate_transaction_form(form, &cashboxes, today);

    let valid = match result {
        Ok(valid) => valid,
        Err(errors) => {
            let categories = get_categories(&state.api, &user.token, transaction_type).await?;
            let update_url = format_endpoint(endpoints::TRANSACTION_API, transaction_id);

            return Ok(transaction_form(
                TransactionFormAction::Update(&update_url),
                &values,
                &errors,
                &categories,
                &cashboxes,
                today,
            )
            .into_response());
        }
    };

    update_transaction(&state.api, &user.token, transaction_id, &valid.request(&values)).await?;
    tracing::info!("Updated transaction {transaction_id}");

    Ok((
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json, Router,
        extract::{FromRef, Path, State},
        http::StatusCode,
        routing::get,
    };
    use axum_extra::extract::Form;
    use scraper::Selector;
    use serde_json::json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::{
        Error,
        coefficient::CoefficientMode,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, must_get_form,
            parse_html_document, parse_html_fragment, spawn_backend, test_state, test_user,
        },
        transaction::{
            core::tests::transaction_json,
            form::{TransactionForm, TransactionState},
        },
        transaction_type::TransactionType,
    };

    use super::{get_edit_transaction_page, update_transaction_endpoint};

    const TRANSACTION_ID: &str = "00000000-0000-0000-0000-000000000001";
    const GROCERIES_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";
    const WALLET_ID: &str = "11111111-1111-1111-1111-111111111111";

    fn backend_router() -> Router {
        Router::new()
            .route(
                "/transaction/{id}",
                get(|| async { Json(transaction_json(TRANSACTION_ID, "03-02-2025", 25.0, "USD")) })
                    .put(|| async { Json(json!({})) }),
            )
            .route(
                "/category/type/{type}",
                get(|| async {
                    Json(json!([
                        { "id": GROCERIES_ID, "name": "Groceries", "icon": "🛒", "type": "EXPENSE" }
                    ]))
                }),
            )
            .route(
                "/cashbox",
                get(|| async {
                    Json(json!([
                        { "id": WALLET_ID, "name": "Wallet", "currency": "UAH", "balance": 10.0 }
                    ]))
                }),
            )
            .route(
                "/currencies/usd.json",
                get(|| async { Json(json!({ "usd": { "uah": 41.487 } })) }),
            )
    }

    #[tokio::test]
    async fn page_is_filled_from_transaction() {
        let backend = spawn_backend(backend_router()).await;
        let state = TransactionState::from_ref(&test_state(&backend.url));

        let response = get_edit_transaction_page(
            State(state),
            Extension(test_user()),
            Path(TRANSACTION_ID.parse().unwrap()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION_API, TRANSACTION_ID),
            "hx-put",
        );
        let value_of = |selector: &str| {
            html.select(&Selector::parse(selector).unwrap())
                .next()
                .and_then(|element| element.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("input[name=amount]").as_deref(), Some("25.00"));
        assert_eq!(value_of("input[name=date]").as_deref(), Some("2025-02-03"));
        assert_eq!(value_of("input[name=coefficient]").as_deref(), Some("41.49"));
        assert_eq!(
            value_of("input[name=coefficient_mode]").as_deref(),
            Some("auto_filled")
        );
        assert_eq!(
            value_of("select[name=cashbox] option[selected]").as_deref(),
            Some(WALLET_ID)
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let backend = spawn_backend(Router::new()).await;
        let state = TransactionState::from_ref(&test_state(&backend.url));

        let result =
            get_edit_transaction_page(State(state), Extension(test_user()), Path(Uuid::new_v4()))
                .await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    fn form(date: time::Date) -> TransactionForm {
        TransactionForm {
            transaction_type: TransactionType::Expense,
            amount: "25".to_owned(),
            category: Some(GROCERIES_ID.parse().unwrap()),
            cashbox: Some(WALLET_ID.parse().unwrap()),
            currency: "USD".to_owned(),
            coefficient_mode: CoefficientMode::Overridden,
            coefficient: Some("40".to_owned()),
            date,
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn update_redirects_to_transactions() {
        let backend = spawn_backend(backend_router()).await;
        let state = TransactionState::from_ref(&test_state(&backend.url));
        let id: Uuid = TRANSACTION_ID.parse().unwrap();

        let response = update_transaction_endpoint(
            State(state),
            Extension(test_user()),
            Path(id),
            Form(form(OffsetDateTime::now_utc().date())),
        )
        .await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let request = &backend.requests_to("PUT", &format!("/transaction/{id}"))[0];
        let body = request.json();
        assert_eq!(body["currencyCoefficient"], json!(40.0));
        assert_eq!(body["description"], json!(null));
    }

    #[tokio::test]
    async fn matching_currencies_send_coefficient_one() {
        let backend = spawn_backend(backend_router()).await;
        let state = TransactionState::from_ref(&test_state(&backend.url));
        let id: Uuid = TRANSACTION_ID.parse().unwrap();
        let mut form = form(OffsetDateTime::now_utc().date());
        form.currency = "UAH".to_owned();

        let response =
            update_transaction_endpoint(State(state), Extension(test_user()), Path(id), Form(form))
                .await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let request = &backend.requests_to("PUT", &format!("/transaction/{id}"))[0];
        assert_eq!(request.json()["currencyCoefficient"], json!(1.0));
    }

    #[tokio::test]
    async fn invalid_form_is_rendered_again() {
        let backend = spawn_backend(backend_router()).await;
        let state = TransactionState::from_ref(&test_state(&backend.url));
        let mut form = form(OffsetDateTime::now_utc().date());
        form.category = None;

        let response = update_transaction_endpoint(
            State(state),
            Extension(test_user()),
            Path(TRANSACTION_ID.parse().unwrap()),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "Please select a category");
        assert!(
            backend
                .requests()
                .iter()
                .all(|request| request.method != "PUT")
        );
    }
}
