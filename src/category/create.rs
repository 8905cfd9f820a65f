//! Category creation page and endpoint.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    alert::Alert,
    auth::UserData,
    category::{
        create_category,
        form::{
            CategoryForm, CategoryFormAction, CategoryFormErrors, CategoryFormValues,
            category_form, validate_category_form,
        },
    },
    client::ApiClient,
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
    transaction_type::TransactionType,
};

#[derive(Debug, Deserialize)]
pub struct NewCategoryQuery {
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
}

/// Render the category creation page.
pub async fn get_new_category_page(Query(query): Query<NewCategoryQuery>) -> Response {
    new_category_view(query.transaction_type).into_response()
}

/// Handle category creation form submission.
///
/// On success the form is reset to its defaults, keeping the type, and a
/// success alert is swapped in next to it.
pub async fn create_category_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let (values, errors) = validate_category_form(form);
    let action = CategoryFormAction::Create(endpoints::CATEGORIES_API);

    if !errors.is_empty() {
        return category_form(action, &values, &errors).into_response();
    }

    match create_category(&api, &user.token, &values.request()).await {
        Ok(category) => {
            tracing::info!("Created category {}", category.id);
            let defaults = CategoryFormValues::new(values.transaction_type);
            let alert = Alert::SuccessSimple {
                message: format!("Category \"{}\" created", category.name),
            };

            html! {
                (category_form(action, &defaults, &CategoryFormErrors::default()))
                (alert.into_oob_html())
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create category: {error}");
            error.into_alert_response()
        }
    }
}

fn new_category_view(transaction_type: TransactionType) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();
    let form = category_form(
        CategoryFormAction::Create(endpoints::CATEGORIES_API),
        &CategoryFormValues::new(transaction_type),
        &CategoryFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "New " (transaction_type.as_str()) " category" }
            (form)
            a href=(endpoints::MANAGE_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Back to manage" }
        }
    };

    base("Create Category", &[], &content)
}

#[cfg(test)]
mod create_category_tests {
    use axum::{
        Extension, Json, Router,
        extract::{FromRef, Query, State},
        http::StatusCode,
        routing::post,
    };
    use axum_extra::extract::Form;
    use serde_json::json;

    use crate::{
        category::{
            create::{NewCategoryQuery, create_category_endpoint, get_new_category_page},
            form::CategoryForm,
        },
        client::ApiClient,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_input_with_value,
            assert_hx_endpoint, assert_valid_html, element_text, must_get_form,
            parse_html_document, parse_html_fragment, spawn_backend, test_state, test_user,
        },
        transaction_type::TransactionType,
    };

    fn form(name: &str) -> Form<CategoryForm> {
        Form(CategoryForm {
            name: name.to_owned(),
            icon: "🛒".to_owned(),
            transaction_type: TransactionType::Income,
            mcc_codes: vec![5411],
            mcc_input: String::new(),
        })
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_category_page(Query(NewCategoryQuery {
            transaction_type: TransactionType::Income,
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CATEGORIES_API, "hx-post");
        assert_form_input(&form, "name", "text");
        let type_input = html
            .select(&scraper::Selector::parse("input[name=type]").unwrap())
            .next()
            .unwrap();
        assert_eq!(type_input.value().attr("value"), Some("income"));
    }

    #[tokio::test]
    async fn create_resets_form_and_shows_alert() {
        let backend = spawn_backend(Router::new().route(
            "/category",
            post(|Json(body): Json<serde_json::Value>| async move {
                Json(json!({
                    "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                    "name": body["name"],
                    "icon": body["icon"],
                    "type": body["type"],
                    "mccCodes": body["mccCodes"],
                }))
            }),
        ))
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response =
            create_category_endpoint(State(api), Extension(test_user()), form("Salary")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "");
        assert!(element_text(&html, "input[name=mcc_codes]").is_empty());
        let alert = element_text(&html, "#alert-container p");
        assert_eq!(alert, ["Category \"Salary\" created"]);

        let requests = backend.requests_to("POST", "/category");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-token"));
        assert_eq!(
            requests[0].json(),
            json!({ "name": "Salary", "icon": "🛒", "type": "INCOME", "mccCodes": [5411] })
        );
    }

    #[tokio::test]
    async fn invalid_name_is_not_sent() {
        let backend = spawn_backend(Router::new()).await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response = create_category_endpoint(State(api), Extension(test_user()), form("ab")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Name must be between 3 and 20 characters");
        assert_form_input_with_value(&form, "name", "text", "ab");
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn backend_error_is_shown_as_alert() {
        let backend = spawn_backend(Router::new().route(
            "/category",
            post(|| async {
                (
                    StatusCode::CONFLICT,
                    Json(json!({ "status": 409, "message": "Category already exists" })),
                )
            }),
        ))
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response =
            create_category_endpoint(State(api), Extension(test_user()), form("Salary")).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        assert_eq!(element_text(&html, "p.font-semibold"), ["Category already exists"]);
    }
}
