use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use uuid::Uuid;

use crate::{
    Error,
    auth::UserData,
    category::{
        Category, get_category, update_category,
        form::{
            CategoryForm, CategoryFormAction, CategoryFormErrors, CategoryFormValues,
            category_form, validate_category_form,
        },
    },
    client::ApiClient,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
};

/// Render the page for editing a category.
pub async fn get_edit_category_page(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, Error> {
    let category = get_category(&api, &user.token, category_id).await?;

    Ok(edit_category_view(&category).into_response())
}

fn edit_category_view(category: &Category) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();
    let update_url = format_endpoint(endpoints::CATEGORY_API, category.id);
    let form = category_form(
        CategoryFormAction::Update(&update_url),
        &CategoryFormValues::from_category(category),
        &CategoryFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit category" }
            (form)
            a href=(endpoints::MANAGE_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Back to manage" }
        }
    };

    base("Edit Category", &[], &content)
}

/// Handle category edit form submission.
///
/// Redirects to the manage page on success. The category's type cannot be
/// changed, the hidden type field only keeps the form's labels right.
pub async fn update_category_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(category_id): Path<Uuid>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let (values, errors) = validate_category_form(form);

    if !errors.is_empty() {
        let update_url = format_endpoint(endpoints::CATEGORY_API, category_id);
        return category_form(CategoryFormAction::Update(&update_url), &values, &errors)
            .into_response();
    }

    match update_category(&api, &user.token, category_id, &values.request()).await {
        Ok(_) => {
            tracing::info!("Updated category {category_id}");
            (HxRedirect(endpoints::MANAGE_VIEW.to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update category {category_id}: {error}");
            error.into_alert_response()
        }
    }
}
