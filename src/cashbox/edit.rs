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
    cashbox::{
        Cashbox,
        form::{
            CashboxForm, CashboxFormAction, CashboxFormErrors, CashboxFormValues, cashbox_form,
            validate_cashbox_form,
        },
        get_cashbox, update_cashbox,
    },
    client::ApiClient,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
};

/// Render the page for editing a cashbox.
pub async fn get_edit_cashbox_page(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(cashbox_id): Path<Uuid>,
) -> Result<Response, Error> {
    let cashbox = get_cashbox(&api, &user.token, cashbox_id).await?;

    Ok(edit_cashbox_view(&cashbox).into_response())
}

fn edit_cashbox_view(cashbox: &Cashbox) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();
    let update_url = format_endpoint(endpoints::CASHBOX_API, cashbox.id);
    let form = cashbox_form(
        CashboxFormAction::Update(&update_url),
        &CashboxFormValues::from_cashbox(cashbox),
        &CashboxFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit cashbox" }
            (form)
            a href=(endpoints::MANAGE_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Back to manage" }
        }
    };

    base("Edit Cashbox", &[], &content)
}

/// Handle cashbox edit form submission, redirecting to the manage page on success.
pub async fn update_cashbox_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(cashbox_id): Path<Uuid>,
    Form(form): Form<CashboxForm>,
) -> Response {
    let (values, balance) = validate_cashbox_form(form);

    let balance = match balance {
        Ok(balance) => balance,
        Err(errors) => {
            let update_url = format_endpoint(endpoints::CASHBOX_API, cashbox_id);
            return cashbox_form(CashboxFormAction::Update(&update_url), &values, &errors)
                .into_response();
        }
    };

    match update_cashbox(&api, &user.token, cashbox_id, &values.request(balance)).await {
        Ok(_) => {
            tracing::info!("Updated cashbox {cashbox_id}");
            (HxRedirect(endpoints::MANAGE_VIEW.to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not update cashbox {cashbox_id}: {error}");
            error.into_alert_response()
        }
    }
}
