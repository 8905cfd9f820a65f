//! Cashbox creation page and endpoint.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};

use crate::{
    alert::Alert,
    auth::UserData,
    cashbox::{
        create_cashbox,
        form::{
            CashboxForm, CashboxFormAction, CashboxFormErrors, CashboxFormValues, cashbox_form,
            validate_cashbox_form,
        },
    },
    client::ApiClient,
    endpoints,
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base},
    navigation::NavBar,
};

/// Render the cashbox creation page.
pub async fn get_new_cashbox_page(Extension(user): Extension<UserData>) -> Response {
    new_cashbox_view(&user).into_response()
}

fn new_cashbox_view(user: &UserData) -> Markup {
    let nav_bar = NavBar::new(endpoints::MANAGE_VIEW).into_html();
    let form = cashbox_form(
        CashboxFormAction::Create(endpoints::CASHBOXES_API),
        &CashboxFormValues::new(user.currency().code),
        &CashboxFormErrors::default(),
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "New cashbox" }
            (form)
            a href=(endpoints::MANAGE_VIEW) class={ "mt-4 " (LINK_STYLE) } { "Back to manage" }
        }
    };

    base("Create Cashbox", &[], &content)
}

/// Handle cashbox creation form submission.
pub async fn create_cashbox_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Form(form): Form<CashboxForm>,
) -> Response {
    let action = CashboxFormAction::Create(endpoints::CASHBOXES_API);
    let (values, balance) = validate_cashbox_form(form);

    let balance = match balance {
        Ok(balance) => balance,
        Err(errors) => return cashbox_form(action, &values, &errors).into_response(),
    };

    match create_cashbox(&api, &user.token, &values.request(balance)).await {
        Ok(cashbox) => {
            tracing::info!("Created cashbox {}", cashbox.id);
            let defaults = CashboxFormValues::new(user.currency().code);

            html! {
                (cashbox_form(action, &defaults, &CashboxFormErrors::default()))
                (Alert::SuccessSimple {
                    message: format!("Cashbox \"{}\" created", cashbox.name),
                }
                .into_oob_html())
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create cashbox: {error}");
            error.into_alert_response()
        }
    }
}
