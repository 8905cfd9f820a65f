//! Connecting a Monobank account and choosing which cards the backend
//! watches for new transactions.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    Error,
    alert::Alert,
    auth::UserData,
    cashbox::{Cashbox, get_cashboxes},
    client::ApiClient,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

const SECTION_ID: &str = "monobank-section";

/// Whether the user has granted the backend access to their Monobank account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonobankAuth {
    #[serde(default, alias = "isAccepted")]
    pub is_connected: bool,
    #[serde(default)]
    pub token_request_id: Option<String>,
    /// The page where the user confirms access in the Monobank app.
    #[serde(default, alias = "confirmUrl")]
    pub accept_url: Option<String>,
}

/// The card number mask, which Monobank sends either as one string or as a
/// list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum MaskedPan {
    One(String),
    Many(Vec<String>),
}

impl Default for MaskedPan {
    fn default() -> Self {
        MaskedPan::Many(Vec::new())
    }
}

/// A card of the connected Monobank account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonobankCard {
    /// Monobank's own account id, not a UUID.
    pub id: String,
    /// The cashbox the card's transactions are recorded in.
    #[serde(default)]
    pub cashbox_id: Option<Uuid>,
    #[serde(rename = "type", default)]
    pub card_type: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    masked_pan: MaskedPan,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_monitoring: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl MonobankCard {
    pub fn masked_pan(&self) -> String {
        match &self.masked_pan {
            MaskedPan::One(pan) => pan.clone(),
            MaskedPan::Many(pans) => pans.join(", "),
        }
    }

    /// The ISO 4217 letter code. Monobank uses the numeric codes.
    pub fn currency(&self) -> &str {
        match self.currency_code.trim() {
            "980" => "UAH",
            "840" => "USD",
            "978" => "EUR",
            "826" => "GBP",
            "985" => "PLN",
            code => code,
        }
    }

    fn type_label(&self) -> String {
        let mut chars = self.card_type.chars();

        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Card".to_owned(),
        }
    }
}

/// Ask the backend for the connection status, starting a new access request
/// if the account is not connected yet.
pub async fn request_connection(api: &ApiClient, token: &str) -> Result<MonobankAuth, Error> {
    Ok(api
        .post("/mono/request", &serde_json::json!({}), Some(token))
        .await?)
}

pub async fn get_cards(api: &ApiClient, token: &str) -> Result<Vec<MonobankCard>, Error> {
    Ok(api.get("/mono/account", token).await?)
}

pub async fn monitor_card(api: &ApiClient, token: &str, card_id: &str) -> Result<(), Error> {
    Ok(api
        .put_empty(&format!("/mono/account/monitor/{card_id}"), token)
        .await?)
}

pub async fn unmonitor_card(api: &ApiClient, token: &str, card_id: &str) -> Result<(), Error> {
    Ok(api
        .put_empty(&format!("/mono/account/unmonitor/{card_id}"), token)
        .await?)
}

/// What the Monobank section shows: a confirmation link, or the cards.
enum MonobankStatus {
    Pending(MonobankAuth),
    Connected {
        cards: Vec<MonobankCard>,
        cashboxes: Vec<Cashbox>,
    },
}

async fn load_status(api: &ApiClient, token: &str) -> Result<MonobankStatus, Error> {
    let auth = request_connection(api, token).await?;

    if !auth.is_connected {
        return Ok(MonobankStatus::Pending(auth));
    }

    let (cards, cashboxes) = tokio::try_join!(get_cards(api, token), get_cashboxes(api, token))?;

    Ok(MonobankStatus::Connected { cards, cashboxes })
}

fn refresh_button(text: &str) -> Markup {
    html! {
        button
            type="button"
            hx-post=(endpoints::MONOBANK_CONNECT_API)
            hx-target={ "#" (SECTION_ID) }
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class=(BUTTON_SECONDARY_STYLE)
        {
            (text)
        }
    }
}

fn pending_view(auth: &MonobankAuth) -> Markup {
    html! {
        div class="space-y-4 text-center"
        {
            @match &auth.accept_url {
                Some(url) => {
                    p { "Open the link below and confirm access in the Monobank app." }
                    a
                        href=(url)
                        target="_blank"
                        rel="noopener noreferrer"
                        class={ "inline-block " (BUTTON_PRIMARY_STYLE) }
                    {
                        "Open Monobank"
                    }
                }
                None => {
                    p { "Monobank did not send a confirmation link. Please try again later." }
                }
            }

            div { (refresh_button("I have confirmed access")) }
        }
    }
}

fn card_row(card: &MonobankCard, cashboxes: &[Cashbox]) -> Markup {
    let cashbox = card
        .cashbox_id
        .and_then(|id| cashboxes.iter().find(|cashbox| cashbox.id == id));
    let (toggle_url, toggle_text) = if card.is_monitoring {
        (
            format_endpoint(endpoints::MONOBANK_UNMONITOR_API, &card.id),
            "Stop monitoring",
        )
    } else {
        (
            format_endpoint(endpoints::MONOBANK_MONITOR_API, &card.id),
            "Start monitoring",
        )
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-card-id=(card.id)
        {
            td class=(TABLE_CELL_STYLE) { (card.type_label()) }
            td class=(TABLE_CELL_STYLE) { (card.currency()) }
            td class=(TABLE_CELL_STYLE) { (card.masked_pan()) }
            td class=(TABLE_CELL_STYLE) { (card.iban.as_deref().unwrap_or("-")) }
            td class=(TABLE_CELL_STYLE)
            {
                @match cashbox {
                    Some(cashbox) => { (cashbox.name) }
                    None => { "-" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex items-center gap-4"
                {
                    @if card.is_monitoring {
                        span class=(BADGE_STYLE) { "Monitoring" }
                    }
                    button
                        type="button"
                        hx-post=(toggle_url)
                        hx-target={ "#" (SECTION_ID) }
                        hx-swap="outerHTML"
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        (toggle_text)
                    }
                }
            }
        }
    }
}

fn cards_view(cards: &[MonobankCard], cashboxes: &[Cashbox]) -> Markup {
    html! {
        div class="flex justify-end mb-2" { (refresh_button("Refresh")) }

        @if cards.is_empty() {
            p class="text-sm text-gray-500 dark:text-gray-400" { "No cards found." }
        } @else {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Currency" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Card" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "IBAN" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Cashbox" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Monitoring" }
                    }
                }
                tbody
                {
                    @for card in cards {
                        (card_row(card, cashboxes))
                    }
                }
            }
        }
    }
}

fn monobank_section(status: &MonobankStatus) -> Markup {
    html! {
        section id=(SECTION_ID) class="w-full max-w-4xl"
        {
            @match status {
                MonobankStatus::Pending(auth) => {
                    h2 class="mb-4 text-lg font-semibold" { "Connect Monobank account" }
                    (pending_view(auth))
                }
                MonobankStatus::Connected { cards, cashboxes } => {
                    h2 class="mb-4 text-lg font-semibold" { "Your Monobank cards" }
                    (cards_view(cards, cashboxes))
                }
            }
        }
    }
}

/// Display the connection link, or the cards once the account is connected.
pub async fn get_monobank_page(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
) -> Result<Response, Error> {
    let status = load_status(&api, &user.token).await?;
    let nav_bar = NavBar::new(endpoints::MONOBANK_VIEW).into_html();

    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE) { (monobank_section(&status)) }
    };

    Ok(base("Monobank", &[], &content).into_response())
}

/// Check the connection again and re-render the Monobank section.
pub async fn connect_monobank_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
) -> Response {
    match load_status(&api, &user.token).await {
        Ok(status) => monobank_section(&status).into_response(),
        Err(error) => {
            tracing::error!("Could not get the Monobank connection status: {error}");
            error.into_alert_response()
        }
    }
}

async fn toggle_monitoring(
    api: &ApiClient,
    user: &UserData,
    card_id: &str,
    monitor: bool,
) -> Response {
    let result = if monitor {
        monitor_card(api, &user.token, card_id).await
    } else {
        unmonitor_card(api, &user.token, card_id).await
    };

    if let Err(error) = result {
        tracing::error!("Could not change monitoring of card {card_id}: {error}");
        return error.into_alert_response();
    }

    let message = if monitor {
        "Card monitoring activated"
    } else {
        "Card monitoring deactivated"
    };
    tracing::info!("{message} for card {card_id}");

    match load_status(api, &user.token).await {
        Ok(status) => html! {
            (monobank_section(&status))
            (Alert::SuccessSimple { message: message.to_owned() }.into_oob_html())
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Start recording the card's transactions.
pub async fn monitor_card_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(card_id): Path<String>,
) -> Response {
    toggle_monitoring(&api, &user, &card_id, true).await
}

/// Stop recording the card's transactions.
pub async fn unmonitor_card_endpoint(
    State(api): State<ApiClient>,
    Extension(user): Extension<UserData>,
    Path(card_id): Path<String>,
) -> Response {
    toggle_monitoring(&api, &user, &card_id, false).await
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json, Router,
        extract::{FromRef, Path, State},
        http::StatusCode,
        routing::{get, post, put},
    };
    use serde_json::{Value, json};

    use crate::{
        client::ApiClient,
        endpoints::{self, format_endpoint},
        error::SessionExpired,
        test_utils::{
            assert_valid_html, element_text, parse_html_document, parse_html_fragment,
            spawn_backend, test_state, test_user,
        },
    };

    use super::{
        MonobankAuth, MonobankCard, connect_monobank_endpoint, get_monobank_page,
        monitor_card_endpoint, unmonitor_card_endpoint,
    };

    fn card_json(is_monitoring: Value) -> Value {
        json!({
            "id": "card-1",
            "cashboxId": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "type": "black",
            "currencyCode": "980",
            "maskedPan": ["537541******1234"],
            "iban": "UA213223130000026007233566001",
            "isMonitoring": is_monitoring,
        })
    }

    fn connected_backend() -> Router {
        Router::new()
            .route(
                "/mono/request",
                post(|| async { Json(json!({ "isConnected": true })) }),
            )
            .route(
                "/mono/account",
                get(|| async { Json(json!([card_json(json!(false))])) }),
            )
            .route(
                "/cashbox",
                get(|| async {
                    Json(json!([{
                        "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                        "name": "Black card",
                        "currency": "UAH",
                        "balance": 0.0,
                    }]))
                }),
            )
            .route("/mono/account/monitor/{id}", put(|| async {}))
            .route("/mono/account/unmonitor/{id}", put(|| async {}))
    }

    #[test]
    fn auth_accepts_alternative_field_names() {
        let auth: MonobankAuth = serde_json::from_value(json!({
            "isAccepted": false,
            "tokenRequestId": "abc",
            "confirmUrl": "https://mbnk.app/auth/abc",
        }))
        .unwrap();

        assert_eq!(
            auth,
            MonobankAuth {
                is_connected: false,
                token_request_id: Some("abc".to_owned()),
                accept_url: Some("https://mbnk.app/auth/abc".to_owned()),
            }
        );
    }

    #[test]
    fn card_maps_numeric_currency_and_null_monitoring() {
        let card: MonobankCard = serde_json::from_value(card_json(Value::Null)).unwrap();

        assert_eq!(card.currency(), "UAH");
        assert_eq!(card.masked_pan(), "537541******1234");
        assert!(!card.is_monitoring);
    }

    #[tokio::test]
    async fn pending_account_shows_confirmation_link() {
        let backend = spawn_backend(Router::new().route(
            "/mono/request",
            post(|| async {
                Json(json!({ "isConnected": false, "acceptUrl": "https://mbnk.app/auth/abc" }))
            }),
        ))
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response = get_monobank_page(State(api), Extension(test_user()))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let link = html
            .select(&scraper::Selector::parse("a[target=_blank]").unwrap())
            .next()
            .and_then(|link| link.value().attr("href"));
        assert_eq!(link, Some("https://mbnk.app/auth/abc"));
        assert!(backend.requests_to("GET", "/mono/account").is_empty());
    }

    #[tokio::test]
    async fn connected_account_lists_cards() {
        let backend = spawn_backend(connected_backend()).await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response = connect_monobank_endpoint(State(api), Extension(test_user())).await;

        let html = parse_html_fragment(response).await;
        assert_eq!(
            element_text(&html, "tbody td"),
            [
                "Black",
                "UAH",
                "537541******1234",
                "UA213223130000026007233566001",
                "Black card",
                "Start monitoring"
            ]
        );
        let toggle = html
            .select(&scraper::Selector::parse("tbody button").unwrap())
            .next()
            .and_then(|button| button.value().attr("hx-post"));
        assert_eq!(
            toggle,
            Some(format_endpoint(endpoints::MONOBANK_MONITOR_API, "card-1").as_str())
        );
    }

    #[tokio::test]
    async fn monitoring_a_card_refreshes_cards() {
        let backend = spawn_backend(connected_backend()).await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response = monitor_card_endpoint(
            State(api.clone()),
            Extension(test_user()),
            Path("card-1".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.requests_to("PUT", "/mono/account/monitor/card-1").len(), 1);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            element_text(&html, "#alert-container p"),
            ["Card monitoring activated"]
        );

        unmonitor_card_endpoint(State(api), Extension(test_user()), Path("card-1".to_owned()))
            .await;
        assert_eq!(
            backend.requests_to("PUT", "/mono/account/unmonitor/card-1").len(),
            1
        );
    }

    #[tokio::test]
    async fn expired_session_is_flagged() {
        let backend = spawn_backend(Router::new().route(
            "/mono/request",
            post(|| async { StatusCode::UNAUTHORIZED }),
        ))
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let response = connect_monobank_endpoint(State(api), Extension(test_user())).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.extensions().get::<SessionExpired>().is_some());
    }
}
