//! The cashbox model and the backend calls that read and change cashboxes.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    client::ApiClient,
    currency::{Currency, find_currency, format_amount},
    transaction_type::backend_date,
};

/// A named balance held in one currency.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cashbox {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    /// The ISO 4217 code, as sent by the backend.
    pub currency: String,
    #[serde(default)]
    pub balance: f64,
}

impl Cashbox {
    /// The currency table entry for this cashbox.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnsupportedCurrency] if the backend sent a code that is
    /// not in the table.
    pub fn currency(&self) -> Result<&'static Currency, Error> {
        find_currency(&self.currency).ok_or_else(|| Error::UnsupportedCurrency(self.currency.clone()))
    }

    /// The balance in the cashbox's own currency, e.g. "1 200,00 ₴".
    pub fn formatted_balance(&self) -> String {
        match find_currency(&self.currency) {
            Some(currency) => format_amount(self.balance, currency),
            None => format!("{:.2} {}", self.balance, self.currency),
        }
    }
}

/// The body for creating or updating a cashbox.
#[derive(Debug, Serialize)]
pub struct CashboxRequest<'a> {
    pub name: &'a str,
    pub currency: &'a str,
    pub balance: f64,
}

/// The body for moving money from one cashbox to another.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest<'a> {
    pub amount: f64,
    pub currency_coefficient: f64,
    pub cashbox_from_id: Uuid,
    pub cashbox_to_id: Uuid,
    #[serde(with = "backend_date")]
    pub date: Date,
    pub description: &'a str,
}

pub async fn get_cashboxes(api: &ApiClient, token: &str) -> Result<Vec<Cashbox>, Error> {
    Ok(api.get("/cashbox", token).await?)
}

pub async fn get_cashbox(api: &ApiClient, token: &str, id: Uuid) -> Result<Cashbox, Error> {
    Ok(api.get(&format!("/cashbox/{id}"), token).await?)
}

pub async fn create_cashbox(
    api: &ApiClient,
    token: &str,
    request: &CashboxRequest<'_>,
) -> Result<Cashbox, Error> {
    Ok(api.post("/cashbox", request, Some(token)).await?)
}

pub async fn update_cashbox(
    api: &ApiClient,
    token: &str,
    id: Uuid,
    request: &CashboxRequest<'_>,
) -> Result<Cashbox, Error> {
    Ok(api.put(&format!("/cashbox/{id}"), request, token).await?)
}

pub async fn delete_cashbox(api: &ApiClient, token: &str, id: Uuid) -> Result<(), Error> {
    Ok(api.delete(&format!("/cashbox/{id}"), token).await?)
}

pub async fn transfer(
    api: &ApiClient,
    token: &str,
    request: &TransferRequest<'_>,
) -> Result<(), Error> {
    api.put::<_, serde_json::Value>("/cashbox/transfer", request, token)
        .await?;

    Ok(())
}
