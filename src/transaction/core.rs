//! The transaction model, its normalization from the backend's form, and the
//! backend calls that read and change transactions.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{
    Error,
    cashbox::Cashbox,
    category::Category,
    client::ApiClient,
    currency::{Currency, find_currency, format_amount},
    transaction_type::{TransactionType, backend_date},
};

/// A transaction as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    pub category: Category,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub currency: String,
    #[serde(with = "backend_date")]
    pub transaction_date: Date,
    #[serde(default)]
    pub cashbox: Option<Cashbox>,
    #[serde(default)]
    pub cashbox_id: Option<Uuid>,
}

/// A transaction ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub category: Category,
    pub cashbox_id: Option<Uuid>,
    /// The name of the cashbox, when the backend sent the whole cashbox.
    pub cashbox_name: Option<String>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    /// The currency the amount was recorded in.
    pub currency: &'static Currency,
    /// The amount formatted in the user's default currency.
    pub formatted_amount: String,
    pub description: Option<String>,
    pub transaction_date: Date,
}

impl Transaction {
    /// Normalize a backend transaction for a user whose default currency is `user_currency`.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnsupportedCurrency] if the transaction's currency is
    /// not in the currency table.
    pub fn from_dto(dto: TransactionDto, user_currency: &Currency) -> Result<Self, Error> {
        let currency = find_currency(&dto.currency)
            .ok_or_else(|| Error::UnsupportedCurrency(dto.currency.clone()))?;

        let (cashbox_id, cashbox_name) = match dto.cashbox {
            Some(cashbox) => (Some(cashbox.id), Some(cashbox.name)),
            None => (dto.cashbox_id, None),
        };

        Ok(Self {
            id: dto.id,
            category: dto.category,
            cashbox_id,
            cashbox_name,
            transaction_type: dto.transaction_type,
            amount: dto.amount,
            currency,
            formatted_amount: format_amount(dto.amount, user_currency),
            description: dto.description.filter(|description| !description.trim().is_empty()),
            transaction_date: dto.transaction_date,
        })
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
}

/// The body for creating or updating a transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest<'a> {
    pub category: CategoryRef,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: Option<&'a str>,
    pub currency: &'a str,
    #[serde(with = "backend_date")]
    pub transaction_date: Date,
    pub cashbox_id: Uuid,
    pub currency_coefficient: f64,
}

/// Get the user's transactions dated `from` to `to`, inclusive.
pub async fn get_transactions(
    api: &ApiClient,
    token: &str,
    from: Date,
    to: Date,
    user_currency: &Currency,
) -> Result<Vec<Transaction>, Error> {
    let query = [("from", from.to_string()), ("to", to.to_string())];
    let dtos: Vec<TransactionDto> = api.get_with_query("/transaction", &query, token).await?;

    dtos.into_iter()
        .map(|dto| Transaction::from_dto(dto, user_currency))
        .collect()
}

pub async fn get_transaction(
    api: &ApiClient,
    token: &str,
    id: Uuid,
    user_currency: &Currency,
) -> Result<Transaction, Error> {
    let dto = api.get(&format!("/transaction/{id}"), token).await?;

    Transaction::from_dto(dto, user_currency)
}

pub async fn create_transaction(
    api: &ApiClient,
    token: &str,
    request: &TransactionRequest<'_>,
) -> Result<(), Error> {
    api.post::<_, serde_json::Value>("/transaction", request, Some(token))
        .await?;

    Ok(())
}

pub async fn update_transaction(
    api: &ApiClient,
    token: &str,
    id: Uuid,
    request: &TransactionRequest<'_>,
) -> Result<(), Error> {
    api.put::<_, serde_json::Value>(&format!("/transaction/{id}"), request, token)
        .await?;

    Ok(())
}

pub async fn delete_transaction(api: &ApiClient, token: &str, id: Uuid) -> Result<(), Error> {
    Ok(api.delete(&format!("/transaction/{id}"), token).await?)
}
