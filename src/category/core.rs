//! The category model and the backend calls that read and change categories.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, client::ApiClient, transaction_type::TransactionType};

/// A user-defined group of income or expense transactions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "CategoryDto")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// An emoji or short text shown next to the name, empty if none was set.
    pub icon: String,
    pub transaction_type: TransactionType,
    /// Merchant category codes used to file bank-card transactions automatically.
    pub mcc_codes: BTreeSet<u32>,
}

/// A category as the backend sends it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDto {
    id: Uuid,
    name: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(default)]
    mcc_codes: Option<Vec<i64>>,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            icon: dto.icon.unwrap_or_default(),
            transaction_type: dto.transaction_type,
            mcc_codes: dto
                .mcc_codes
                .unwrap_or_default()
                .into_iter()
                .filter_map(|code| u32::try_from(code).ok())
                .filter(|code| *code > 0)
                .collect(),
        }
    }
}

impl Category {
    /// The name with the icon in front of it, if there is one.
    pub fn display_name(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

/// The body for creating or updating a category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest<'a> {
    pub name: &'a str,
    pub icon: &'a str,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub mcc_codes: &'a BTreeSet<u32>,
}

/// Get the user's categories of one type.
pub async fn get_categories(
    api: &ApiClient,
    token: &str,
    transaction_type: TransactionType,
) -> Result<Vec<Category>, Error> {
    let path = format!("/category/type/{}", transaction_type.as_wire_str());

    Ok(api.get(&path, token).await?)
}

/// Get the user's income and expense categories, in that order.
pub async fn get_all_categories(api: &ApiClient, token: &str) -> Result<Vec<Category>, Error> {
    let (mut income, expense) = tokio::try_join!(
        get_categories(api, token, TransactionType::Income),
        get_categories(api, token, TransactionType::Expense),
    )?;

    income.extend(expense);
    Ok(income)
}

pub async fn get_category(api: &ApiClient, token: &str, id: Uuid) -> Result<Category, Error> {
    Ok(api.get(&format!("/category/{id}"), token).await?)
}

pub async fn create_category(
    api: &ApiClient,
    token: &str,
    request: &CategoryRequest<'_>,
) -> Result<Category, Error> {
    Ok(api.post("/category", request, Some(token)).await?)
}

pub async fn update_category(
    api: &ApiClient,
    token: &str,
    id: Uuid,
    request: &CategoryRequest<'_>,
) -> Result<Category, Error> {
    Ok(api.put(&format!("/category/{id}"), request, token).await?)
}

pub async fn delete_category(api: &ApiClient, token: &str, id: Uuid) -> Result<(), Error> {
    Ok(api.delete(&format!("/category/{id}"), token).await?)
}
