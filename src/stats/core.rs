//! The statistics the backend aggregates, and the backend calls that fetch them.

use serde::Deserialize;
use time::{Date, Month};

use crate::{Error, client::ApiClient, transaction_type::TransactionType};

/// Total income and expense over a date range.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize)]
pub struct BalanceStats {
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expense: f64,
}

impl BalanceStats {
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// The total of one category over a date range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryStats {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category name.
    pub category: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub amount: f64,
}

impl CategoryStats {
    pub fn label(&self) -> String {
        match self.icon.as_deref().map(str::trim) {
            Some(icon) if !icon.is_empty() => format!("{icon} {}", self.category),
            _ => self.category.clone(),
        }
    }
}

/// The total of one cashbox over a date range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CashboxStats {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The cashbox name.
    pub cashbox: String,
    pub amount: f64,
}

/// Income and expense for one month of a year, or one day of a month.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryStats {
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub expense: f64,
    pub year: i32,
    /// January is 1.
    pub month: u8,
    /// Present only in the per-day series of a month.
    #[serde(default)]
    pub day: Option<u8>,
}

/// The granularity of the history chart.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One bar per day of the selected month.
    #[default]
    Month,
    /// One bar per month of the selected year.
    Year,
}

impl Timeframe {
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

fn range_query(from: Date, to: Date) -> [(&'static str, String); 2] {
    [("from", from.to_string()), ("to", to.to_string())]
}

pub async fn get_balance_stats(
    api: &ApiClient,
    token: &str,
    from: Date,
    to: Date,
) -> Result<BalanceStats, Error> {
    Ok(api
        .get_with_query("/stats/balance", &range_query(from, to), token)
        .await?)
}

pub async fn get_category_stats(
    api: &ApiClient,
    token: &str,
    from: Date,
    to: Date,
) -> Result<Vec<CategoryStats>, Error> {
    Ok(api
        .get_with_query("/stats/category", &range_query(from, to), token)
        .await?)
}

pub async fn get_cashbox_stats(
    api: &ApiClient,
    token: &str,
    from: Date,
    to: Date,
) -> Result<Vec<CashboxStats>, Error> {
    Ok(api
        .get_with_query("/stats/cashbox", &range_query(from, to), token)
        .await?)
}

/// The years that have any transactions.
pub async fn get_history_periods(api: &ApiClient, token: &str) -> Result<Vec<i32>, Error> {
    Ok(api.get("/stats/history/periods", token).await?)
}

/// Get the history series for `year`, or for `month` of `year` when the
/// timeframe is [Timeframe::Month].
pub async fn get_history(
    api: &ApiClient,
    token: &str,
    timeframe: Timeframe,
    year: i32,
    month: Month,
) -> Result<Vec<HistoryStats>, Error> {
    let path = format!("/stats/{}", timeframe.as_str());
    // The request counts months from zero, unlike the returned series.
    let query = [
        ("year", year.to_string()),
        ("month", (u8::from(month) - 1).to_string()),
    ];

    Ok(api.get_with_query(&path, &query, token).await?)
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, extract::FromRef, routing::get};
    use serde_json::json;
    use time::Month;

    use crate::{
        client::ApiClient,
        test_utils::{spawn_backend, test_state},
        transaction_type::TransactionType,
    };

    use super::{BalanceStats, CategoryStats, Timeframe, get_category_stats, get_history};

    #[test]
    fn balance_is_income_minus_expense() {
        let stats = BalanceStats {
            income: 100.0,
            expense: 40.5,
        };

        assert_eq!(stats.balance(), 59.5);
    }

    #[test]
    fn category_label_skips_missing_icon() {
        let stats: CategoryStats = serde_json::from_value(json!({
            "type": "EXPENSE", "category": "Rent", "icon": null, "amount": 5.0
        }))
        .unwrap();

        assert_eq!(stats.transaction_type, TransactionType::Expense);
        assert_eq!(stats.label(), "Rent");
    }

    #[tokio::test]
    async fn category_stats_are_fetched_for_range() {
        let backend = spawn_backend(Router::new().route(
            "/stats/category",
            get(|| async {
                Json(json!([{ "type": "INCOME", "category": "Salary", "icon": "💼", "amount": 10.0 }]))
            }),
        ))
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        let stats = get_category_stats(
            &api,
            "test-token",
            time::macros::date!(2025 - 01 - 01),
            time::macros::date!(2025 - 01 - 31),
        )
        .await
        .unwrap();

        assert_eq!(stats[0].label(), "💼 Salary");
        assert_eq!(
            backend.requests_to("GET", "/stats/category")[0].query.as_deref(),
            Some("from=2025-01-01&to=2025-01-31")
        );
    }

    #[tokio::test]
    async fn history_month_is_sent_zero_based() {
        let backend = spawn_backend(
            Router::new().route("/stats/month", get(|| async { Json(json!([])) })),
        )
        .await;
        let api = ApiClient::from_ref(&test_state(&backend.url));

        get_history(&api, "test-token", Timeframe::Month, 2025, Month::March)
            .await
            .unwrap();

        assert_eq!(
            backend.requests_to("GET", "/stats/month")[0].query.as_deref(),
            Some("year=2025&month=2")
        );
    }
}
