//! Filtering and sorting of fetched transactions for the table and the CSV export.

use std::cmp::Ordering;

use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::{transaction::Transaction, transaction_type::TransactionType};

/// The max number of graphemes to display in the transaction table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The column the table is sorted by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Category,
    Description,
    Type,
    Amount,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Date,
        SortField::Category,
        SortField::Description,
        SortField::Type,
        SortField::Amount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Date => "date",
            SortField::Category => "category",
            SortField::Description => "description",
            SortField::Type => "type",
            SortField::Amount => "amount",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortField::Date => "Date",
            SortField::Category => "Category",
            SortField::Description => "Description",
            SortField::Type => "Type",
            SortField::Amount => "Amount",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Keeps the transactions in any of `categories` and of any of `types`.
///
/// An empty list matches everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransactionFilter {
    pub categories: Vec<Uuid>,
    pub types: Vec<TransactionType>,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        (self.categories.is_empty() || self.categories.contains(&transaction.category.id))
            && (self.types.is_empty() || self.types.contains(&transaction.transaction_type))
    }
}

pub fn filter_transactions(
    transactions: Vec<Transaction>,
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter(|transaction| filter.matches(transaction))
        .collect()
}

fn compare(a: &Transaction, b: &Transaction, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.transaction_date.cmp(&b.transaction_date),
        SortField::Category => a
            .category
            .name
            .to_lowercase()
            .cmp(&b.category.name.to_lowercase()),
        SortField::Description => a
            .description()
            .to_lowercase()
            .cmp(&b.description().to_lowercase()),
        SortField::Type => a.transaction_type.as_str().cmp(b.transaction_type.as_str()),
        SortField::Amount => a.amount.total_cmp(&b.amount),
    }
}

/// Sort in place by `field`. Ties are broken by date, newest first, then by ID
/// so the order is stable between requests.
pub fn sort_transactions(
    transactions: &mut [Transaction],
    field: SortField,
    direction: SortDirection,
) {
    transactions.sort_by(|a, b| {
        let ordering = match direction {
            SortDirection::Asc => compare(a, b, field),
            SortDirection::Desc => compare(b, a, field),
        };

        ordering
            .then_with(|| b.transaction_date.cmp(&a.transaction_date))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Truncate long descriptions, returning the full text as a tooltip when truncated.
pub fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        let truncated = truncated + "...";
        (truncated, Some(description))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use crate::{
        currency::find_currency,
        transaction::{Transaction, TransactionDto, core::tests::transaction_json},
        transaction_type::TransactionType,
    };

    use super::{
        MAX_DESCRIPTION_GRAPHEMES, SortDirection, SortField, TransactionFilter,
        filter_transactions, format_description, sort_transactions,
    };

    fn transaction(id: u128, date: &str, amount: f64) -> Transaction {
        let id = Uuid::from_u128(id).to_string();
        let dto: TransactionDto =
            serde_json::from_value(transaction_json(&id, date, amount, "UAH")).unwrap();

        Transaction::from_dto(dto, find_currency("UAH").unwrap()).unwrap()
    }

    #[test]
    fn backend_dates_sort_chronologically() {
        let mut transactions = vec![
            transaction(1, "15-01-2025", 1.0),
            transaction(2, "01-12-2024", 2.0),
            transaction(3, "02-01-2025", 3.0),
        ];

        sort_transactions(&mut transactions, SortField::Date, SortDirection::Asc);

        let dates: Vec<String> = transactions
            .iter()
            .map(|transaction| transaction.transaction_date.to_string())
            .collect();
        assert_eq!(dates, ["2024-12-01", "2025-01-02", "2025-01-15"]);
    }

    #[test]
    fn amount_descending_breaks_ties_by_newest_date() {
        let mut transactions = vec![
            transaction(1, "01-01-2025", 5.0),
            transaction(2, "03-01-2025", 5.0),
            transaction(3, "02-01-2025", 9.0),
        ];

        sort_transactions(&mut transactions, SortField::Amount, SortDirection::Desc);

        let ids: Vec<u128> = transactions
            .iter()
            .map(|transaction| transaction.id.as_u128())
            .collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let transactions = vec![transaction(1, "01-01-2025", 1.0), transaction(2, "02-01-2025", 1.0)];

        let got = filter_transactions(transactions, &TransactionFilter::default());

        assert_eq!(got.len(), 2);
    }

    #[test]
    fn filters_by_category_and_type() {
        let mut income = transaction(1, "01-01-2025", 1.0);
        income.transaction_type = TransactionType::Income;
        let groceries = transaction(2, "02-01-2025", 1.0);
        let mut other = transaction(3, "03-01-2025", 1.0);
        other.category.id = Uuid::from_u128(99);

        let filter = TransactionFilter {
            categories: vec![groceries.category.id],
            types: vec![TransactionType::Expense],
        };
        let got = filter_transactions(vec![income, groceries.clone(), other], &filter);

        assert_eq!(got, [groceries]);
    }

    #[test]
    fn sort_field_parses_from_query_value() {
        let field: SortField = serde_json::from_value(json!("description")).unwrap();

        assert_eq!(field, SortField::Description);
    }

    #[test]
    fn long_description_is_truncated_with_tooltip() {
        let description = "a".repeat(MAX_DESCRIPTION_GRAPHEMES + 1);

        let (text, tooltip) = format_description(&description);

        assert_eq!(text.chars().count(), MAX_DESCRIPTION_GRAPHEMES);
        assert!(text.ends_with("..."));
        assert_eq!(tooltip, Some(description.as_str()));
    }
}
