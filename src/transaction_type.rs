//! Whether money came in or went out, shared by categories, transactions and statistics.

use std::fmt::Display;

use time::Date;

use serde::{Deserialize, Serialize, Serializer};

/// The two kinds of transaction.
///
/// The browser uses lower case ("income"), the backend upper case
/// ("INCOME"). Both are accepted when deserializing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "INCOME", alias = "Income")]
    Income,
    #[default]
    #[serde(alias = "EXPENSE", alias = "Expense")]
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    /// The form and query string value, e.g. "income".
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The value the backend expects, e.g. "INCOME".
    pub fn as_wire_str(self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes to the backend's upper case form.
impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

// The backend sends and expects transaction dates as "dd-MM-yyyy".
time::serde::format_description!(pub backend_date, Date, "[day]-[month]-[year]");

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::{Date, macros::date};

    use super::{TransactionType, backend_date};

    #[test]
    fn accepts_both_cases() {
        for (raw, want) in [
            ("\"INCOME\"", TransactionType::Income),
            ("\"income\"", TransactionType::Income),
            ("\"EXPENSE\"", TransactionType::Expense),
            ("\"expense\"", TransactionType::Expense),
        ] {
            assert_eq!(serde_json::from_str::<TransactionType>(raw).unwrap(), want);
        }
    }

    #[test]
    fn serializes_upper_case_for_backend() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Income).unwrap(),
            "\"INCOME\""
        );
    }

    #[test]
    fn form_values_are_lower_case() {
        #[derive(Deserialize)]
        struct Query {
            r#type: TransactionType,
        }

        let query: Query = serde_html_form::from_str("type=income").unwrap();

        assert_eq!(query.r#type, TransactionType::Income);
        assert_eq!(TransactionType::Expense.to_string(), "expense");
    }

    #[test]
    fn backend_dates_use_day_month_year() {
        #[derive(Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Dated {
            #[serde(with = "backend_date")]
            transaction_date: Date,
        }

        let dated: Dated =
            serde_json::from_str(r#"{"transactionDate": "15-01-2025"}"#).unwrap();

        assert_eq!(dated.transaction_date, date!(2025 - 01 - 15));
        assert_eq!(
            serde_json::to_string(&dated).unwrap(),
            r#"{"transactionDate":"15-01-2025"}"#
        );
    }
}
