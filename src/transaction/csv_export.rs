//! Downloading the filtered transactions as a CSV file.

use axum::{
    Extension,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use csv::{QuoteStyle, WriterBuilder};
use time::macros::format_description;

use crate::{
    Error,
    auth::UserData,
    timezone::today,
    transaction::{
        Transaction,
        page::{TransactionsOptions, TransactionsPageState, TransactionsQuery, load_transactions},
    },
};

/// Spreadsheet programs need the byte order mark to read the file as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 7] = [
    "Category",
    "Category Icon",
    "Description",
    "Type",
    "Amount",
    "Formatted Amount",
    "Date",
];

/// Write `transactions` as CSV with every field quoted, in the given order.
pub fn write_transactions_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(UTF8_BOM.to_vec());

    writer
        .write_record(HEADER)
        .map_err(|error| Error::CsvExport(error.to_string()))?;

    for transaction in transactions {
        let date = transaction
            .transaction_date
            // The same day-month-year format the backend sends.
            .format(format_description!("[day]-[month]-[year]"))
            .map_err(|error| Error::CsvExport(error.to_string()))?;

        writer
            .write_record([
                transaction.category.name.as_str(),
                transaction.category.icon.as_str(),
                transaction.description(),
                transaction.transaction_type.as_str(),
                transaction.amount.to_string().as_str(),
                transaction.formatted_amount.as_str(),
                date.as_str(),
            ])
            .map_err(|error| Error::CsvExport(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvExport(error.to_string()))
}

/// Download every transaction matching the table's filters, ignoring paging.
pub async fn export_transactions_endpoint(
    State(state): State<TransactionsPageState>,
    Extension(user): Extension<UserData>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let options = TransactionsOptions::resolve(query, today, &state.pagination_config);
    let transactions = load_transactions(&state.api, &user, &options).await?;

    let body = write_transactions_csv(&transactions)
        .inspect_err(|error| tracing::error!("Could not export transactions: {error}"))?;
    tracing::info!("Exported {} transactions", transactions.len());

    let disposition = format!("attachment; filename=\"transactions_{today}.csv\"");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
