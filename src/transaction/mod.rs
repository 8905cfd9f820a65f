//! Transactions: the backend calls, the create and edit forms, the table
//! with its filters, and the CSV export.

mod coefficient_endpoint;
mod core;
mod create;
mod csv_export;
mod delete;
mod edit;
mod form;
mod page;
mod table;

pub use coefficient_endpoint::{TransactionCoefficientForm, transaction_coefficient_endpoint};
pub use core::{
    CategoryRef, Transaction, TransactionDto, TransactionRequest, create_transaction,
    delete_transaction, get_transaction, get_transactions, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use csv_export::{export_transactions_endpoint, write_transactions_csv};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use form::TransactionState;
pub use page::{TransactionsPageState, TransactionsQuery, get_transactions_page};
