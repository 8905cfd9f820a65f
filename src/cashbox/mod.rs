//! Cashboxes: the backend calls, the create and edit pages, and transfers
//! between cashboxes.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod transfer;

pub use core::{
    Cashbox, CashboxRequest, TransferRequest, create_cashbox, delete_cashbox, get_cashbox,
    get_cashboxes, transfer, update_cashbox,
};
pub use create::{create_cashbox_endpoint, get_new_cashbox_page};
pub use delete::delete_cashbox_endpoint;
pub use edit::{get_edit_cashbox_page, update_cashbox_endpoint};
pub use transfer::{
    TransferState, create_transfer_endpoint, get_transfer_page, transfer_coefficient_endpoint,
};
