//! Income and expense categories: the backend calls, the create and edit
//! pages, and the MCC code widget.

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod mcc;

pub use core::{
    Category, CategoryRequest, create_category, delete_category, get_all_categories,
    get_categories, get_category, update_category,
};
pub use create::{create_category_endpoint, get_new_category_page};
pub use delete::delete_category_endpoint;
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use mcc::mcc_codes_endpoint;
