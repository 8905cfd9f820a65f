//! HTTP clients for the finance backend and the public currency-rate table.

mod api;
mod rates;

pub use api::{ApiClient, ApiError, GENERIC_ERROR_MESSAGE};
pub use rates::{DEFAULT_RATES_URL, RateClient};
