//! Statistics over the user's transactions and the dashboard that shows them.

mod chart;
mod core;
mod dashboard;

pub use core::{
    BalanceStats, CashboxStats, CategoryStats, HistoryStats, Timeframe, get_balance_stats,
    get_cashbox_stats, get_category_stats, get_history, get_history_periods,
};
pub use dashboard::{DashboardQuery, DashboardState, MAX_DATE_RANGE_DAYS, get_dashboard_page};
