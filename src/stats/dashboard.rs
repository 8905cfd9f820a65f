//! The dashboard: balance cards, category and cashbox breakdowns, and the
//! history chart.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserData,
    client::ApiClient,
    currency::{Currency, format_amount},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    stats::{
        chart::{chart_container, chart_script, history_chart},
        core::{
            BalanceStats, CashboxStats, CategoryStats, Timeframe, get_balance_stats,
            get_cashbox_stats, get_category_stats, get_history, get_history_periods,
        },
    },
    timezone::{month_to_date, parse_iso_date, today},
    transaction_type::TransactionType,
};

/// The longest date range the statistics may cover.
pub const MAX_DATE_RANGE_DAYS: i64 = 90;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DashboardQuery {
    /// The first day of the statistics as an ISO date.
    pub from: Option<String>,
    /// The last day of the statistics as an ISO date.
    pub to: Option<String>,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub year: Option<i32>,
    /// The history month, 1 for January.
    pub month: Option<u8>,
}

/// Resolve the requested range, falling back to month-to-date with an error
/// message when it is malformed, reversed or too long.
pub(super) fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: Date,
) -> (Date, Date, Option<String>) {
    let (default_from, default_to) = month_to_date(today);

    let from = match from.map(parse_iso_date) {
        Some(None) => return (default_from, default_to, Some("Invalid start date".to_owned())),
        Some(Some(from)) => from,
        None => default_from,
    };
    let to = match to.map(parse_iso_date) {
        Some(None) => return (default_from, default_to, Some("Invalid end date".to_owned())),
        Some(Some(to)) => to,
        None => default_to,
    };

    if from > to {
        return (
            default_from,
            default_to,
            Some("The start date must not be after the end date".to_owned()),
        );
    }

    if (to - from).whole_days() > MAX_DATE_RANGE_DAYS {
        return (
            default_from,
            default_to,
            Some(format!(
                "The selected date range is too big. Max allowed range is {MAX_DATE_RANGE_DAYS} days!"
            )),
        );
    }

    (from, to, None)
}

/// A labelled amount with its share of the total for its type.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Share {
    pub label: String,
    pub amount: f64,
    /// 0 to 100, and 0 when the total is 0.
    pub percentage: f64,
}

/// Group `items` of `transaction_type` into shares, largest first.
pub(super) fn shares(
    items: impl Iterator<Item = (TransactionType, String, f64)>,
    transaction_type: TransactionType,
) -> Vec<Share> {
    let items: Vec<(String, f64)> = items
        .filter(|(item_type, _, _)| *item_type == transaction_type)
        .map(|(_, label, amount)| (label, amount))
        .collect();
    let total: f64 = items.iter().map(|(_, amount)| amount).sum();

    let mut shares: Vec<Share> = items
        .into_iter()
        .map(|(label, amount)| Share {
            label,
            amount,
            percentage: if total == 0.0 {
                0.0
            } else {
                amount / total * 100.0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    shares
}

fn category_shares(stats: &[CategoryStats], transaction_type: TransactionType) -> Vec<Share> {
    shares(
        stats
            .iter()
            .map(|stat| (stat.transaction_type, stat.label(), stat.amount)),
        transaction_type,
    )
}

fn cashbox_shares(stats: &[CashboxStats], transaction_type: TransactionType) -> Vec<Share> {
    shares(
        stats
            .iter()
            .map(|stat| (stat.transaction_type, stat.cashbox.clone(), stat.amount)),
        transaction_type,
    )
}

fn balance_cards(balance: &BalanceStats, currency: &Currency) -> Markup {
    let cards = [
        ("Income", balance.income, "text-green-700 dark:text-green-300"),
        ("Expense", balance.expense, "text-red-700 dark:text-red-300"),
        ("Balance", balance.balance(), "text-gray-900 dark:text-white"),
    ];

    html! {
        section class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-6"
        {
            @for (title, amount, style) in cards {
                div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800" data-balance-card=(title)
                {
                    h3 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
                    p class={ "text-2xl font-bold " (style) } { (format_amount(amount, currency)) }
                }
            }
        }
    }
}

fn shares_table(title: &str, shares: &[Share], currency: &Currency) -> Markup {
    html! {
        div class="rounded-lg shadow bg-white dark:bg-gray-800 overflow-hidden"
        {
            h3 class="px-6 pt-4 font-semibold" { (title) }

            @if shares.is_empty() {
                p class="px-6 py-4 text-sm text-gray-500 dark:text-gray-400"
                {
                    "No data for the selected period"
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                        }
                    }
                    tbody
                    {
                        @for share in shares {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (share.label) }
                                td class=(TABLE_CELL_STYLE) { (format_amount(share.amount, currency)) }
                                td class=(TABLE_CELL_STYLE) { (format!("{:.0}%", share.percentage)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn range_form(from: Date, to: Date, query: &HistorySelection) -> Markup {
    html! {
        form method="get" action=(endpoints::DASHBOARD_VIEW) class="flex flex-wrap items-end gap-4 mb-6"
        {
            input type="hidden" name="timeframe" value=(query.timeframe.as_str());
            input type="hidden" name="year" value=(query.year);
            input type="hidden" name="month" value=(u8::from(query.month));

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="from" id="from" value=(from) class=(FORM_TEXT_INPUT_STYLE);
            }
            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="to" id="to" value=(to) class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
        }
    }
}

/// The timeframe, year and month the history chart shows.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct HistorySelection {
    pub timeframe: Timeframe,
    pub year: i32,
    pub month: Month,
    /// The years with data, newest first.
    pub years: Vec<i32>,
}

impl HistorySelection {
    /// Pick the requested year if it has data, otherwise the newest year. With
    /// no data at all the current year is offered.
    pub fn resolve(query: &DashboardQuery, mut years: Vec<i32>, today: Date) -> Self {
        if years.is_empty() {
            years.push(today.year());
        }
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();

        let year = query
            .year
            .filter(|year| years.contains(year))
            .unwrap_or(years[0]);
        let month = query
            .month
            .and_then(|month| Month::try_from(month).ok())
            .unwrap_or(today.month());

        Self {
            timeframe: query.timeframe,
            year,
            month,
            years,
        }
    }
}

fn history_form(from: Date, to: Date, selection: &HistorySelection) -> Markup {
    html! {
        form method="get" action=(endpoints::DASHBOARD_VIEW) class="flex flex-wrap items-end gap-4 mb-4"
        {
            input type="hidden" name="from" value=(from);
            input type="hidden" name="to" value=(to);

            div
            {
                label for="timeframe" class=(FORM_LABEL_STYLE) { "Timeframe" }
                select name="timeframe" id="timeframe" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for timeframe in [Timeframe::Year, Timeframe::Month] {
                        option
                            value=(timeframe.as_str())
                            selected[timeframe == selection.timeframe]
                        {
                            @match timeframe {
                                Timeframe::Year => "Year",
                                Timeframe::Month => "Month",
                            }
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in &selection.years {
                        option value=(year) selected[*year == selection.year] { (year) }
                    }
                }
            }

            @if selection.timeframe == Timeframe::Month {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for number in 1..=12u8 {
                            @if let Ok(month) = Month::try_from(number) {
                                option value=(number) selected[month == selection.month]
                                {
                                    (month)
                                }
                            }
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
        }
    }
}

struct DashboardData {
    from: Date,
    to: Date,
    range_error: Option<String>,
    balance: BalanceStats,
    categories: Vec<CategoryStats>,
    cashboxes: Vec<CashboxStats>,
    selection: HistorySelection,
}

fn dashboard_view(data: &DashboardData, currency: &Currency, head: &[HeadElement]) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Overview" }

            @if let Some(error) = &data.range_error {
                (Alert::ErrorSimple { message: error.clone() }.into_html())
            }

            (range_form(data.from, data.to, &data.selection))
            (balance_cards(&data.balance, currency))

            section class="grid grid-cols-1 lg:grid-cols-2 gap-4 mb-6"
            {
                @for transaction_type in TransactionType::ALL {
                    (shares_table(
                        &format!("{} by category", transaction_type.label()),
                        &category_shares(&data.categories, transaction_type),
                        currency,
                    ))
                }
                @for transaction_type in TransactionType::ALL {
                    (shares_table(
                        &format!("{} by cashbox", transaction_type.label()),
                        &cashbox_shares(&data.cashboxes, transaction_type),
                        currency,
                    ))
                }
            }

            section class="mb-6"
            {
                h2 class="mb-2 text-lg font-semibold" { "History" }
                (history_form(data.from, data.to, &data.selection))
                (chart_container())
            }
        }
    };

    base("Dashboard", head, &content)
}

/// Display the statistics for the requested range and history period.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user): Extension<UserData>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let (from, to, range_error) = resolve_range(query.from.as_deref(), query.to.as_deref(), today);
    if let Some(error) = &range_error {
        tracing::warn!("Falling back to the default dashboard range: {error}");
    }

    let (balance, categories, cashboxes, years) = tokio::try_join!(
        get_balance_stats(&state.api, &user.token, from, to),
        get_category_stats(&state.api, &user.token, from, to),
        get_cashbox_stats(&state.api, &user.token, from, to),
        get_history_periods(&state.api, &user.token),
    )?;
    let selection = HistorySelection::resolve(&query, years, today);
    let history = get_history(
        &state.api,
        &user.token,
        selection.timeframe,
        selection.year,
        selection.month,
    )
    .await?;

    let chart = history_chart(&history, selection.timeframe, selection.year, selection.month);
    let head = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        chart_script(&chart),
    ];
    let data = DashboardData {
        from,
        to,
        range_error,
        balance,
        categories,
        cashboxes,
        selection,
    };

    Ok(dashboard_view(&data, user.currency(), &head).into_response())
}
