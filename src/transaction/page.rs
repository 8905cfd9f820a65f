//! The transactions page: a filterable, sortable and paged table.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserData,
    category::{Category, get_all_categories},
    client::ApiClient,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{
        PaginationConfig, create_pagination_indicators, page_count, page_slice, pagination_nav,
    },
    timezone::{month_to_date, parse_iso_date, today},
    transaction::{
        Transaction, get_transactions,
        table::{
            SortDirection, SortField, TransactionFilter, filter_transactions, format_description,
            sort_transactions,
        },
    },
    transaction_type::TransactionType,
};

/// The state needed for the transactions page and the CSV export.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub api: ApiClient,
    /// The local timezone as a canonical timezone name, e.g. "Europe/Kyiv".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string of the transactions page and the CSV export.
///
/// `category` and `type` may be repeated.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionsQuery {
    /// The first day to show as an ISO date, e.g. "2025-01-31".
    pub from: Option<String>,
    /// The last day to show as an ISO date.
    pub to: Option<String>,
    #[serde(default)]
    pub category: Vec<Uuid>,
    #[serde(rename = "type", default)]
    pub types: Vec<TransactionType>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub direction: SortDirection,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// The query with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TransactionsOptions {
    pub from: Date,
    pub to: Date,
    pub filter: TransactionFilter,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: u64,
    pub per_page: u64,
    pub max_pages: u64,
    /// Why the requested dates were replaced by the default range.
    pub range_error: Option<String>,
}

impl TransactionsOptions {
    pub fn resolve(query: TransactionsQuery, today: Date, pagination: &PaginationConfig) -> Self {
        let (default_from, default_to) = month_to_date(today);
        let from = query.from.as_deref().map(parse_iso_date);
        let to = query.to.as_deref().map(parse_iso_date);

        let (from, to, range_error) = match (from, to) {
            (Some(None), _) | (_, Some(None)) => (
                default_from,
                default_to,
                Some("Dates must be in the format YYYY-MM-DD".to_owned()),
            ),
            (from, to) => {
                let from = from.flatten().unwrap_or(default_from);
                let to = to.flatten().unwrap_or(default_to);

                if from > to {
                    (
                        default_from,
                        default_to,
                        Some("The start date must not be after the end date".to_owned()),
                    )
                } else {
                    (from, to, None)
                }
            }
        };

        Self {
            from,
            to,
            filter: TransactionFilter {
                categories: query.category,
                types: query.types,
            },
            sort: query.sort,
            direction: query.direction,
            page: query.page.unwrap_or(pagination.default_page).max(1),
            per_page: query
                .per_page
                .unwrap_or(pagination.default_page_size)
                .max(1),
            max_pages: pagination.max_pages,
            range_error,
        }
    }

    /// The filter and range part of the query string, shared by every link on the page.
    fn base_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("from", self.from.to_string()), ("to", self.to.to_string())];
        pairs.extend(
            self.filter
                .categories
                .iter()
                .map(|id| ("category", id.to_string())),
        );
        pairs.extend(
            self.filter
                .types
                .iter()
                .map(|transaction_type| ("type", transaction_type.as_str().to_owned())),
        );
        pairs
    }

    fn url(&self, route: &str, pairs: &[(&'static str, String)]) -> String {
        let query = serde_html_form::to_string(pairs).unwrap_or_default();

        format!("{route}?{query}")
    }

    /// The link to `page` of the table in the current order.
    pub fn page_url(&self, page: u64) -> String {
        let mut pairs = self.base_pairs();
        pairs.push(("sort", self.sort.as_str().to_owned()));
        pairs.push(("direction", self.direction.as_str().to_owned()));
        pairs.push(("page", page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));

        self.url(endpoints::TRANSACTIONS_VIEW, &pairs)
    }

    /// The link for a column header. The current column flips direction,
    /// other columns start with their natural order.
    pub fn sort_url(&self, field: SortField) -> String {
        let direction = if field == self.sort {
            self.direction.reversed()
        } else if matches!(field, SortField::Date | SortField::Amount) {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };

        let mut pairs = self.base_pairs();
        pairs.push(("sort", field.as_str().to_owned()));
        pairs.push(("direction", direction.as_str().to_owned()));
        pairs.push(("per_page", self.per_page.to_string()));

        self.url(endpoints::TRANSACTIONS_VIEW, &pairs)
    }

    /// The CSV export of every row matching the current filters, in the current order.
    pub fn export_url(&self) -> String {
        let mut pairs = self.base_pairs();
        pairs.push(("sort", self.sort.as_str().to_owned()));
        pairs.push(("direction", self.direction.as_str().to_owned()));

        self.url(endpoints::TRANSACTIONS_EXPORT, &pairs)
    }
}

/// Fetch the transactions in the range, then filter and sort them.
pub(super) async fn load_transactions(
    api: &ApiClient,
    user: &UserData,
    options: &TransactionsOptions,
) -> Result<Vec<Transaction>, Error> {
    let transactions =
        get_transactions(api, &user.token, options.from, options.to, user.currency()).await?;
    let mut transactions = filter_transactions(transactions, &options.filter);
    sort_transactions(&mut transactions, options.sort, options.direction);

    Ok(transactions)
}

fn amount_class(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Income => "text-green-700 dark:text-green-300",
        TransactionType::Expense => "text-red-700 dark:text-red-300",
    }
}

fn sort_header(options: &TransactionsOptions, field: SortField) -> Markup {
    let (arrow, aria_sort) = match (field == options.sort, options.direction) {
        (false, _) => ("", None),
        (true, SortDirection::Asc) => (" ▲", Some("ascending")),
        (true, SortDirection::Desc) => (" ▼", Some("descending")),
    };

    html! {
        th scope="col" class=(TABLE_CELL_STYLE) aria-sort=[aria_sort]
        {
            a href=(options.sort_url(field)) class="hover:underline" { (field.label()) (arrow) }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (description, tooltip) = format_description(transaction.description());
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description()
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-row="true"
        {
            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(transaction.transaction_date) { (transaction.transaction_date) }
            }
            td class=(TABLE_CELL_STYLE) { (transaction.category.display_name()) }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE) { (transaction.transaction_type.as_str()) }
            td class={ (TABLE_CELL_STYLE) " text-right " (amount_class(transaction.transaction_type)) }
            {
                (transaction.formatted_amount)
            }
            td class=(TABLE_CELL_STYLE)
            {
                (edit_delete_action_links(
                    &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
                    &format_endpoint(endpoints::TRANSACTION_API, transaction.id),
                    &confirm_message,
                ))
            }
        }
    }
}

fn filter_form(options: &TransactionsOptions, categories: &[Category]) -> Markup {
    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-wrap items-end gap-4 p-4"
        {
            input type="hidden" name="sort" value=(options.sort.as_str());
            input type="hidden" name="direction" value=(options.direction.as_str());

            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input type="date" name="from" id="from" value=(options.from)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input type="date" name="to" id="to" value=(options.to)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset class="flex gap-3"
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                @for transaction_type in TransactionType::ALL {
                    label class="flex items-center gap-1 text-sm"
                    {
                        input
                            type="checkbox"
                            name="type"
                            value=(transaction_type.as_str())
                            checked[options.filter.types.contains(&transaction_type)];
                        (transaction_type.label())
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Categories" }

                select name="category" id="category" multiple class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[options.filter.categories.contains(&category.id)]
                        {
                            (category.display_name())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Apply" }
        }
    }
}

fn transactions_view(
    options: &TransactionsOptions,
    categories: &[Category],
    transactions: &[Transaction],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let total_pages = page_count(transactions.len(), options.per_page);
    let page = options.page.min(total_pages);
    let rows = page_slice(transactions, page, options.per_page);
    let indicators = create_pagination_indicators(page, total_pages, options.max_pages);
    let new_income_url = format!(
        "{}?type={}",
        endpoints::NEW_TRANSACTION_VIEW,
        TransactionType::Income.as_str()
    );
    let new_expense_url = format!(
        "{}?type={}",
        endpoints::NEW_TRANSACTION_VIEW,
        TransactionType::Expense.as_str()
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex flex-wrap items-center justify-between gap-4 mb-4"
            {
                h1 class="text-xl font-bold" { "Transactions" }

                div class="flex gap-4"
                {
                    a href=(new_income_url) class=(LINK_STYLE) { "New income" }
                    a href=(new_expense_url) class=(LINK_STYLE) { "New expense" }
                    a href=(options.export_url()) class=(LINK_STYLE) download { "Export CSV" }
                }
            }

            @if let Some(error) = &options.range_error {
                (Alert::ErrorSimple { message: error.clone() }.into_html())
            }

            section class="rounded bg-gray-50 dark:bg-gray-800 overflow-x-auto"
            {
                (filter_form(options, categories))

                table class="w-full my-2 text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            @for field in SortField::ALL {
                                (sort_header(options, field))
                            }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for transaction in rows {
                            (transaction_row(transaction))
                        }

                        @if rows.is_empty() {
                            tr
                            {
                                td colspan="6" data-empty-state="true" class="px-6 py-4 text-center"
                                {
                                    "No transactions match these filters."
                                }
                            }
                        }
                    }
                }

                @if total_pages > 1 {
                    (pagination_nav(&indicators, |page| options.page_url(page)))
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

/// Render the user's transactions as a table.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user): Extension<UserData>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;
    let options = TransactionsOptions::resolve(query, today, &state.pagination_config);

    let (transactions, categories) = tokio::try_join!(
        load_transactions(&state.api, &user, &options),
        get_all_categories(&state.api, &user.token),
    )?;

    Ok(transactions_view(&options, &categories, &transactions).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json, Router,
        extract::{FromRef, State},
        routing::get,
    };
    use axum_extra::extract::Query;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        pagination::PaginationConfig,
        test_utils::{
            assert_valid_html, element_text, parse_html_document, spawn_backend, test_state,
            test_user,
        },
        transaction::{core::tests::transaction_json, table::SortField},
        transaction_type::TransactionType,
    };

    use super::{
        TransactionsOptions, TransactionsPageState, TransactionsQuery, get_transactions_page,
    };

    #[test]
    fn defaults_to_month_to_date_newest_first() {
        let options = TransactionsOptions::resolve(
            TransactionsQuery::default(),
            date!(2025 - 03 - 14),
            &PaginationConfig::default(),
        );

        assert_eq!(options.from, date!(2025 - 03 - 01));
        assert_eq!(options.to, date!(2025 - 03 - 14));
        assert_eq!(options.sort, SortField::Date);
        assert_eq!(options.page, 1);
        assert_eq!(options.range_error, None);
    }

    #[test]
    fn reversed_range_falls_back_with_error() {
        let options = TransactionsOptions::resolve(
            TransactionsQuery {
                from: Some("2025-02-10".to_owned()),
                to: Some("2025-02-01".to_owned()),
                ..Default::default()
            },
            date!(2025 - 03 - 14),
            &PaginationConfig::default(),
        );

        assert_eq!(options.from, date!(2025 - 03 - 01));
        assert!(options.range_error.is_some());
    }

    #[test]
    fn links_keep_repeated_filters() {
        let options = TransactionsOptions::resolve(
            TransactionsQuery {
                from: Some("2025-01-01".to_owned()),
                to: Some("2025-01-31".to_owned()),
                types: vec![TransactionType::Income, TransactionType::Expense],
                ..Default::default()
            },
            date!(2025 - 03 - 14),
            &PaginationConfig::default(),
        );

        assert_eq!(
            options.sort_url(SortField::Date),
            "/transactions?from=2025-01-01&to=2025-01-31&type=income&type=expense\
            &sort=date&direction=asc&per_page=20"
        );
        assert_eq!(
            options.export_url(),
            "/transactions/export?from=2025-01-01&to=2025-01-31&type=income&type=expense\
            &sort=date&direction=desc"
        );
    }

    #[tokio::test]
    async fn page_lists_filtered_transactions() {
        let backend = spawn_backend(
            Router::new()
                .route(
                    "/transaction",
                    get(|| async {
                        Json(json!([
                            transaction_json("00000000-0000-0000-0000-000000000001", "02-01-2025", 10.0, "UAH"),
                            transaction_json("00000000-0000-0000-0000-000000000002", "05-01-2025", 20.0, "UAH"),
                        ]))
                    }),
                )
                .route("/category/type/{type}", get(|| async { Json(json!([])) })),
        )
        .await;
        let state = TransactionsPageState::from_ref(&test_state(&backend.url));

        let response = get_transactions_page(
            State(state),
            Extension(test_user()),
            Query(TransactionsQuery {
                from: Some("2025-01-01".to_owned()),
                to: Some("2025-01-31".to_owned()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(
            element_text(&html, "tr[data-transaction-row] time"),
            ["2025-01-05", "2025-01-02"]
        );
        let request = &backend.requests_to("GET", "/transaction")[0];
        assert_eq!(request.query.as_deref(), Some("from=2025-01-01&to=2025-01-31"));
    }
}
