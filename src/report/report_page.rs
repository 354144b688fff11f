//! The monthly report page: summary metrics and per-kind breakdown tables.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    period::{Period, PeriodQuery},
    report::{aggregation::total, picker::period_picker, query::transactions_for_period},
    timezone::local_today,
    transaction::{Transaction, TransactionKind},
};

const METRIC_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const METRIC_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// The state needed for the report page.
#[derive(Debug, Clone)]
pub struct ReportPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the monthly report for the requested period.
///
/// Without a query string the report defaults to the month in progress.
pub async fn get_report_page(
    State(state): State<ReportPageState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;
    let period = query.resolve(today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLock)?;

    let expenses = transactions_for_period(TransactionKind::Expense, period, &connection)?;
    let incomes = transactions_for_period(TransactionKind::Income, period, &connection)?;

    let nav_bar = NavBar::new(endpoints::REPORT_VIEW);

    Ok(report_view(nav_bar, period, &expenses, &incomes).into_response())
}

/// Renders the report page: period picker, summary metrics, and one
/// breakdown table per transaction kind.
fn report_view(
    nav_bar: NavBar,
    period: Period,
    expenses: &[Transaction],
    incomes: &[Transaction],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let expense_total = total(expenses);
    let income_total = total(incomes);
    let balance = income_total - expense_total;

    let balance_style = if balance >= 0.0 {
        METRIC_GREEN_STYLE
    } else {
        METRIC_RED_STYLE
    };

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-2xl font-bold py-4" { "Monthly Report" }

            (period_picker(endpoints::REPORT_VIEW, period))

            h3 class="text-xl font-semibold mb-4" { "Summary for " (period) }

            section
                id="metrics"
                class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full max-w-screen-lg mb-8"
            {
                (metric_card("Total Income", income_total, METRIC_GREEN_STYLE))
                (metric_card("Total Expenses", expense_total, METRIC_RED_STYLE))
                (metric_card("Balance", balance, balance_style))
            }

            (breakdown_table("Expense Breakdown", expenses))
            (breakdown_table("Income Breakdown", incomes))
        }
    );

    base("Report", &[], &content)
}

fn metric_card(label: &str, value: f64, value_style: &str) -> Markup {
    html!(
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                dark:border-gray-700 rounded-lg p-4 shadow-md"
        {
            div class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }

            div class={"text-3xl font-bold " (value_style)} { (format_currency(value)) }
        }
    )
}

/// Renders one kind's transactions as a table, or a notice when the period
/// has none.
fn breakdown_table(title: &str, transactions: &[Transaction]) -> Markup {
    html!(
        section class="w-full max-w-screen-lg mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { (title) }

            @if transactions.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No transactions recorded for this period."
                }
            } @else {
                div class="overflow-x-auto rounded-lg shadow"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                            }
                        }
                        tbody
                        {
                            @for transaction in transactions {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                    td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                    td class={(TABLE_CELL_STYLE) " whitespace-nowrap"}
                                    {
                                        (format_currency(transaction.amount))
                                    }
                                    td class=(TABLE_CELL_STYLE) { (transaction.note) }
                                }
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode},
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use super::{ReportPageState, get_report_page};
    use crate::{
        Error,
        category::CategoryName,
        db::initialize,
        period::PeriodQuery,
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    fn get_test_state() -> ReportPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ReportPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn seed_march_2025(state: &ReportPageState) {
        let connection = state.db_connection.lock().unwrap();

        create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new("Food").unwrap(),
                20.0,
                date!(2025 - 03 - 05),
            ),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                CategoryName::new("Fuel").unwrap(),
                15.5,
                date!(2025 - 03 - 10),
            ),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                TransactionKind::Income,
                CategoryName::new("Salary").unwrap(),
                1000.0,
                date!(2025 - 03 - 01),
            ),
            &connection,
        )
        .unwrap();
    }

    fn march_2025() -> Query<PeriodQuery> {
        Query(PeriodQuery {
            month: Some(3),
            year: Some(2025),
        })
    }

    #[tokio::test]
    async fn report_shows_totals_and_balance() {
        let state = get_test_state();
        seed_march_2025(&state);

        let response = get_report_page(State(state), march_2025()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        let text = html.html();
        assert!(text.contains("Summary for March 2025"), "got {text}");
        assert!(text.contains("$35.50"), "expense total missing: {text}");
        assert!(text.contains("$964.50"), "balance missing: {text}");
    }

    #[tokio::test]
    async fn report_lists_transactions_per_kind() {
        let state = get_test_state();
        seed_march_2025(&state);

        let response = get_report_page(State(state), march_2025()).await.unwrap();
        let html = parse_html(response).await;

        let row_selector = Selector::parse("tbody tr").unwrap();
        let rows: Vec<_> = html.select(&row_selector).collect();
        // Two expense rows and one income row.
        assert_eq!(rows.len(), 3);

        let text = html.html();
        assert!(text.contains("Food"));
        assert!(text.contains("Fuel"));
        assert!(text.contains("Salary"));
    }

    #[tokio::test]
    async fn empty_period_shows_zero_metrics() {
        let state = get_test_state();
        seed_march_2025(&state);

        let response = get_report_page(
            State(state),
            Query(PeriodQuery {
                month: Some(7),
                year: Some(2025),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;

        let text = html.html();
        assert!(text.contains("$0.00"), "zero metrics missing: {text}");
        assert!(text.contains("No transactions recorded for this period."));
    }

    #[tokio::test]
    async fn invalid_month_is_rejected() {
        let state = get_test_state();

        let result = get_report_page(
            State(state),
            Query(PeriodQuery {
                month: Some(13),
                year: Some(2025),
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::InvalidMonth(13)));
    }

    async fn parse_html(response: Response<Body>) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }
}
