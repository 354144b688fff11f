//! The charts page: pie and bar visualizations for one period.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    period::{Period, PeriodQuery},
    report::{
        aggregation::{category_totals, total},
        charts::{
            ChartPanel, charts_script, charts_view, expense_breakdown_chart,
            income_vs_expenses_chart,
        },
        picker::period_picker,
        query::transactions_for_period,
    },
    timezone::local_today,
    transaction::{Transaction, TransactionKind},
};

/// The state needed for the charts page.
#[derive(Debug, Clone)]
pub struct ChartsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the pie and bar charts for the requested period.
///
/// Without a query string the charts default to the month in progress.
pub async fn get_charts_page(
    State(state): State<ChartsPageState>,
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

    let nav_bar = NavBar::new(endpoints::CHARTS_VIEW);

    Ok(charts_page_view(nav_bar, period, &expenses, &incomes).into_response())
}

/// Renders the charts page.
///
/// Charts without data to show are replaced by an informational notice so a
/// quiet month never renders an empty canvas.
fn charts_page_view(
    nav_bar: NavBar,
    period: Period,
    expenses: &[Transaction],
    incomes: &[Transaction],
) -> Markup {
    let nav_bar = nav_bar.into_html();

    let mut panels: Vec<ChartPanel> = Vec::new();
    let mut notices: Vec<&str> = Vec::new();

    if expenses.is_empty() {
        notices.push("No expense data for the selected period.");
    } else {
        let totals = category_totals(expenses);
        panels.push(ChartPanel {
            id: "expense-breakdown-chart",
            options: expense_breakdown_chart(&totals, period).to_string(),
        });
    }

    if expenses.is_empty() && incomes.is_empty() {
        notices.push("Not enough data to compare income and expenses.");
    } else {
        panels.push(ChartPanel {
            id: "income-vs-expenses-chart",
            options: income_vs_expenses_chart(total(incomes), total(expenses), period)
                .to_string(),
        });
    }

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-2xl font-bold py-4" { "Charts" }

            (period_picker(endpoints::CHARTS_VIEW, period))

            (charts_view(&panels))

            @for notice in &notices {
                div
                    class="w-full max-w-screen-lg p-4 mb-4 text-sm text-blue-800
                        rounded-lg bg-blue-50 dark:bg-gray-800 dark:text-blue-400"
                    role="status"
                {
                    (notice)
                }
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&panels),
    ];

    base("Charts", &scripts, &content)
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

    use super::{ChartsPageState, get_charts_page};
    use crate::{
        category::CategoryName,
        db::initialize,
        period::PeriodQuery,
        transaction::{Transaction, TransactionKind, create_transaction},
    };

    fn get_test_state() -> ChartsPageState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ChartsPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn seed_march_2025(state: &ChartsPageState) {
        let connection = state.db_connection.lock().unwrap();

        for (category, amount) in [("Food", 20.0), ("Fuel", 15.5)] {
            create_transaction(
                Transaction::build(
                    TransactionKind::Expense,
                    CategoryName::new(category).unwrap(),
                    amount,
                    date!(2025 - 03 - 05),
                ),
                &connection,
            )
            .unwrap();
        }

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
    async fn charts_page_renders_both_charts() {
        let state = get_test_state();
        seed_march_2025(&state);

        let response = get_charts_page(State(state), march_2025()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html(response).await;
        assert_valid_html(&html);

        assert_chart_exists(&html, "expense-breakdown-chart");
        assert_chart_exists(&html, "income-vs-expenses-chart");

        // The pie options embed the per-category sums.
        let text = html.html();
        assert!(text.contains("Food"), "pie data missing: {text}");
        assert!(text.contains("Fuel"), "pie data missing: {text}");
    }

    #[tokio::test]
    async fn quiet_period_shows_notices_instead_of_charts() {
        let state = get_test_state();
        seed_march_2025(&state);

        let response = get_charts_page(
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

        assert_no_chart(&html, "expense-breakdown-chart");
        assert_no_chart(&html, "income-vs-expenses-chart");

        let text = html.html();
        assert!(text.contains("No expense data for the selected period."));
        assert!(text.contains("Not enough data to compare income and expenses."));
    }

    #[tokio::test]
    async fn income_only_period_still_renders_bar_chart() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
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

        let response = get_charts_page(State(state), march_2025()).await.unwrap();
        let html = parse_html(response).await;

        assert_no_chart(&html, "expense-breakdown-chart");
        assert_chart_exists(&html, "income-vs-expenses-chart");

        let text = html.html();
        assert!(text.contains("No expense data for the selected period."));
        assert!(!text.contains("Not enough data to compare income and expenses."));
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

    #[track_caller]
    fn assert_chart_exists(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_some(),
            "Chart with id '{}' not found",
            chart_id
        );
    }

    #[track_caller]
    fn assert_no_chart(html: &Html, chart_id: &str) {
        let selector = Selector::parse(&format!("#{}", chart_id)).unwrap();
        assert!(
            html.select(&selector).next().is_none(),
            "Chart with id '{}' should not be rendered",
            chart_id
        );
    }
}
