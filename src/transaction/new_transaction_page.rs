//! Renders the page for recording a new transaction.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{
    AppState, Error,
    category::suggested_categories,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, base,
        dollar_input_styles,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::TransactionKind,
};

/// The state needed for the new transaction page.
#[derive(Debug, Clone)]
pub struct NewTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording a transaction.
pub async fn get_new_transaction_page(State(state): State<NewTransactionPageState>) -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW);

    let today = match local_today(&state.local_timezone) {
        Some(date) => date,
        None => return Error::InvalidTimezone(state.local_timezone).into_response(),
    };

    new_transaction_view(nav_bar, today).into_response()
}

/// Renders the add-transaction form.
///
/// The form offers one category select per transaction kind; the select for
/// the unselected kind is hidden and disabled so only the active one is
/// submitted.
fn new_transaction_view(nav_bar: NavBar, today: Date) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-2xl font-bold py-4" { "Add New Transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target="#form-result"
                hx-target-error="#form-result"
                hx-swap="innerHTML"
                class="w-full space-y-4"
            {
                fieldset
                {
                    legend class=(FORM_LABEL_STYLE) { "Transaction Kind" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for kind in [TransactionKind::Expense, TransactionKind::Income] {
                            div class="flex flex-1 items-center"
                            {
                                input
                                    type="radio"
                                    name="kind"
                                    id={"kind-" (kind)}
                                    value=(kind)
                                    class=(FORM_RADIO_INPUT_STYLE)
                                    checked[kind == TransactionKind::Expense]
                                    required;

                                label
                                    for={"kind-" (kind)}
                                    class=(FORM_RADIO_LABEL_STYLE)
                                {
                                    (kind.label())
                                }
                            }
                        }
                    }
                }

                @for kind in [TransactionKind::Expense, TransactionKind::Income] {
                    div
                        id={"category-group-" (kind)}
                        hidden[kind != TransactionKind::Expense]
                    {
                        label
                            for={"category-" (kind)}
                            class=(FORM_LABEL_STYLE)
                        {
                            "Category"
                        }

                        select
                            name="category"
                            id={"category-" (kind)}
                            class=(FORM_TEXT_INPUT_STYLE)
                            disabled[kind != TransactionKind::Expense]
                        {
                            @for category in suggested_categories(kind) {
                                option value=(category) { (category) }
                            }
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            type="number"
                            name="amount"
                            id="amount"
                            class=(FORM_TEXT_INPUT_STYLE)
                            min="0.01"
                            step="0.01"
                            required;
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        type="date"
                        name="date"
                        id="date"
                        class=(FORM_TEXT_INPUT_STYLE)
                        value=(today)
                        required;
                }

                div
                {
                    label for="note" class=(FORM_LABEL_STYLE) { "Note (optional)" }

                    input
                        type="text"
                        name="note"
                        id="note"
                        class=(FORM_TEXT_INPUT_STYLE)
                        placeholder="e.g. weekly groceries";
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }

                div id="form-result" {}
            }
        }
    );

    let head_elements = [dollar_input_styles(), category_toggle_script()];

    base("New Transaction", &head_elements, &content)
}

/// JavaScript that swaps the category select to match the chosen kind.
fn category_toggle_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(
        r#"document.addEventListener('DOMContentLoaded', function() {
            const radios = document.querySelectorAll('input[name="kind"]');
            const update = () => {
                const kind = document.querySelector('input[name="kind"]:checked').value;
                for (const radio of radios) {
                    const group = document.getElementById('category-group-' + radio.value);
                    const select = document.getElementById('category-' + radio.value);
                    const active = radio.value === kind;
                    group.hidden = !active;
                    select.disabled = !active;
                }
            };
            radios.forEach((radio) => radio.addEventListener('change', update));
            update();
        });"#
            .to_owned(),
    ))
}

#[cfg(test)]
mod view_tests {
    use axum::{body::Body, extract::State, http::StatusCode, response::Response};
    use scraper::{ElementRef, Html};
    use time::OffsetDateTime;

    use crate::{
        category::{EXPENSE_CATEGORIES, INCOME_CATEGORIES},
        endpoints,
        transaction::{
            get_new_transaction_page, new_transaction_page::NewTransactionPageState,
        },
    };

    #[tokio::test]
    async fn new_transaction_returns_form() {
        let state = NewTransactionPageState {
            local_timezone: "Etc/UTC".to_owned(),
        };
        let response = get_new_transaction_page(State(state)).await;

        assert_status_ok(&response);
        assert_html_content_type(&response);
        let document = parse_html(response).await;
        assert_valid_html(&document);
        assert_correct_form(&document);
    }

    #[tokio::test]
    async fn invalid_timezone_returns_error_page() {
        let state = NewTransactionPageState {
            local_timezone: "Mars/Olympus_Mons".to_owned(),
        };
        let response = get_new_transaction_page(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[track_caller]
    fn assert_status_ok(response: &Response<Body>) {
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[track_caller]
    fn assert_html_content_type(response: &Response<Body>) {
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/html; charset=utf-8"
        );
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
    fn assert_correct_form(document: &Html) {
        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());

        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::TRANSACTIONS_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::TRANSACTIONS_API,
            hx_post
        );

        assert_kind_radios(form);
        assert_category_selects(form);
        assert_correct_inputs(form);
        assert_has_submit_button(form);
    }

    #[track_caller]
    fn assert_kind_radios(form: &ElementRef) {
        let radio_selector = scraper::Selector::parse("input[type=radio][name=kind]").unwrap();
        let radios = form.select(&radio_selector).collect::<Vec<_>>();
        assert_eq!(radios.len(), 2, "want 2 kind radios, got {}", radios.len());

        let values: Vec<_> = radios
            .iter()
            .map(|radio| radio.value().attr("value").unwrap())
            .collect();
        assert_eq!(values, vec!["expense", "income"]);

        // The expense kind is preselected, matching the hidden income select.
        assert!(radios[0].value().attr("checked").is_some());
    }

    #[track_caller]
    fn assert_category_selects(form: &ElementRef) {
        let select_selector = scraper::Selector::parse("select[name=category]").unwrap();
        let selects = form.select(&select_selector).collect::<Vec<_>>();
        assert_eq!(
            selects.len(),
            2,
            "want one category select per kind, got {}",
            selects.len()
        );

        let option_selector = scraper::Selector::parse("option").unwrap();
        let expense_options: Vec<_> = selects[0]
            .select(&option_selector)
            .map(|option| option.value().attr("value").unwrap())
            .collect();
        assert_eq!(expense_options, EXPENSE_CATEGORIES);

        let income_options: Vec<_> = selects[1]
            .select(&option_selector)
            .map(|option| option.value().attr("value").unwrap())
            .collect();
        assert_eq!(income_options, INCOME_CATEGORIES);

        // Only the select for the active kind may be submitted.
        assert!(selects[0].value().attr("disabled").is_none());
        assert!(selects[1].value().attr("disabled").is_some());
    }

    #[track_caller]
    fn assert_correct_inputs(form: &ElementRef) {
        let expected_input_types = vec![("amount", "number"), ("date", "date"), ("note", "text")];

        for (name, element_type) in expected_input_types {
            let selector_string = format!("input[type={element_type}]");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(
                inputs.len(),
                1,
                "want 1 {element_type} input, got {}",
                inputs.len()
            );

            let input = inputs.first().unwrap();

            let input_name = input.value().attr("name");
            assert_eq!(
                input_name,
                Some(name),
                "want {element_type} with name=\"{name}\", got {input_name:?}"
            );

            match input_name {
                Some("amount") => {
                    assert_required(input);
                    assert_amount_min_and_step(input);
                }
                Some("date") => {
                    assert_required(input);
                    assert_value(input, &OffsetDateTime::now_utc().date().to_string());
                }
                _ => {}
            }
        }
    }

    #[track_caller]
    fn assert_value(input: &ElementRef, expected_value: &str) {
        let value = input.value().attr("value");
        assert_eq!(
            value,
            Some(expected_value),
            "want input with value=\"{expected_value}\", got {value:?}"
        );
    }

    #[track_caller]
    fn assert_required(input: &ElementRef) {
        let required = input.value().attr("required");
        let input_name = input.value().attr("name").unwrap();
        assert!(
            required.is_some(),
            "want {input_name} input to be required, got {required:?}"
        );
    }

    #[track_caller]
    fn assert_amount_min_and_step(input: &ElementRef) {
        let min_value = input
            .value()
            .attr("min")
            .expect("amount input should have the attribute 'min'");
        let min_value: f64 = min_value
            .parse()
            .expect("the attribute 'min' for the amount input should be a float");
        assert_eq!(
            0.01, min_value,
            "the amount for a new transaction should be limited to a minimum of 0.01, but got {min_value}"
        );

        let step = input
            .value()
            .attr("step")
            .expect("amount input should have the attribute 'step'");
        let step: f64 = step
            .parse()
            .expect("the attribute 'step' for the amount input should be a float");
        assert_eq!(
            0.01, step,
            "the amount for a new transaction should increment in steps of 0.01, but got {step}"
        );
    }

    #[track_caller]
    fn assert_has_submit_button(form: &ElementRef) {
        let button_selector = scraper::Selector::parse("button").unwrap();
        let buttons = form.select(&button_selector).collect::<Vec<_>>();
        assert_eq!(buttons.len(), 1, "want 1 button, got {}", buttons.len());
        let button_type = buttons.first().unwrap().value().attr("type");
        assert_eq!(
            button_type,
            Some("submit"),
            "want button with type=\"submit\", got {button_type:?}"
        );
    }

    async fn parse_html(response: Response) -> Html {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Could not get response body");
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }
}
