//! The month/year picker form shared by the report and chart pages.

use std::ops::RangeInclusive;

use maud::{Markup, html};
use time::Month;

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    period::Period,
};

/// The years offered by the picker.
const YEARS: RangeInclusive<i32> = 2024..=2030;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Renders a GET form that selects the period shown by `action`.
///
/// The currently shown `period` is preselected. Submitting navigates to
/// `action?month=M&year=Y`.
pub(super) fn period_picker(action: &str, period: Period) -> Markup {
    html!(
        form
            method="get"
            action=(action)
            class="flex flex-wrap items-end gap-4 w-full max-w-md mb-6"
        {
            div class="flex-1"
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select name="month" id="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for month in MONTHS {
                        option
                            value=(u8::from(month))
                            selected[month == period.month]
                        {
                            (month)
                        }
                    }
                }
            }

            div class="flex-1"
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                select name="year" id="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in YEARS {
                        option value=(year) selected[year == period.year] { (year) }
                    }
                }
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "View"
            }
        }
    )
}

#[cfg(test)]
mod picker_tests {
    use scraper::{Html, Selector};

    use super::period_picker;
    use crate::period::Period;

    #[test]
    fn picker_offers_all_months_and_preselects_period() {
        let period = Period::new(3, 2025).unwrap();

        let html = Html::parse_fragment(&period_picker("/report", period).into_string());

        let month_options = Selector::parse("select[name=month] option").unwrap();
        let options: Vec<_> = html.select(&month_options).collect();
        assert_eq!(options.len(), 12);

        let selected: Vec<_> = options
            .iter()
            .filter(|option| option.value().attr("selected").is_some())
            .collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value().attr("value"), Some("3"));

        let year_options = Selector::parse("select[name=year] option[selected]").unwrap();
        let selected_years: Vec<_> = html.select(&year_options).collect();
        assert_eq!(selected_years.len(), 1);
        assert_eq!(selected_years[0].value().attr("value"), Some("2025"));
    }

    #[test]
    fn picker_submits_to_the_given_action() {
        let period = Period::new(3, 2025).unwrap();

        let html = Html::parse_fragment(&period_picker("/charts", period).into_string());

        let form_selector = Selector::parse("form").unwrap();
        let form = html.select(&form_selector).next().unwrap();
        assert_eq!(form.value().attr("action"), Some("/charts"));
        assert_eq!(form.value().attr("method"), Some("get"));
    }
}
