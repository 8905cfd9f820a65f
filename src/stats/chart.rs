//! The income and expense history chart.
//!
//! The chart is generated as an ECharts configuration and initialised by a
//! small script in the page head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::bar::Bar,
};
use maud::{Markup, PreEscaped, html};
use time::{Date, Month};

use crate::{
    html::HeadElement,
    stats::core::{HistoryStats, Timeframe},
};

/// The id of the element the chart is drawn in.
pub(super) const HISTORY_CHART_ID: &str = "history-chart";

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn days_in_month(year: i32, month: Month) -> u8 {
    (28..=31)
        .rev()
        .find(|day| Date::from_calendar_date(year, month, *day).is_ok())
        .unwrap_or(28)
}

/// The x-axis labels and the income and expense series, with zeros for
/// periods the backend left out.
pub(super) fn history_series(
    history: &[HistoryStats],
    timeframe: Timeframe,
    year: i32,
    month: Month,
) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let labels: Vec<String> = match timeframe {
        Timeframe::Year => MONTH_LABELS.iter().map(|label| (*label).to_owned()).collect(),
        Timeframe::Month => (1..=days_in_month(year, month))
            .map(|day| day.to_string())
            .collect(),
    };

    let mut income = vec![0.0; labels.len()];
    let mut expense = vec![0.0; labels.len()];

    for stats in history {
        let index = match timeframe {
            // Months and days in the summary both start from 1.
            Timeframe::Year => usize::from(stats.month).checked_sub(1),
            Timeframe::Month => stats.day.and_then(|day| usize::from(day).checked_sub(1)),
        };
        let Some(index) = index else {
            continue;
        };

        if let (Some(income_total), Some(expense_total)) =
            (income.get_mut(index), expense.get_mut(index))
        {
            *income_total += stats.income;
            *expense_total += stats.expense;
        }
    }

    (labels, income, expense)
}

pub(super) fn history_chart(
    history: &[HistoryStats],
    timeframe: Timeframe,
    year: i32,
    month: Month,
) -> Chart {
    let (labels, income, expense) = history_series(history, timeframe, year, month);
    let subtitle = match timeframe {
        Timeframe::Year => year.to_string(),
        Timeframe::Month => format!("{month} {year}"),
    };

    Chart::new()
        .title(Title::new().text("History").subtext(subtitle))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().left("center").top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expense").data(expense))
}

pub(super) fn chart_container() -> Markup {
    html! {
        div id=(HISTORY_CHART_ID) class="min-h-[380px] w-full rounded dark:bg-gray-100" {}
    }
}

/// The script that draws `chart` once the page has loaded, following the
/// browser's dark mode setting.
pub(super) fn chart_script(chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{HISTORY_CHART_ID}");
            const chart = echarts.init(chartDom);
            chart.setOption({chart});

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

#[cfg(test)]
mod tests {
    use time::Month;

    use crate::stats::core::{HistoryStats, Timeframe};

    use super::{history_chart, history_series};

    fn stats(month: u8, day: Option<u8>, income: f64, expense: f64) -> HistoryStats {
        HistoryStats {
            income,
            expense,
            year: 2024,
            month,
            day,
        }
    }

    #[test]
    fn year_series_places_months_from_january() {
        let history: Vec<_> = (1..=12)
            .map(|month| stats(month, None, f64::from(month), 0.5))
            .collect();

        let (labels, income, expense) =
            history_series(&history, Timeframe::Year, 2024, Month::January);

        assert_eq!(labels.len(), 12);
        assert_eq!(labels[0], "Jan");
        assert_eq!(income[0], 1.0);
        assert_eq!(labels[11], "Dec");
        assert_eq!(income[11], 12.0);
        assert_eq!(expense, vec![0.5; 12]);
    }

    #[test]
    fn year_series_skips_out_of_range_months() {
        let history = [stats(0, None, 10.0, 5.0), stats(13, None, 1.0, 2.0)];

        let (_, income, expense) = history_series(&history, Timeframe::Year, 2024, Month::January);

        assert_eq!(income, vec![0.0; 12]);
        assert_eq!(expense, vec![0.0; 12]);
    }

    #[test]
    fn month_series_has_a_bar_per_day() {
        let history = [stats(1, Some(29), 3.0, 4.0)];

        let (labels, income, _) = history_series(&history, Timeframe::Month, 2024, Month::February);

        assert_eq!(labels.len(), 29);
        assert_eq!(income[28], 3.0);
    }

    #[test]
    fn chart_has_income_and_expense_series() {
        let options = history_chart(&[], Timeframe::Year, 2024, Month::January).to_string();

        assert!(options.contains("\"Income\""));
        assert!(options.contains("\"Expense\""));
    }
}
