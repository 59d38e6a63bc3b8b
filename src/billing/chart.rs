//! The revenue chart and the messages it exchanges with the server.
//!
//! The chart is an ECharts area chart on a time axis. The browser reports
//! zoom gestures (`datazoom`) and the toolbox reset (`restore`) to the view's
//! JSON endpoints, and applies the [ChartUpdate] each endpoint answers with:
//! it replaces the series, updates the heading and the "Back to Annual"
//! button, and then carries out the update's [SurfaceCommand], if any.

use charming::{
    Chart,
    component::{
        Axis, DataZoom, DataZoomType, Feature, Grid, Legend, Restore, Toolbox, ToolboxDataZoom,
    },
    element::{
        AreaStyle, AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::Line,
};
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

use crate::{
    Error,
    billing::{
        drilldown::{AggregationMode, RevenueDrilldown, SurfaceCommand},
        series::Series,
        views::ViewId,
    },
    endpoints::{self, format_endpoint},
    html::HeadElement,
};

/// The HTML element ID of the revenue chart.
pub(crate) const REVENUE_CHART_ID: &str = "revenue-chart";

const ANNUAL_HEADING: &str = "Annual Revenue Growth";
const DAILY_HEADING: &str = "Daily Revenue Breakdown";
const ANNUAL_HINT: &str = "Scroll or drag to zoom in";
const DAILY_HINT: &str = "Scroll back or reset to zoom out";

/// The month shown by the daily view, as sent to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedPeriod {
    /// The calendar year.
    pub year: i32,
    /// The month number, 1 for January.
    pub month: u8,
}

/// The state of a view after an operation, as sent to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    /// The active aggregation.
    pub mode: AggregationMode,
    /// The month shown by the daily view, `null` in the monthly view.
    pub period: Option<SelectedPeriod>,
    /// The series to plot.
    pub series: Series,
    /// What the chart should do with its visible window after plotting `series`.
    pub command: Option<SurfaceCommand>,
}

impl ChartUpdate {
    /// Capture the state of `drilldown` together with the command its last operation produced.
    pub fn new(drilldown: &RevenueDrilldown, command: Option<SurfaceCommand>) -> Self {
        Self {
            mode: drilldown.mode(),
            period: drilldown.selected_period().map(|period| SelectedPeriod {
                year: period.year,
                month: u8::from(period.month),
            }),
            series: Series::clone(&drilldown.series()),
            command,
        }
    }
}

/// The heading shown above the chart.
pub(crate) fn chart_heading(mode: AggregationMode) -> &'static str {
    match mode {
        AggregationMode::Monthly => ANNUAL_HEADING,
        AggregationMode::Daily => DAILY_HEADING,
    }
}

/// The hint shown below the chart.
pub(crate) fn zoom_hint(mode: AggregationMode) -> &'static str {
    match mode {
        AggregationMode::Monthly => ANNUAL_HINT,
        AggregationMode::Daily => DAILY_HINT,
    }
}

/// Configure the revenue chart for `series`.
pub(crate) fn revenue_chart(series: &Series) -> Chart {
    let data: Vec<Vec<f64>> = series
        .points
        .iter()
        .map(|point| vec![point.timestamp as f64, point.value])
        .collect();

    Chart::new()
        .legend(Legend::new().left("left").top(0))
        .tooltip(currency_tooltip())
        .toolbox(
            Toolbox::new().feature(
                Feature::new()
                    .data_zoom(ToolboxDataZoom::new().y_axis_index("none"))
                    .restore(Restore::new()),
            ),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(40)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Time))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .data_zoom(DataZoom::new().type_(DataZoomType::Inside))
        .series(
            Line::new()
                .name(series.label.as_str())
                .smooth(true)
                .area_style(AreaStyle::new())
                .data(data),
        )
}

/// Renders the chart card: heading, reset button, chart container and hint.
pub(crate) fn revenue_chart_view(update: &ChartUpdate) -> Markup {
    let is_daily = update.mode == AggregationMode::Daily;

    html!(
        section
            id="revenue"
            class="w-full bg-white dark:bg-gray-800 p-6 rounded-lg shadow
                border border-gray-200 dark:border-gray-700"
        {
            div class="flex justify-between items-center mb-4"
            {
                h3 id="revenue-heading" class="text-xl font-bold"
                {
                    (chart_heading(update.mode))
                }

                button
                    id="reset-zoom"
                    type="button"
                    hidden[!is_daily]
                    class="text-xs font-medium text-emerald-700 bg-emerald-50
                        px-3 py-1 rounded hover:bg-emerald-100"
                {
                    "← Back to Annual"
                }
            }

            div
                id=(REVENUE_CHART_ID)
                class="min-h-[320px] w-full rounded dark:bg-gray-100"
            {}

            p
                id="revenue-hint"
                class="text-xs text-gray-500 dark:text-gray-400 mt-2 text-center"
            {
                (zoom_hint(update.mode))
            }
        }
    )
}

/// Generates the script that draws the chart and wires it to view `view_id`.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if `update` cannot be serialized.
pub(crate) fn revenue_chart_script(
    view_id: ViewId,
    chart: &Chart,
    update: &ChartUpdate,
) -> Result<HeadElement, Error> {
    let initial_update = serde_json::to_string(update)
        .inspect_err(|error| tracing::error!("could not serialize chart update: {error}"))
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    let view_endpoint = format_endpoint(endpoints::BILLING_VIEW_API, view_id.as_u64() as i64);

    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
    const chartDom = document.getElementById("{chart_id}");
    const chart = echarts.init(chartDom);
    const option = {options};
    chart.setOption(option);

    const viewEndpoint = "{view_endpoint}";
    const headings = {{ monthly: "{annual_heading}", daily: "{daily_heading}" }};
    const hints = {{ monthly: "{annual_hint}", daily: "{daily_hint}" }};
    const heading = document.getElementById("revenue-heading");
    const hint = document.getElementById("revenue-hint");
    const resetButton = document.getElementById("reset-zoom");

    let mode = null;
    let applyingCommand = false;
    let zoomTimer = null;

    const setWindow = (action) => {{
        applyingCommand = true;
        try {{
            chart.dispatchAction(Object.assign({{ type: 'dataZoom' }}, action));
        }} finally {{
            applyingCommand = false;
        }}
    }};

    const applyUpdate = (update) => {{
        const modeChanged = update.mode !== mode;
        mode = update.mode;

        chart.setOption({{
            series: [{{
                name: update.series.label,
                data: update.series.points.map((point) => [point.timestamp, point.value]),
            }}],
        }});

        heading.textContent = headings[update.mode];
        hint.textContent = hints[update.mode];
        resetButton.hidden = update.mode !== 'daily';

        if (update.command && update.command.type === 'zoom_to') {{
            setWindow({{
                startValue: update.command.min_timestamp,
                endValue: update.command.max_timestamp,
            }});
        }} else if ((update.command && update.command.type === 'auto_fit') || modeChanged) {{
            setWindow({{ start: 0, end: 100 }});
        }}
    }};

    const post = (path, body) => {{
        const init = {{ method: 'POST' }};
        if (body !== undefined) {{
            init.headers = {{ 'Content-Type': 'application/json' }};
            init.body = JSON.stringify(body);
        }}

        return fetch(viewEndpoint + path, init)
            .then((response) => {{
                if (response.status === 404) {{
                    window.location.reload();
                    return null;
                }}
                if (!response.ok) {{
                    throw new Error('request to ' + path + ' failed with status ' + response.status);
                }}
                return response.json();
            }})
            .then((update) => {{
                if (update) {{
                    applyUpdate(update);
                }}
            }})
            .catch((error) => console.error(error));
    }};

    chart.on('datazoom', () => {{
        if (applyingCommand) {{
            return;
        }}

        clearTimeout(zoomTimer);
        zoomTimer = setTimeout(() => {{
            const zoom = chart.getOption().dataZoom[0];
            if (zoom.startValue === undefined || zoom.endValue === undefined) {{
                return;
            }}

            post('/zoom', {{
                min_timestamp: Math.round(zoom.startValue),
                max_timestamp: Math.round(zoom.endValue),
            }});
        }}, 200);
    }});
    chart.on('restore', () => post('/reset'));
    resetButton.addEventListener('click', () => post('/reset'));

    document.querySelectorAll('[data-focus-timestamp]').forEach((element) => {{
        element.addEventListener('click', () => {{
            post('/focus', {{ timestamp: Number(element.dataset.focusTimestamp) }});
        }});
    }});

    document.addEventListener('visibilitychange', () => {{
        if (document.visibilityState === 'visible') {{
            post('/refresh');
        }}
    }});
    window.addEventListener('pagehide', () => navigator.sendBeacon(viewEndpoint + '/close'));
    window.addEventListener('resize', chart.resize);

    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    const updateTheme = () => {{
        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
    }};
    darkModeMediaQuery.addEventListener('change', updateTheme);
    updateTheme();

    applyUpdate({initial_update});
}});"#,
        chart_id = REVENUE_CHART_ID,
        options = chart,
        annual_heading = ANNUAL_HEADING,
        daily_heading = DAILY_HEADING,
        annual_hint = ANNUAL_HINT,
        daily_hint = DAILY_HINT,
    );

    Ok(HeadElement::ScriptSource(PreEscaped(script)))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Line))
}
