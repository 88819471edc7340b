//! Backend-agnostic Plotters drawing for the five dashboard panels.
//!
//! The same functions draw into the terminal (via `plotters-ratatui-backend`)
//! and into SVG files. A [`Theme`] carries the differences between the two:
//! colors, font size, and whether captions, legends, mesh lines and circle
//! markers are drawn.

use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::app::pipeline::{DashboardReport, OverviewPanels, WindowPanels};
use crate::analysis::{BoxStats, Histogram};
use crate::domain::{DateRange, MonthlyAverage, Panel};

pub mod series;
pub mod svg;

use series::{category_label, date_label, day_number, month_label, value_bounds, value_label};

pub type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub foreground: RGBColor,
    pub background: Option<RGBColor>,
    pub actual: RGBColor,
    pub forecast: RGBColor,
    pub band: RGBColor,
    pub sales_hist: RGBColor,
    pub profit_hist: RGBColor,
    pub monthly: RGBColor,
    pub categories: [RGBColor; 4],
    pub font_size: u32,
    pub line_width: u32,
    pub label_area: (u32, u32),
    pub captions: bool,
    pub legend: bool,
    pub mesh: bool,
    /// Circle markers. Off in the terminal: the ratatui backend maps circle
    /// radii to canvas units and draws them far too large.
    pub markers: bool,
}

impl Theme {
    /// High-contrast palette for dark terminals.
    pub fn terminal() -> Self {
        Self {
            foreground: WHITE,
            background: None,
            actual: RGBColor(0, 255, 255),
            forecast: RGBColor(255, 165, 0),
            band: RGBColor(255, 165, 0),
            sales_hist: RGBColor(135, 206, 235),
            profit_hist: RGBColor(144, 238, 144),
            monthly: RGBColor(255, 127, 80),
            categories: [
                RGBColor(99, 110, 250),
                RGBColor(239, 85, 59),
                RGBColor(0, 204, 150),
                RGBColor(171, 99, 250),
            ],
            font_size: 10,
            line_width: 1,
            label_area: (6, 3),
            captions: false,
            legend: false,
            mesh: false,
            markers: false,
        }
    }

    /// Light page palette for SVG output.
    pub fn page() -> Self {
        Self {
            foreground: RGBColor(42, 63, 95),
            background: Some(WHITE),
            actual: BLUE,
            captions: true,
            legend: true,
            mesh: true,
            markers: true,
            font_size: 14,
            line_width: 2,
            label_area: (70, 50),
            ..Self::terminal()
        }
    }

    fn category_color(&self, idx: usize) -> RGBColor {
        self.categories[idx % self.categories.len()]
    }
}

/// Draw one panel of the report into `root`.
pub fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: Panel,
    report: &DashboardReport,
    theme: &Theme,
) -> DrawResult<DB> {
    if let Some(bg) = theme.background {
        root.fill(&bg)?;
    }
    match panel {
        Panel::ActualVsForecast => draw_actual_vs_forecast(root, &report.window, theme),
        Panel::SalesTrend => draw_sales_trend(root, &report.window, theme),
        Panel::Distributions => draw_distributions(root, &report.overview, theme),
        Panel::ProfitByCategory => draw_profit_by_category(root, &report.overview.profit_by_category, theme),
        Panel::MonthlyAverage => draw_monthly_average(root, &report.overview.monthly_average, theme),
    }
}

fn chart_builder<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    theme: &Theme,
    title: &str,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(if theme.captions { 10 } else { 1 })
        .set_label_area_size(LabelAreaPosition::Left, theme.label_area.0)
        .set_label_area_size(LabelAreaPosition::Bottom, theme.label_area.1);
    if theme.captions {
        builder.caption(
            title,
            ("sans-serif", theme.font_size + 4).into_font().color(&theme.foreground),
        );
    }
    builder
}

fn draw_mesh<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    theme: &Theme,
    axes: (&str, &str),
    x_labels: usize,
    fmt_x: &dyn Fn(&f64) -> String,
) -> DrawResult<DB> {
    let fg = theme.foreground;
    let mut mesh = chart.configure_mesh();
    if !theme.mesh {
        mesh.disable_x_mesh().disable_y_mesh();
    }
    mesh.x_desc(axes.0)
        .y_desc(axes.1)
        .x_labels(x_labels)
        .y_labels(5)
        .x_label_formatter(fmt_x)
        .y_label_formatter(&|v| value_label(*v))
        .label_style(("sans-serif", theme.font_size).into_font().color(&fg))
        .axis_style(&fg)
        .bold_line_style(&fg.mix(0.2))
        .light_line_style(&fg.mix(0.05))
        .draw()
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(chart: &mut Chart<'a, DB>, theme: &Theme) -> DrawResult<DB> {
    if !theme.legend {
        return Ok(());
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&theme.foreground)
        .label_font(("sans-serif", theme.font_size).into_font().color(&theme.foreground))
        .draw()
}

fn date_x_bounds(range: DateRange) -> (f64, f64) {
    let (x0, x1) = (day_number(range.start()), day_number(range.end()));
    if x1 > x0 { (x0, x1) } else { (x0 - 0.5, x1 + 0.5) }
}

fn date_points<T>(items: &[T], f: impl Fn(&T) -> (NaiveDate, f64)) -> Vec<(f64, f64)> {
    items
        .iter()
        .map(|item| {
            let (d, y) = f(item);
            (day_number(d), y)
        })
        .collect()
}

/// Panel 1: actual vs forecast with the shaded confidence band.
pub fn draw_actual_vs_forecast<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    window: &WindowPanels,
    theme: &Theme,
) -> DrawResult<DB> {
    let actual = date_points(&window.actual, |p| (p.date, p.sales));
    let forecast = date_points(&window.forecast, |p| (p.date, p.yhat));
    let band = date_points(&window.band, |&(d, y)| (d, y));

    let (x0, x1) = date_x_bounds(window.range);
    let (y0, y1) = value_bounds(actual.iter().chain(&forecast).chain(&band).map(|&(_, y)| y));

    let mut chart = chart_builder(root, theme, Panel::ActualVsForecast.title()).build_cartesian_2d(x0..x1, y0..y1)?;
    draw_mesh(&mut chart, theme, ("Date", "Sales"), 5, &|v| date_label(*v))?;

    if !band.is_empty() {
        let style = theme.band.mix(0.2).filled();
        chart
            .draw_series(std::iter::once(Polygon::new(band, style)))?
            .label("Confidence Interval")
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 16, y + 4)], style));
    }

    let actual_color = theme.actual;
    chart
        .draw_series(LineSeries::new(actual, actual_color.stroke_width(theme.line_width)))?
        .label("Actual Sales")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], actual_color.stroke_width(2)));

    let forecast_color = theme.forecast;
    chart
        .draw_series(LineSeries::new(forecast, forecast_color.stroke_width(theme.line_width)))?
        .label("Forecasted Sales")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], forecast_color.stroke_width(2)));

    draw_legend(&mut chart, theme)
}

/// Panel 2: actual-sales trend line.
pub fn draw_sales_trend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    window: &WindowPanels,
    theme: &Theme,
) -> DrawResult<DB> {
    let actual = date_points(&window.actual, |p| (p.date, p.sales));
    let (x0, x1) = date_x_bounds(window.range);
    let (y0, y1) = value_bounds(actual.iter().map(|&(_, y)| y));

    let mut chart = chart_builder(root, theme, "Daily Sales Trend").build_cartesian_2d(x0..x1, y0..y1)?;
    draw_mesh(&mut chart, theme, ("Date", "Sales"), 5, &|v| date_label(*v))?;
    chart.draw_series(LineSeries::new(actual, theme.actual.stroke_width(theme.line_width)))?;
    Ok(())
}

/// Panel 3: sales and profit histograms side by side.
pub fn draw_distributions<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    overview: &OverviewPanels,
    theme: &Theme,
) -> DrawResult<DB> {
    let halves = root.split_evenly((1, 2));
    draw_histogram(&halves[0], &overview.sales_histogram, "Sales Distribution", "Sales", theme.sales_hist, theme)?;
    draw_histogram(&halves[1], &overview.profit_histogram, "Profit Distribution", "Profit", theme.profit_hist, theme)
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    histogram: &Histogram,
    title: &str,
    x_desc: &str,
    color: RGBColor,
    theme: &Theme,
) -> DrawResult<DB> {
    let (x0, x1) = histogram.range().unwrap_or((0.0, 1.0));
    let y1 = (histogram.max_count().max(1) as f64) * 1.05;

    let mut chart = chart_builder(area, theme, title).build_cartesian_2d(x0..x1, 0.0..y1)?;
    draw_mesh(&mut chart, theme, (x_desc, "count"), 4, &|v| value_label(*v))?;
    chart.draw_series(histogram.bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], color.filled())
    }))?;
    Ok(())
}

/// Panel 4: profit box plot per category.
pub fn draw_profit_by_category<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    boxes: &[BoxStats],
    theme: &Theme,
) -> DrawResult<DB> {
    let names: Vec<&str> = boxes.iter().map(|b| b.category.as_str()).collect();
    let x1 = boxes.len().max(1) as f64 - 0.5;
    let (y0, y1) = value_bounds(boxes.iter().flat_map(|b| {
        [b.lower_whisker, b.upper_whisker]
            .into_iter()
            .chain(b.outliers.iter().copied())
    }));

    let mut chart =
        chart_builder(root, theme, "Profit Distribution by Category").build_cartesian_2d(-0.5..x1, y0..y1)?;
    draw_mesh(&mut chart, theme, ("Category", "Profit"), names.len().max(1), &|v| category_label(&names, *v))?;

    let half = 0.3;
    for (i, b) in boxes.iter().enumerate() {
        let x = i as f64;
        let color = theme.category_color(i);
        let stroke = color.stroke_width(theme.line_width);

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - half, b.q1), (x + half, b.q3)],
            color.mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new([(x - half, b.q1), (x + half, b.q3)], stroke)))?;
        chart.draw_series([
            PathElement::new(vec![(x - half, b.median), (x + half, b.median)], stroke),
            PathElement::new(vec![(x, b.q3), (x, b.upper_whisker)], stroke),
            PathElement::new(vec![(x, b.q1), (x, b.lower_whisker)], stroke),
            PathElement::new(vec![(x - half / 2.0, b.upper_whisker), (x + half / 2.0, b.upper_whisker)], stroke),
            PathElement::new(vec![(x - half / 2.0, b.lower_whisker), (x + half / 2.0, b.lower_whisker)], stroke),
        ])?;

        if theme.markers {
            chart.draw_series(b.outliers.iter().map(|&y| Circle::new((x, y), 2, color.filled())))?;
        } else {
            chart.draw_series(b.outliers.iter().map(|&y| Pixel::new((x, y), color)))?;
        }
    }
    Ok(())
}

/// Panel 5: monthly average sales as a line with markers.
pub fn draw_monthly_average<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    months: &[MonthlyAverage],
    theme: &Theme,
) -> DrawResult<DB> {
    let points: Vec<(f64, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (i as f64, m.mean_sales))
        .collect();
    let x1 = months.len().max(1) as f64 - 0.5;
    let (y0, y1) = value_bounds(points.iter().map(|&(_, y)| y));

    let mut chart = chart_builder(root, theme, "Average Sales per Month").build_cartesian_2d(-0.5..x1, y0..y1)?;
    let x_labels = months.len().clamp(1, 12);
    draw_mesh(&mut chart, theme, ("Month", "Sales"), x_labels, &|v| month_label(months, *v))?;

    let color = theme.monthly;
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(theme.line_width)))?;
    if theme.markers {
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
    } else {
        chart.draw_series(points.iter().map(|&p| Pixel::new(p, WHITE)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::tests::{sample_config, sample_datasets};
    use crate::app::pipeline::build_report;

    #[test]
    fn every_panel_renders_to_svg() {
        let report = build_report(&sample_datasets(), &sample_config(None, None)).unwrap();
        for panel in Panel::ALL {
            let mut buf = String::new();
            {
                let root = SVGBackend::with_string(&mut buf, (640, 360)).into_drawing_area();
                draw_panel(&root, panel, &report, &Theme::page()).unwrap();
                root.present().unwrap();
            }
            assert!(buf.contains("<svg"), "{panel:?}");
        }
    }

    #[test]
    fn empty_windows_still_render() {
        let datasets = sample_datasets();
        let report = build_report(&datasets, &sample_config(None, None)).unwrap();
        let gap = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        )
        .unwrap();
        let report = report.with_range(&datasets, gap).unwrap();
        assert!(report.window.actual.is_empty());

        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, (640, 360)).into_drawing_area();
            draw_panel(&root, Panel::ActualVsForecast, &report, &Theme::page()).unwrap();
            root.present().unwrap();
        }
        assert!(buf.contains("<svg"));
    }
}
