use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{
    Align2, Color32, FontId, Painter, Pos2, RichText, ScrollArea, Sense, Shape, Stroke, Ui, Vec2,
};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints, Points,
    Text,
};

use crate::color::CategoryColors;
use crate::data::stats::SalarySummary;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the KPI tiles and the four charts for the current selection.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, state.aggregates.summary.as_ref());
            ui.add_space(8.0);

            if state.aggregates.summary.is_none() {
                ui.add_space(24.0);
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.heading("No rows match the current filters.");
                    ui.weak("Select at least one value in every filter section.");
                });
                return;
            }

            ui.columns(2, |cols: &mut [Ui]| {
                section(&mut cols[0], "Mean Salary by Job Title", |ui| {
                    top_titles_chart(ui, &state.aggregates.top_titles);
                });
                section(&mut cols[1], "Salary Distribution by Seniority", |ui| {
                    experience_chart(ui, &state.aggregates.by_level, &state.level_colors);
                });
            });
            ui.add_space(8.0);
            ui.columns(2, |cols: &mut [Ui]| {
                section(&mut cols[0], "Remote Work Share", |ui| {
                    remote_pie(ui, &state.aggregates.remote_breakdown, &state.remote_colors);
                });
                section(&mut cols[1], "Mean Salary by Year", |ui| {
                    year_trend_chart(ui, &state.aggregates.by_year);
                });
            });
        });
}

/// A titled group box filling its column.
fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.strong(title);
        ui.add_space(4.0);
        add_contents(ui);
    });
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, summary: Option<&SalarySummary>) {
    ui.columns(4, |cols: &mut [Ui]| {
        kpi_tile(&mut cols[0], "Mean Salary (USD)", summary.map(|s| s.mean));
        kpi_tile(&mut cols[1], "Median Salary (USD)", summary.map(|s| s.median));
        kpi_tile(&mut cols[2], "Maximum Salary (USD)", summary.map(|s| s.max));
        kpi_tile(&mut cols[3], "Minimum Salary (USD)", summary.map(|s| s.min));
    });
}

fn kpi_tile(ui: &mut Ui, label: &str, value: Option<f64>) {
    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(label);
            let text = match value {
                Some(v) => format_usd(v),
                None => "n/a".to_string(),
            };
            ui.heading(RichText::new(text).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Top titles bar chart
// ---------------------------------------------------------------------------

/// Horizontal bars, best-paid title on top, with the title drawn inside
/// each bar.
fn top_titles_chart(ui: &mut Ui, top_titles: &[(String, f64)]) {
    let max_mean = top_titles
        .iter()
        .map(|(_, m)| *m)
        .fold(f64::NEG_INFINITY, f64::max);
    let n = top_titles.len();

    let bars: Vec<Bar> = top_titles
        .iter()
        .enumerate()
        .map(|(i, (title, mean))| {
            Bar::new((n - 1 - i) as f64, *mean)
                .name(title)
                .fill(Color32::LIGHT_BLUE)
                .width(0.6)
        })
        .collect();

    Plot::new("top_titles")
        .height(CHART_HEIGHT)
        .show_axes([true, false])
        .show_grid([true, false])
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(max_mean * 1.05)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
            for (i, (title, _)) in top_titles.iter().enumerate() {
                let y = (n - 1 - i) as f64;
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(max_mean * 0.02, y),
                        RichText::new(title.as_str())
                            .size(12.0)
                            .color(Color32::BLACK),
                    )
                    .anchor(Align2::LEFT_CENTER),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Experience level box plot
// ---------------------------------------------------------------------------

/// One box per experience level: quartile box, median line, whiskers at the
/// sample extremes.
fn experience_chart(
    ui: &mut Ui,
    by_level: &BTreeMap<String, Vec<f64>>,
    colors: &CategoryColors,
) {
    let mut box_plots = Vec::new();
    for (i, (level, samples)) in by_level.iter().enumerate() {
        let mut sorted = samples.clone();
        sorted.sort_by(f64::total_cmp);
        let (q1, median, q3) = quartiles(&sorted);
        let color = colors.color_for(level);

        let elem = BoxElem::new(
            i as f64,
            BoxSpread::new(sorted[0], q1, median, q3, sorted[sorted.len() - 1]),
        )
        .name(level)
        .fill(color.gamma_multiply(0.35))
        .stroke(Stroke::new(1.5, color))
        .box_width(0.5);

        box_plots.push(BoxPlot::new(vec![elem]).name(level));
    }

    Plot::new("experience_distribution")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .show_axes([false, true])
        .show_grid([false, true])
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for bp in box_plots {
                plot_ui.box_plot(bp);
            }
        });
}

// ---------------------------------------------------------------------------
// Remote work pie chart
// ---------------------------------------------------------------------------

/// Pie of the remote-work categories, drawn with painter primitives since
/// `egui_plot` has no pie chart.
fn remote_pie(ui: &mut Ui, breakdown: &[(String, usize)], colors: &CategoryColors) {
    let total: usize = breakdown.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(Vec2::splat(CHART_HEIGHT), Sense::hover());
        let rect = response.rect;
        let center = rect.center();
        let radius = rect.width().min(rect.height()) * 0.45;

        let mut from = -FRAC_PI_2;
        for (category, count) in breakdown {
            let sweep = TAU * (*count as f32 / total as f32);
            let color = colors.color_for(category);
            paint_sector(&painter, center, radius, from, from + sweep, color);

            // Percentage label, skipped for slivers it would not fit in.
            let pct = 100.0 * *count as f32 / total as f32;
            if pct >= 4.0 {
                let mid = from + sweep / 2.0;
                painter.text(
                    center + Vec2::angled(mid) * radius * 0.6,
                    Align2::CENTER_CENTER,
                    format!("{pct:.1}%"),
                    FontId::proportional(13.0),
                    Color32::WHITE,
                );
            }
            from += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            ui.add_space(24.0);
            for (category, count) in breakdown {
                let pct = 100.0 * *count as f64 / total as f64;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("■").color(colors.color_for(category)));
                    ui.label(format!("{category}% remote: {count} rows ({pct:.1}%)"));
                });
            }
        });
    });
}

/// Fill one pie sector with a fan of thin triangles. Each triangle starts a
/// hair before its neighbour ends so no background seam shows through,
/// clamped at the sector start to keep colours from bleeding across sectors.
fn paint_sector(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    from: f32,
    to: f32,
    color: Color32,
) {
    const MAX_WEDGE: f32 = 0.15;
    let span = to - from;
    let steps = (span / MAX_WEDGE).ceil().max(1.0) as usize;
    let step = span / steps as f32;

    for k in 0..steps {
        let a0 = (from + step * k as f32 - 0.01).max(from);
        let a1 = from + step * (k + 1) as f32;
        let points = vec![
            center,
            center + Vec2::angled(a0) * radius,
            center + Vec2::angled(a1) * radius,
        ];
        painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
    }
}

// ---------------------------------------------------------------------------
// Yearly trend line
// ---------------------------------------------------------------------------

fn year_trend_chart(ui: &mut Ui, by_year: &[(i32, f64)]) {
    let points: Vec<[f64; 2]> = by_year
        .iter()
        .map(|&(year, mean)| [year as f64, mean])
        .collect();

    Plot::new("year_trend")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Mean salary")
                    .color(Color32::LIGHT_GREEN)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(4.0)
                    .color(Color32::LIGHT_GREEN),
            );
        });
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a salary as a whole-dollar amount with thousands separators.
pub(crate) fn format_usd(value: f64) -> String {
    let rounded = value.round() as i64;
    let sign = if rounded < 0 { "-" } else { "" };
    let mut n = rounded.unsigned_abs();

    let mut groups = Vec::new();
    while n >= 1000 {
        groups.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    groups.push(n.to_string());
    groups.reverse();
    format!("{sign}${}", groups.join(","))
}

/// Linear-interpolation quantile of a sorted sample (the spreadsheet
/// convention), `p` in `[0, 1]`.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let h = p * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn quartiles(sorted: &[f64]) -> (f64, f64, f64) {
    (
        quantile_sorted(sorted, 0.25),
        quantile_sorted(sorted, 0.5),
        quantile_sorted(sorted, 0.75),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_dollars_with_separators() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(950.0), "$950");
        assert_eq!(format_usd(1_234.0), "$1,234");
        assert_eq!(format_usd(135_000.0), "$135,000");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000");
    }

    #[test]
    fn rounds_to_the_nearest_dollar() {
        assert_eq!(format_usd(1_234_567.89), "$1,234,568");
        assert_eq!(format_usd(999.5), "$1,000");
        assert_eq!(format_usd(-2_500.4), "-$2,500");
    }

    #[test]
    fn quartiles_interpolate_between_samples() {
        let (q1, median, q3) = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(q1, 1.75);
        assert_eq!(median, 2.5);
        assert_eq!(q3, 3.25);

        let (q1, median, q3) = quartiles(&[1.0, 2.0, 3.0]);
        assert_eq!(q1, 1.5);
        assert_eq!(median, 2.0);
        assert_eq!(q3, 2.5);
    }

    #[test]
    fn single_sample_collapses_the_box() {
        let (q1, median, q3) = quartiles(&[42.0]);
        assert_eq!((q1, median, q3), (42.0, 42.0, 42.0));
    }
}
