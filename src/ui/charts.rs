use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, TextStyle, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, MarkerShape, Plot,
    PlotPoint, PlotPoints, Points, Polygon, Text,
};

use agri_climate_dash::color::{self, ColorMap, DARK_GREEN};
use agri_climate_dash::data::views::DerivedViews;
use agri_climate_dash::presentation::{ChartKind, ChartSpec};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart frame: title, notice, sized plot
// ---------------------------------------------------------------------------

/// Render one dashboard chart (title, optional notice, plot).
pub fn chart(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(&spec.title).size(spec.title_size).strong());
    });
    if let Some(notice) = &spec.notice {
        ui.label(RichText::new(notice).size(spec.font_size + 1.0).italics().weak());
    }

    ui.scope(|ui: &mut Ui| {
        let style = ui.style_mut();
        for (text_style, font) in style.text_styles.iter_mut() {
            match text_style {
                TextStyle::Small => font.size = spec.font_size,
                TextStyle::Body => font.size = spec.font_size + 2.0,
                _ => {}
            }
        }

        match spec.kind {
            ChartKind::YieldTrend => yield_trend(ui, spec, views),
            ChartKind::ClimateTrend => climate_trend(ui, spec, views, &state.metric_colors),
            ChartKind::CorrelationHeatmap => correlation_heatmap(ui, spec, views),
            ChartKind::ProvinceComparison => province_bars(ui, spec, views),
            ChartKind::TempYieldScatter => temp_yield_scatter(ui, spec, views),
            ChartKind::YieldDistribution => {
                yield_boxes(ui, spec, views, &state.province_colors)
            }
        }
    });
}

fn base_plot(spec: &ChartSpec) -> Plot {
    let plot = Plot::new(spec.kind.id())
        .height(spec.height)
        .x_axis_label(spec.x_label.clone())
        .y_axis_label(spec.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    if spec.show_legend {
        plot.legend(Legend::default())
    } else {
        plot
    }
}

/// Tick formatter showing `labels[i]` at integer position `i`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

fn finite_points(points: impl Iterator<Item = [f64; 2]>) -> Vec<[f64; 2]> {
    points.filter(|[x, y]| x.is_finite() && y.is_finite()).collect()
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn yield_trend(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews) {
    let pts = finite_points(
        views
            .yield_history
            .iter()
            .map(|p| [p.year as f64, p.value]),
    );
    base_plot(spec).show(ui, |plot_ui| {
        plot_ui.line(
            Line::new(PlotPoints::from(pts.clone()))
                .color(DARK_GREEN)
                .width(3.0)
                .name(&spec.y_label),
        );
        plot_ui.points(
            Points::new(PlotPoints::from(pts))
                .color(DARK_GREEN)
                .radius(3.5)
                .shape(MarkerShape::Circle)
                .filled(true),
        );
    });
}

fn climate_trend(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews, colors: &ColorMap) {
    base_plot(spec).show(ui, |plot_ui| {
        for (series, label) in views.climate_history.iter().zip(&spec.series_labels) {
            let pts = finite_points(series.points.iter().map(|p| [p.year as f64, p.value]));
            plot_ui.line(
                Line::new(PlotPoints::from(pts))
                    .color(colors.color_for(series.metric.column_name()))
                    .width(2.0)
                    .name(label),
            );
        }
    });
}

fn correlation_heatmap(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews) {
    let matrix = &views.correlation_matrix;
    let n = matrix.metrics.len();
    let labels = spec.series_labels.clone();
    // Rows are drawn top-down, so y ticks read the labels reversed.
    let y_labels: Vec<String> = labels.iter().rev().cloned().collect();

    base_plot(spec)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(category_formatter(labels))
        .y_axis_formatter(category_formatter(y_labels))
        .include_x(-0.5)
        .include_x(n as f64 - 0.5)
        .include_y(-0.5)
        .include_y(n as f64 - 0.5)
        .show(ui, |plot_ui| {
            for (i, row) in matrix.cells.iter().enumerate() {
                let y = (n - 1 - i) as f64;
                for (j, cell) in row.iter().enumerate() {
                    let x = j as f64;
                    // Undefined cells stay empty so they read as gaps.
                    let Some(r) = cell.value() else {
                        continue;
                    };
                    let fill = color::scale_color(spec.color_scale, r, -1.0, 1.0);
                    let square = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(square))
                            .fill_color(fill)
                            .stroke(Stroke::new(0.5, Color32::WHITE)),
                    );
                    let text_color = if r.abs() > 0.5 {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), format!("{r:.2}")).color(text_color),
                    );
                }
            }
        });
}

fn province_bars(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews) {
    let finite: Vec<f64> = views
        .province_comparison
        .iter()
        .map(|p| p.yield_)
        .filter(|v| v.is_finite())
        .collect();
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bars: Vec<Bar> = views
        .province_comparison
        .iter()
        .enumerate()
        .filter(|(_, p)| p.yield_.is_finite())
        .map(|(i, p)| {
            Bar::new(i as f64, p.yield_)
                .width(0.7)
                .fill(color::scale_color(spec.color_scale, p.yield_, min, max))
                .name(&p.province)
        })
        .collect();

    base_plot(spec)
        .x_axis_formatter(category_formatter(spec.series_labels.clone()))
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&spec.y_label));
        });
}

fn temp_yield_scatter(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews) {
    let scatter = &views.temp_yield_scatter;
    let max_precip = scatter
        .points
        .iter()
        .map(|p| p.precipitation)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let size_label = spec.series_labels.first().cloned().unwrap_or_default();

    let temps: Vec<f64> = scatter
        .points
        .iter()
        .filter(|p| p.temperature.is_finite() && p.yield_.is_finite())
        .map(|p| p.temperature)
        .collect();
    let x_min = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    base_plot(spec).show(ui, |plot_ui| {
        for p in &scatter.points {
            if !(p.temperature.is_finite() && p.yield_.is_finite()) {
                continue;
            }
            let radius = if max_precip > 0.0 && p.precipitation.is_finite() {
                3.0 + 9.0 * (p.precipitation / max_precip) as f32
            } else {
                3.0
            };
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[p.temperature, p.yield_]]))
                    .radius(radius)
                    .color(Color32::from_rgb(99, 110, 250))
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .name(&size_label),
            );
        }

        if spec.show_trendline {
            if let (Some(y0), Some(y1)) = (
                scatter.trendline.predict(x_min),
                scatter.trendline.predict(x_max),
            ) {
                plot_ui.line(
                    Line::new(PlotPoints::from(vec![[x_min, y0], [x_max, y1]]))
                        .color(Color32::from_rgb(239, 85, 59))
                        .width(2.0)
                        .name("OLS trendline"),
                );
            }
        }
    });
}

fn yield_boxes(ui: &mut Ui, spec: &ChartSpec, views: &DerivedViews, colors: &ColorMap) {
    base_plot(spec)
        .x_axis_formatter(category_formatter(spec.series_labels.clone()))
        .show(ui, |plot_ui| {
            for (i, group) in views.yield_distribution.iter().enumerate() {
                let Some(summary) = &group.summary else {
                    continue;
                };
                let color = colors.color_for(&group.province);
                let x = i as f64;
                let elem = BoxElem::new(
                    x,
                    BoxSpread::new(
                        summary.lower_whisker,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.upper_whisker,
                    ),
                )
                .box_width(0.6)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color))
                .name(&group.province);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&group.province));

                if !summary.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> =
                        summary.outliers.iter().map(|&v| [x, v]).collect();
                    plot_ui.points(
                        Points::new(PlotPoints::from(outliers))
                            .color(color)
                            .radius(2.5)
                            .name(&group.province),
                    );
                }
            }
        });
}
