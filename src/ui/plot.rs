use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};
use network_dashboard::{ChartKind, ChartSet, ChartSpec, Template};

use crate::color::ColorMap;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart grid (central panel)
// ---------------------------------------------------------------------------

/// Render the four charts two per row: bar + pie, then line + donut.
pub fn chart_grid(ui: &mut Ui, charts: &ChartSet) {
    for pair in [[ChartKind::Bar, ChartKind::Pie], [ChartKind::Line, ChartKind::Donut]] {
        ui.columns(2, |cols| {
            for (ui, kind) in cols.iter_mut().zip(pair) {
                chart(ui, charts.get(kind));
            }
        });
        ui.add_space(8.0);
    }
}

fn chart(ui: &mut Ui, spec: &ChartSpec) {
    ui.label(RichText::new(&spec.title).strong());
    let colors = ColorMap::new(&spec.labels);
    match spec.kind {
        ChartKind::Bar => bar_chart(ui, spec, &colors),
        ChartKind::Line => line_chart(ui, spec),
        ChartKind::Pie | ChartKind::Donut => pie_chart(ui, spec, &colors),
    }
}

fn bar_chart(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap) {
    let bars: Vec<Bar> = spec
        .labels
        .iter()
        .zip(&spec.values)
        .enumerate()
        .map(|(i, (label, &value))| {
            Bar::new(i as f64, value)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.7)
        })
        .collect();

    Plot::new("bar_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.group_by.header())
        .y_axis_label("Total_AP")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total_AP"));
        });
}

fn line_chart(ui: &mut Ui, spec: &ChartSpec) {
    let points: PlotPoints = spec
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| [i as f64, v])
        .collect();

    Plot::new("line_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(spec.group_by.header())
        .y_axis_label("Total_AP")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name("Total_AP")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Pie / donut (egui_plot has no pie, so paint the slices directly)
// ---------------------------------------------------------------------------

fn pie_chart(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap) {
    let background = match spec.template {
        Template::Light => Color32::WHITE,
        Template::Dark => Color32::from_rgb(17, 17, 17),
    };
    let total: f64 = spec.values.iter().map(|&v| v.max(0.0)).sum();

    let size = Vec2::new(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 4.0, background);

    if total <= 0.0 {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "no data",
            egui::FontId::default(),
            Color32::GRAY,
        );
        return;
    }

    let radius = rect.height().min(rect.width()) * 0.45;
    let center = rect.center();
    let mut start = -TAU / 4.0;
    for (label, &value) in spec.labels.iter().zip(&spec.values) {
        let sweep = (value.max(0.0) / total) as f32 * TAU;
        wedge(&painter, center, radius, start, sweep, colors.color_for(label));
        start += sweep;
    }

    if let Some(hole) = spec.hole {
        painter.circle_filled(center, radius * hole as f32, background);
    }

    // Hover tooltip: which slice is under the pointer.
    if let Some(pos) = response.hover_pos() {
        if let Some(label) = slice_at(spec, total, center, radius, pos) {
            response.on_hover_text(label);
        }
    }

    legend(ui, spec, colors);
}

/// Fill a circular sector as a fan of thin triangles (each one convex).
fn wedge(painter: &egui::Painter, center: Pos2, radius: f32, start: f32, sweep: f32, color: Color32) {
    let steps = ((sweep / 0.05).ceil() as usize).max(1);
    let point = |angle: f32| center + Vec2::angled(angle) * radius;
    for i in 0..steps {
        let a0 = start + sweep * i as f32 / steps as f32;
        let a1 = start + sweep * (i + 1) as f32 / steps as f32;
        painter.add(Shape::convex_polygon(
            vec![center, point(a0), point(a1)],
            color,
            Stroke::NONE,
        ));
    }
}

fn slice_at(spec: &ChartSpec, total: f64, center: Pos2, radius: f32, pos: Pos2) -> Option<String> {
    let offset = pos - center;
    let hole = spec.hole.unwrap_or(0.0) as f32 * radius;
    if offset.length() > radius || offset.length() < hole {
        return None;
    }
    let angle = (offset.angle() + TAU / 4.0).rem_euclid(TAU);
    let mut start = 0.0;
    for (label, &value) in spec.labels.iter().zip(&spec.values) {
        let sweep = (value.max(0.0) / total) as f32 * TAU;
        if angle < start + sweep {
            return Some(format!("{label}: {value}"));
        }
        start += sweep;
    }
    None
}

fn legend(ui: &mut Ui, spec: &ChartSpec, colors: &ColorMap) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        let mut shown: Vec<&String> = Vec::new();
        for label in &spec.labels {
            if shown.contains(&label) {
                continue;
            }
            shown.push(label);
            ui.label(RichText::new("■").color(colors.color_for(label)));
            ui.label(label);
        }
    });
}
