use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, HLine, LineStyle, Plot};

use crate::state::ViewerState;

const BAR_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

// ---------------------------------------------------------------------------
// Expression plot (central panel)
// ---------------------------------------------------------------------------

/// Render the bar chart in the central panel.
pub fn expression_plot(ui: &mut Ui, state: &ViewerState) {
    let chart = &state.visible;
    if chart.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No expression data to plot");
        });
        return;
    }

    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .filter(|b| b.value.is_finite())
        .map(|b| {
            Bar::new(b.position, b.value)
                .name(&b.label)
                .width(0.8)
                .fill(BAR_COLOR)
        })
        .collect();

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&chart.title);
    });

    let (x_min, x_max) = chart.x_range;
    Plot::new("expression_plot")
        .y_axis_label(chart.y_label.as_str())
        .include_x(x_min)
        .include_x(x_max)
        .include_y(0.0)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));

            if let Some(line) = &chart.reference {
                plot_ui.hline(
                    HLine::new(line.y)
                        .color(Color32::RED)
                        .width(2.0)
                        .style(LineStyle::dashed_loose()),
                );
            }
        });
}
