use eframe::egui;
use sheep::ExpressionChart;

use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SheepApp {
    pub state: ViewerState,
}

impl SheepApp {
    pub fn new(chart: ExpressionChart, sorted: bool) -> Self {
        Self {
            state: ViewerState::new(chart, sorted),
        }
    }
}

impl eframe::App for SheepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::expression_plot(ui, &self.state);
        });
    }
}
