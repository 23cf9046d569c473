use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Save as…").clicked() {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("{} cell types", state.chart.bars.len()));
        if let Some(line) = &state.chart.reference {
            ui.label(format!("background {:.1} nTPM", line.y));
        }

        ui.separator();

        if ui
            .selectable_label(state.sorted, "Sort by expression")
            .clicked()
        {
            state.toggle_sort();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn save_file_dialog(state: &mut ViewerState) {
    let stem = if state.chart.title.is_empty() {
        "chart"
    } else {
        state.chart.title.as_str()
    };
    let file = rfd::FileDialog::new()
        .set_title("Save chart")
        .set_file_name(format!("{stem}.png"))
        .add_filter("PNG", &["png"])
        .add_filter("SVG", &["svg"])
        .add_filter("JPEG", &["jpg", "jpeg"])
        .save_file();

    if let Some(path) = file {
        state.save_visible(&path);
    }
}
