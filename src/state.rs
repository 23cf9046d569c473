use std::path::Path;

use sheep::config::SAVE_DPI;
use sheep::ExpressionChart;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// Chart with its bars in source (cell type) order.
    pub chart: ExpressionChart,

    /// Whether bars are shown highest first.
    pub sorted: bool,

    /// What is actually drawn: `chart`, or its sorted copy.
    pub visible: ExpressionChart,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl ViewerState {
    /// `sorted` says whether the pipeline already sorted `chart`.
    pub fn new(chart: ExpressionChart, sorted: bool) -> Self {
        Self {
            chart: chart.in_column_order(),
            sorted,
            visible: chart,
            status_message: None,
        }
    }

    /// Flip between source order and highest-first order.
    pub fn toggle_sort(&mut self) {
        self.sorted = !self.sorted;
        self.visible = if self.sorted {
            self.chart.sorted()
        } else {
            self.chart.clone()
        };
    }

    /// Write the visible chart and report the outcome in the status line.
    pub fn save_visible(&mut self, path: &Path) {
        match self.visible.save(path, SAVE_DPI) {
            Ok(()) => {
                log::info!("Saved chart to {}", path.display());
                self.status_message = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save chart: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
