/// Chart layer: the chart handle, the rendering pipeline and file export.
pub mod export;
pub mod render;

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::config::{DEFAULT_DATASET, DEFAULT_FIGSIZE, FIG_HEIGHT, FIG_WIDTH_PER_COL, Y_AXIS_LABEL};
use crate::data::model::ExpressionRow;

// ---------------------------------------------------------------------------
// FigSize
// ---------------------------------------------------------------------------

/// Figure dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigSize {
    pub width: f64,
    pub height: f64,
}

impl FigSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width grows with the number of bars, height is fixed.
    pub fn for_bars(n: usize) -> Self {
        Self::new(FIG_WIDTH_PER_COL * n as f64, FIG_HEIGHT)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for FigSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `"WIDTHxHEIGHT"`, e.g. `"6.4x4"`.
impl FromStr for FigSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| format!("'{v}' is not a number"))
        };
        Ok(Self::new(parse(w)?, parse(h)?))
    }
}

// ---------------------------------------------------------------------------
// Chart handle
// ---------------------------------------------------------------------------

/// One bar: a cell type and its expression at an integer x position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    /// Index of the cell type in the row the chart was built from.
    pub column: usize,
    pub position: f64,
    pub value: f64,
}

/// Ordering for "highest first" sorts where missing (`NaN`) values sink.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (a_nan, b_nan) => a_nan.cmp(&b_nan),
    }
}

/// Horizontal dashed line marking the background expression level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    /// Horizontal extent; equals the axis range at the time it was drawn.
    pub x_span: (f64, f64),
}

/// A rendered expression chart, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionChart {
    pub title: String,
    pub y_label: String,
    pub figsize: FigSize,
    pub bars: Vec<Bar>,
    pub x_range: (f64, f64),
    pub reference: Option<ReferenceLine>,
}

impl Default for ExpressionChart {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExpressionChart {
    /// The blank chart returned when there is nothing to plot.
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            y_label: String::new(),
            figsize: DEFAULT_FIGSIZE,
            bars: Vec::new(),
            x_range: (0.0, 1.0),
            reference: None,
        }
    }

    /// Bars at `0..n` with the axis spanning half a bar past either end.
    pub fn from_row(title: &str, row: &ExpressionRow, figsize: FigSize) -> Self {
        let bars: Vec<Bar> = row
            .iter()
            .enumerate()
            .map(|(i, (label, value))| Bar {
                label: label.to_string(),
                column: i,
                position: i as f64,
                value,
            })
            .collect();
        let n = bars.len() as f64;

        Self {
            title: title.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            figsize,
            bars,
            x_range: (-0.5, n - 0.5),
            reference: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.bars.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn heights(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.value).collect()
    }

    /// Draw a dashed line at `y` across the current x range. The line never
    /// widens the axis.
    pub fn add_reference_line(&mut self, y: f64) {
        self.reference = Some(ReferenceLine {
            y,
            x_span: self.x_range,
        });
    }

    /// Bars reordered by value, highest first (stable, `NaN` last). Positions
    /// are reassigned so they stay `0..n`.
    pub fn sorted(&self) -> Self {
        self.reordered(|a, b| descending_nan_last(a.value, b.value))
    }

    /// Bars back in the order of the row the chart was built from.
    pub fn in_column_order(&self) -> Self {
        self.reordered(|a, b| a.column.cmp(&b.column))
    }

    fn reordered(&self, compare: impl FnMut(&Bar, &Bar) -> Ordering) -> Self {
        let mut bars = self.bars.clone();
        bars.sort_by(compare);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.position = i as f64;
        }
        Self {
            bars,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// ChartRequest – caller-facing parameters
// ---------------------------------------------------------------------------

/// Everything [`render_expression_chart`](render::render_expression_chart)
/// needs to know. Only the gene is required.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub gene: String,
    pub dataset: String,
    /// Dataset providing the reference level, usually normal tissue.
    pub bg_dataset: Option<String>,
    /// Cell types to plot, in order; all of them when `None`.
    pub cell_lines: Option<Vec<String>>,
    /// Figure size; derived from the bar count when `None`.
    pub figsize: Option<FigSize>,
    pub sort: bool,
    pub save_to: Option<PathBuf>,
}

impl ChartRequest {
    pub fn new(gene: impl Into<String>) -> Self {
        Self {
            gene: gene.into(),
            dataset: DEFAULT_DATASET.to_string(),
            bg_dataset: None,
            cell_lines: None,
            figsize: None,
            sort: false,
            save_to: None,
        }
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub fn with_background(mut self, bg_dataset: impl Into<String>) -> Self {
        self.bg_dataset = Some(bg_dataset.into());
        self
    }

    pub fn with_cell_lines<I, S>(mut self, cell_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cell_lines = Some(cell_lines.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_figsize(mut self, figsize: FigSize) -> Self {
        self.figsize = Some(figsize);
        self
    }

    pub fn sorted(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn save_to(mut self, path: impl AsRef<Path>) -> Self {
        self.save_to = Some(path.as_ref().to_path_buf());
        self
    }
}
