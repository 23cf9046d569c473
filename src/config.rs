use std::time::Duration;

use crate::chart::FigSize;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Root of the Human Protein Atlas site; the search API lives below it.
pub const DEFAULT_BASE_URL: &str = "http://www.proteinatlas.org/";

/// Path of the TSV search endpoint, relative to the base URL.
pub const SEARCH_PATH: &str = "api/search_download.php";

pub const DEFAULT_DATASET: &str = "cell_RNA_pancreatic_cancer";

/// Figure height in inches when the caller gives no size.
pub const FIG_HEIGHT: f64 = 4.0;

/// Figure width in inches per plotted cell type when the caller gives no size.
pub const FIG_WIDTH_PER_COL: f64 = 0.8;

/// Size of the empty chart returned when there is nothing to plot.
pub const DEFAULT_FIGSIZE: FigSize = FigSize {
    width: 6.4,
    height: 4.8,
};

/// Resolution used when a chart is written to disk.
pub const SAVE_DPI: f64 = 300.0;

pub const Y_AXIS_LABEL: &str = "RNA expression / nTPM";

// ---------------------------------------------------------------------------
// Transport configuration
// ---------------------------------------------------------------------------

/// Where and how the expression data is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct HpaConfig {
    /// Site root, e.g. `http://www.proteinatlas.org/`.
    pub base_url: String,
    /// Request timeout; `None` waits for as long as the server takes.
    pub timeout: Option<Duration>,
}

impl Default for HpaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl HpaConfig {
    /// Default configuration pointed at another site root (mirrors, mock servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
