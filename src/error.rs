use thiserror::Error;

/// Everything that can make a retrieval or a render fail.
///
/// A gene that cannot be found is not an error: it yields an empty
/// [`ExpressionRow`](crate::ExpressionRow) and a notice instead.
#[derive(Debug, Error)]
pub enum SheepError {
    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed TSV response: {0}")]
    Tsv(#[from] csv::Error),

    #[error("malformed expression column header '{0}'")]
    Header(String),

    #[error("row {row} has {found} fields but the header has {expected}")]
    RowLength {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("response has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    Value {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unknown cell type '{0}'")]
    UnknownCellType(String),

    #[error("figure size must be positive, got {width} x {height}")]
    FigureSize { width: f64, height: f64 },

    #[error("rendering figure failed: {0}")]
    Svg(#[from] resvg::usvg::Error),

    #[error("figure of {width} x {height} px cannot be rasterised")]
    Canvas { width: u32, height: u32 },

    #[error("writing image failed: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SheepError> = std::result::Result<T, E>;
