//! Gene expression bar charts from the Human Protein Atlas.
//!
//! The pipeline is linear: [`data`] downloads a `search_download` TSV export,
//! resolves the requested gene to one row and hands it to [`chart`], which
//! turns it into an [`ExpressionChart`] that can be saved or shown.
//!
//! ```no_run
//! use sheep::{render_expression_chart, ChartRequest, HpaClient, HpaConfig, LogNotices};
//!
//! let client = HpaClient::new(HpaConfig::default())?;
//! let request = ChartRequest::new("ERBB2")
//!     .with_dataset("cell_RNA_breast_cancer")
//!     .sorted(true)
//!     .save_to("erbb2.png");
//! let chart = render_expression_chart(&client, &request, &LogNotices)?;
//! println!("{} bars", chart.bars.len());
//! # Ok::<(), sheep::SheepError>(())
//! ```

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod notice;

pub use chart::render::render_expression_chart;
pub use chart::{Bar, ChartRequest, ExpressionChart, FigSize, ReferenceLine};
pub use config::HpaConfig;
pub use data::loader::HpaClient;
pub use data::model::{ExpressionRow, ExpressionTable};
pub use error::{Result, SheepError};
pub use notice::{LogNotices, Notice, NoticeLog, NoticeSink};
