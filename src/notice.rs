use std::cell::RefCell;
use std::fmt;

// ---------------------------------------------------------------------------
// Notice – advisory messages emitted while resolving and plotting
// ---------------------------------------------------------------------------

/// A human-readable advisory raised by the pipeline. None of these stop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No row has the exact gene name; synonyms are tried next.
    NotFoundByName { gene: String },
    /// Neither a name nor a synonym matched.
    NotFound { gene: String },
    /// Several rows matched; the first one is used.
    MultipleMatches { gene: String, count: usize },
    /// The foreground row is empty, an empty chart is returned.
    NoData { gene: String },
    /// The background dataset gave no usable level; no reference line is drawn.
    BackgroundUnavailable { gene: String, dataset: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotFoundByName { gene } => {
                write!(f, "Gene {gene} not found by name, trying by gene synonym")
            }
            Notice::NotFound { gene } => write!(f, "Gene {gene} not found by name or synonym"),
            Notice::MultipleMatches { gene, count } => write!(
                f,
                "More than one match found for gene {gene} ({count} rows), using the first one. \
                 You may want to refine your query"
            ),
            Notice::NoData { gene } => write!(f, "No expression data to plot for gene {gene}"),
            Notice::BackgroundUnavailable { gene, dataset } => write!(
                f,
                "No background level for gene {gene} in {dataset}, skipping the reference line"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receiver for [`Notice`]s. The pipeline never prints on its own.
pub trait NoticeSink {
    fn notice(&self, notice: Notice);
}

/// Forwards notices to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotices;

impl NoticeSink for LogNotices {
    fn notice(&self, notice: Notice) {
        match notice {
            Notice::NotFoundByName { .. } => log::info!("{notice}"),
            _ => log::warn!("{notice}"),
        }
    }
}

/// Keeps every notice in memory, in emission order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: RefCell<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.borrow().is_empty()
    }

    /// Drain the log, leaving it empty.
    pub fn take(&self) -> Vec<Notice> {
        self.notices.take()
    }
}

impl NoticeSink for NoticeLog {
    fn notice(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
