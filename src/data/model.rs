use serde::Serialize;

// ---------------------------------------------------------------------------
// GeneRecord – one row of the downloaded table
// ---------------------------------------------------------------------------

/// A single gene (one row of the TSV export).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneRecord {
    /// Value of the `Gene` column.
    pub gene: String,
    /// Raw `Gene synonym` cell (`", "`-separated); `None` when blank.
    pub synonyms: Option<String>,
    /// Expression in nTPM, aligned with [`ExpressionTable::cell_types`].
    /// Blank cells are `NaN`.
    pub values: Vec<f64>,
}

impl GeneRecord {
    /// Whether `name` is literally one of this gene's synonyms.
    pub fn has_synonym(&self, name: &str) -> bool {
        self.synonyms
            .as_deref()
            .is_some_and(|s| s.split(", ").any(|syn| syn == name))
    }
}

// ---------------------------------------------------------------------------
// ExpressionTable – the complete parsed response
// ---------------------------------------------------------------------------

/// The parsed response, rows in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionTable {
    /// Renamed expression columns (everything after `Gene` and `Gene synonym`).
    pub cell_types: Vec<String>,
    pub rows: Vec<GeneRecord>,
}

impl ExpressionTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a cell type in [`GeneRecord::values`].
    pub fn column_index(&self, cell_type: &str) -> Option<usize> {
        self.cell_types.iter().position(|c| c == cell_type)
    }
}

// ---------------------------------------------------------------------------
// ExpressionRow – the resolved gene, addressable by cell type
// ---------------------------------------------------------------------------

/// Expression of one gene across the selected cell types.
///
/// When the gene could not be resolved the row keeps its labels but has no
/// values, so [`len`](Self::len) is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionRow {
    gene: Option<String>,
    labels: Vec<String>,
    values: Option<Vec<f64>>,
}

impl ExpressionRow {
    /// A matched row. `labels` and `values` must have the same length.
    pub(crate) fn resolved(gene: String, labels: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(labels.len(), values.len());
        Self {
            gene: Some(gene),
            labels,
            values: Some(values),
        }
    }

    /// The no-match sentinel: labels only, no values.
    pub fn unresolved(labels: Vec<String>) -> Self {
        Self {
            gene: None,
            labels,
            values: None,
        }
    }

    /// `Gene` value of the matched row (may differ from the query when a
    /// synonym matched).
    pub fn gene(&self) -> Option<&str> {
        self.gene.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.values.is_some()
    }

    /// Number of entries; zero for an unresolved row.
    pub fn len(&self) -> usize {
        self.values.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell-type labels, in display order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Values in label order; empty for an unresolved row.
    pub fn values(&self) -> &[f64] {
        self.values.as_deref().unwrap_or(&[])
    }

    pub fn get(&self, cell_type: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == cell_type)?;
        self.values().get(idx).copied()
    }

    /// `(label, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values().iter().copied())
    }

    pub fn first_value(&self) -> Option<f64> {
        self.values().first().copied()
    }
}
