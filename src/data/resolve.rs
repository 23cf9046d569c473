use super::model::{ExpressionRow, ExpressionTable};
use crate::error::{Result, SheepError};
use crate::notice::{Notice, NoticeSink};

// ---------------------------------------------------------------------------
// Gene resolution: which row of the table answers the query
// ---------------------------------------------------------------------------

/// Indices of rows whose `Gene` is exactly `gene` (case-sensitive).
pub fn exact_matches(table: &ExpressionTable, gene: &str) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.gene == gene)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of rows listing `gene` among their synonyms. Rows with a blank
/// synonym cell never match.
pub fn synonym_matches(table: &ExpressionTable, gene: &str) -> Vec<usize> {
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.has_synonym(gene))
        .map(|(i, _)| i)
        .collect()
}

/// Pick the row for `gene` and restrict it to `cell_lines`, in that order
/// (every cell type of the table when `None`).
///
/// Resolution order:
/// * exact `Gene` matches
/// * otherwise `Gene synonym` matches
/// * otherwise an unresolved row carrying only the labels
///
/// With several candidates the first one in table order wins.
pub fn resolve_gene(
    table: &ExpressionTable,
    gene: &str,
    cell_lines: Option<&[String]>,
    notices: &dyn NoticeSink,
) -> Result<ExpressionRow> {
    let labels = match cell_lines {
        Some(lines) => lines.to_vec(),
        None => table.cell_types.clone(),
    };

    let mut matches = exact_matches(table, gene);
    if matches.is_empty() {
        notices.notice(Notice::NotFoundByName {
            gene: gene.to_string(),
        });
        matches = synonym_matches(table, gene);
        if matches.is_empty() {
            notices.notice(Notice::NotFound {
                gene: gene.to_string(),
            });
            return Ok(ExpressionRow::unresolved(labels));
        }
    }

    if matches.len() > 1 {
        notices.notice(Notice::MultipleMatches {
            gene: gene.to_string(),
            count: matches.len(),
        });
    }

    let record = &table.rows[matches[0]];
    let values = labels
        .iter()
        .map(|label| {
            table
                .column_index(label)
                .map(|i| record.values[i])
                .ok_or_else(|| SheepError::UnknownCellType(label.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExpressionRow::resolved(record.gene.clone(), labels, values))
}
