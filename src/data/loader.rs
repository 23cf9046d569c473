use url::Url;

use super::model::{ExpressionRow, ExpressionTable, GeneRecord};
use super::resolve::resolve_gene;
use crate::config::{HpaConfig, SEARCH_PATH};
use crate::error::{Result, SheepError};
use crate::notice::NoticeSink;

const USER_AGENT: &str = concat!("sheep/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Blocking client for the Human Protein Atlas search API.
///
/// One call is one GET: no retries, no caching.
#[derive(Debug, Clone)]
pub struct HpaClient {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl HpaClient {
    pub fn new(config: HpaConfig) -> Result<Self> {
        let mut base = config.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The TSV search URL for `gene` in `dataset`.
    pub fn search_url(&self, gene: &str, dataset: &str) -> Result<Url> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("search", gene)
            .append_pair("format", "tsv")
            .append_pair("columns", &format!("g,gs,{dataset}"))
            .append_pair("compress", "no");
        Ok(url)
    }

    /// Download and parse the search results for `gene`. The server matches
    /// loosely, so the table usually holds more genes than asked for.
    pub fn download(&self, gene: &str, dataset: &str) -> Result<ExpressionTable> {
        let url = self.search_url(gene, dataset)?;
        log::debug!("GET {url}");

        let body = self.http.get(url).send()?.error_for_status()?.text()?;
        let table = parse_tsv(&body)?;
        log::debug!(
            "{gene}/{dataset}: {} rows, {} cell types",
            table.len(),
            table.cell_types.len()
        );
        Ok(table)
    }

    /// Download `dataset` and resolve `gene` to a single row restricted to
    /// `cell_lines` (all cell types when `None`).
    pub fn fetch_expression(
        &self,
        gene: &str,
        dataset: &str,
        cell_lines: Option<&[String]>,
        notices: &dyn NoticeSink,
    ) -> Result<ExpressionRow> {
        let table = self.download(gene, dataset)?;
        resolve_gene(&table, gene, cell_lines, notices)
    }
}

// ---------------------------------------------------------------------------
// TSV parsing
// ---------------------------------------------------------------------------

/// Shorten an expression header to its cell type:
/// `"RNA expression - Liver [nTPM]"` becomes `"Liver"`.
/// Headers without `RNA` are returned unchanged.
pub fn normalize_column_name(header: &str) -> Result<String> {
    if !header.contains("RNA") {
        return Ok(header.to_string());
    }
    let before_unit = header.split('[').next().unwrap_or(header);
    before_unit
        .split(" - ")
        .nth(1)
        .map(|name| name.trim().to_string())
        .ok_or_else(|| SheepError::Header(header.to_string()))
}

/// Tab-separated layout: header row, then `Gene`, `Gene synonym` and one
/// nTPM column per cell type. Blank expression cells, and cells missing
/// from the end of a short row, become `NaN`. A row longer than the
/// header is an error.
pub fn parse_tsv(body: &str) -> Result<ExpressionTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_column_name)
        .collect::<Result<_>>()?;

    let gene_idx = headers
        .iter()
        .position(|h| h == "Gene")
        .ok_or(SheepError::MissingColumn("Gene"))?;
    let synonym_idx = headers.iter().position(|h| h == "Gene synonym");

    // First two columns are 'Gene' and 'Gene synonym'
    let cell_types = headers.get(2..).unwrap_or_default().to_vec();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(SheepError::RowLength {
                row: row_no,
                found: record.len(),
                expected: headers.len(),
            });
        }

        let gene = record.get(gene_idx).unwrap_or("").to_string();
        let synonyms = synonym_idx
            .and_then(|i| record.get(i))
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        let values = cell_types
            .iter()
            .enumerate()
            .map(|(j, column)| parse_value(record.get(j + 2).unwrap_or(""), row_no, column))
            .collect::<Result<Vec<_>>>()?;

        rows.push(GeneRecord {
            gene,
            synonyms,
            values,
        });
    }

    Ok(ExpressionTable { cell_types, rows })
}

fn parse_value(cell: &str, row: usize, column: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|_| SheepError::Value {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    })
}
