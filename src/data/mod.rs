/// Data layer: table types, download/parsing, and gene resolution.
///
/// Architecture:
/// ```text
///  GET api/search_download.php?search=…&format=tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse TSV, rename columns → ExpressionTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  resolve  │  exact name → synonym → first match → ExpressionRow
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
pub mod resolve;
