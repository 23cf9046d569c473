use super::{ChartRequest, ExpressionChart, FigSize};
use crate::config::SAVE_DPI;
use crate::data::loader::HpaClient;
use crate::error::{Result, SheepError};
use crate::notice::{Notice, NoticeSink};

// ---------------------------------------------------------------------------
// Expression bar chart
// ---------------------------------------------------------------------------

/// Fetch `request.gene` and turn it into a bar chart, one bar per cell type.
///
/// * Nothing to plot → [`NoData`](Notice::NoData) and [`ExpressionChart::empty`].
/// * `bg_dataset` → second download over all of its cell types; the first
///   value becomes a dashed reference line. An unresolvable background only
///   raises [`BackgroundUnavailable`](Notice::BackgroundUnavailable).
/// * `save_to` → the chart is also written at 300 DPI.
pub fn render_expression_chart(
    client: &HpaClient,
    request: &ChartRequest,
    notices: &dyn NoticeSink,
) -> Result<ExpressionChart> {
    let gene = request.gene.as_str();

    let to_plot = client.fetch_expression(
        gene,
        &request.dataset,
        request.cell_lines.as_deref(),
        notices,
    )?;
    if to_plot.is_empty() {
        notices.notice(Notice::NoData {
            gene: gene.to_string(),
        });
        return Ok(ExpressionChart::empty());
    }

    let background = match &request.bg_dataset {
        Some(bg_dataset) => Some((
            bg_dataset,
            client.fetch_expression(gene, bg_dataset, None, notices)?,
        )),
        None => None,
    };

    let figsize = match request.figsize {
        Some(size) if !size.is_valid() => {
            return Err(SheepError::FigureSize {
                width: size.width,
                height: size.height,
            })
        }
        Some(size) => size,
        None => FigSize::for_bars(to_plot.len()),
    };

    let mut chart = ExpressionChart::from_row(gene, &to_plot, figsize);
    if request.sort {
        chart = chart.sorted();
    }

    if let Some((bg_dataset, bg_row)) = background {
        match bg_row.first_value().filter(|v| v.is_finite()) {
            Some(level) => chart.add_reference_line(level),
            None => notices.notice(Notice::BackgroundUnavailable {
                gene: gene.to_string(),
                dataset: bg_dataset.clone(),
            }),
        }
    }

    if let Some(path) = &request.save_to {
        chart.save(path, SAVE_DPI)?;
        log::info!("Saved {gene} chart to {}", path.display());
    }

    Ok(chart)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::config::HpaConfig;
    use crate::notice::NoticeLog;

    const BREAST_TSV: &str = "Gene\tGene synonym\t\
RNA expression - HCC1419 [nTPM]\tRNA expression - MX-1 [nTPM]\t\
RNA expression - T-47d [nTPM]\tRNA expression - ZR-75-1 [nTPM]\n\
ERBB2\tCD340, HER-2, HER2, NEU\t2450.1\t3.2\t61.7\t61.7\n\
ERBB2IP\tERBIN, LAP2\t15.0\t22.4\t9.9\t1.0\n";

    const PANCREATIC_TSV: &str = "Gene\tGene synonym\t\
RNA expression - AsPC-1 [nTPM]\tRNA expression - BxPC-3 [nTPM]\t\
RNA expression - Capan-2 [nTPM]\tRNA expression - PANC-1 [nTPM]\n\
ERBB2\tCD340, HER-2, HER2, NEU\t88.4\t301.9\t154.0\t19.3\n";

    const TISSUE_TSV: &str = "Gene\tGene synonym\t\
RNA expression - breast [nTPM]\tRNA expression - liver [nTPM]\n\
ERBB2\tCD340, HER-2, HER2, NEU\t42.5\t10.0\n";

    fn serve(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/search_download.php")
                .query_param("search", "ERBB2")
                .query_param("format", "tsv")
                .query_param("columns", "g,gs,cell_RNA_pancreatic_cancer")
                .query_param("compress", "no");
            then.status(200).body(PANCREATIC_TSV);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/search_download.php")
                .query_param("columns", "g,gs,cell_RNA_breast_cancer");
            then.status(200).body(BREAST_TSV);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/search_download.php")
                .query_param("columns", "g,gs,tissue_RNA_normal");
            then.status(200).body(TISSUE_TSV);
        });
    }

    fn client(server: &MockServer) -> HpaClient {
        HpaClient::new(HpaConfig::with_base_url(server.base_url())).unwrap()
    }

    fn breast(gene: &str) -> ChartRequest {
        ChartRequest::new(gene).with_dataset("cell_RNA_breast_cancer")
    }

    #[test]
    fn plots_every_cell_type_in_source_order() {
        let server = MockServer::start();
        serve(&server);

        let notices = NoticeLog::new();
        let chart = render_expression_chart(&client(&server), &breast("ERBB2"), &notices).unwrap();

        assert_eq!(chart.title, "ERBB2");
        assert_eq!(chart.labels(), ["HCC1419", "MX-1", "T-47d", "ZR-75-1"]);
        assert_eq!(chart.heights(), [2450.1, 3.2, 61.7, 61.7]);
        assert_eq!(chart.x_range, (-0.5, 3.5));
        assert!((chart.figsize.width - 3.2).abs() < 1e-12);
        assert_eq!(chart.figsize.height, 4.0);
        assert_eq!(chart.reference, None);
        assert!(notices.is_empty());
    }

    #[test]
    fn default_request_plots_the_pancreatic_cancer_panel() {
        let server = MockServer::start();
        serve(&server);

        let notices = NoticeLog::new();
        let chart =
            render_expression_chart(&client(&server), &ChartRequest::new("ERBB2"), &notices).unwrap();

        assert_eq!(chart.title, "ERBB2");
        assert_eq!(chart.labels(), ["AsPC-1", "BxPC-3", "Capan-2", "PANC-1"]);
        assert_eq!(chart.heights(), [88.4, 301.9, 154.0, 19.3]);
        assert_eq!(chart.reference, None);
        assert!((chart.figsize.width - 3.2).abs() < 1e-12);
        assert!(notices.is_empty());
    }

    #[test]
    fn cell_lines_restrict_and_order_bars() {
        let server = MockServer::start();
        serve(&server);

        let request = breast("ERBB2").with_cell_lines(["HCC1419", "MX-1"]);
        let chart = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap();

        assert_eq!(chart.labels(), ["HCC1419", "MX-1"]);
        assert_eq!(
            chart.bars.iter().map(|b| b.position).collect::<Vec<_>>(),
            [0.0, 1.0]
        );
        assert_eq!(chart.x_range, (-0.5, 1.5));
    }

    #[test]
    fn sort_gives_non_increasing_heights_with_stable_ties() {
        let server = MockServer::start();
        serve(&server);

        let request = breast("ERBB2").sorted(true);
        let chart = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap();

        let heights = chart.heights();
        assert!(heights.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(chart.labels(), ["HCC1419", "T-47d", "ZR-75-1", "MX-1"]);
    }

    #[test]
    fn missing_gene_gives_empty_default_chart() {
        let server = MockServer::start();
        serve(&server);

        let notices = NoticeLog::new();
        let chart = render_expression_chart(&client(&server), &breast("NOPE1"), &notices).unwrap();

        assert_eq!(chart, ExpressionChart::empty());
        assert_eq!(
            notices.notices().last(),
            Some(&Notice::NoData {
                gene: "NOPE1".into()
            })
        );
    }

    #[test]
    fn background_draws_reference_line_from_first_value() {
        let server = MockServer::start();
        serve(&server);

        let request = breast("ERBB2")
            .with_background("tissue_RNA_normal")
            .with_cell_lines(["MX-1"]);
        let chart = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap();

        let line = chart.reference.expect("reference line");
        assert_eq!(line.y, 42.5);
        assert_eq!(line.x_span, (-0.5, 0.5));
        assert_eq!(chart.x_range, (-0.5, 0.5));
    }

    #[test]
    fn unresolvable_background_skips_the_line() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/search_download.php")
                .query_param("columns", "g,gs,cell_RNA_breast_cancer");
            then.status(200).body(BREAST_TSV);
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/search_download.php")
                .query_param("columns", "g,gs,tissue_RNA_normal");
            then.status(200)
                .body("Gene\tGene synonym\tRNA expression - breast [nTPM]\nERBB3\tHER3\t5.0\n");
        });

        let notices = NoticeLog::new();
        let request = breast("ERBB2").with_background("tissue_RNA_normal");
        let chart = render_expression_chart(&client(&server), &request, &notices).unwrap();

        assert_eq!(chart.bars.len(), 4);
        assert_eq!(chart.reference, None);
        assert_eq!(
            notices.notices().last(),
            Some(&Notice::BackgroundUnavailable {
                gene: "ERBB2".into(),
                dataset: "tissue_RNA_normal".into(),
            })
        );
    }

    #[test]
    fn explicit_figsize_is_kept() {
        let server = MockServer::start();
        serve(&server);

        let request = breast("ERBB2").with_figsize(FigSize::new(10.0, 3.0));
        let chart = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap();
        assert_eq!(chart.figsize, FigSize::new(10.0, 3.0));

        let request = breast("ERBB2").with_figsize(FigSize::new(-1.0, 3.0));
        let err = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap_err();
        assert!(matches!(err, SheepError::FigureSize { .. }));
    }

    #[test]
    fn save_to_writes_the_figure() {
        let server = MockServer::start();
        serve(&server);
        let dir = tempfile::tempdir().unwrap();

        let plain = render_expression_chart(&client(&server), &breast("ERBB2"), &NoticeLog::new()).unwrap();
        for name in ["erbb2.svg", "erbb2.png"] {
            let path = dir.path().join(name);
            let request = breast("ERBB2").save_to(&path);
            let chart = render_expression_chart(&client(&server), &request, &NoticeLog::new()).unwrap();

            assert!(path.exists(), "{name} was not written");
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
            assert_eq!(chart, plain);
        }
    }
}
