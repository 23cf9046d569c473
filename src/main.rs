mod app;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::SheepApp;
use sheep::config::{DEFAULT_BASE_URL, DEFAULT_DATASET};
use sheep::{render_expression_chart, ChartRequest, FigSize, HpaClient, HpaConfig, LogNotices};

/// Plot RNA expression of a gene across cell types from the Human Protein Atlas.
#[derive(Debug, Parser)]
#[command(name = "sheep", version, about)]
struct Cli {
    /// Gene name (or synonym) to look up
    gene: String,

    /// Dataset with the plotted cell types
    #[arg(long, default_value = DEFAULT_DATASET)]
    dataset: String,

    /// Dataset whose first value is drawn as a dashed reference line
    #[arg(long = "background", value_name = "DATASET")]
    bg_dataset: Option<String>,

    /// Cell type to plot; repeat to plot several, in order (default: all)
    #[arg(long = "cell-line", value_name = "NAME")]
    cell_lines: Vec<String>,

    /// Figure size in inches, e.g. 6.4x4 (default: 0.8 per bar x 4)
    #[arg(long, value_name = "WxH")]
    figsize: Option<FigSize>,

    /// Sort bars by expression, highest first
    #[arg(long)]
    sort: bool,

    /// Write the chart to this file (format from the extension: svg, png, jpg)
    #[arg(long, value_name = "PATH")]
    save_to: Option<PathBuf>,

    /// Site root of the Human Protein Atlas
    #[arg(long, env = "SHEEP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Print the chart as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Open the chart in a window
    #[arg(long)]
    show: bool,
}

impl Cli {
    fn request(&self) -> ChartRequest {
        ChartRequest {
            gene: self.gene.clone(),
            dataset: self.dataset.clone(),
            bg_dataset: self.bg_dataset.clone(),
            cell_lines: (!self.cell_lines.is_empty()).then(|| self.cell_lines.clone()),
            figsize: self.figsize,
            sort: self.sort,
            save_to: self.save_to.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Notices are warnings; show them unless RUST_LOG says otherwise.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let client = HpaClient::new(HpaConfig::with_base_url(cli.base_url.clone()))
        .context("building HTTP client")?;
    let chart = render_expression_chart(&client, &cli.request(), &LogNotices)
        .with_context(|| format!("plotting {} from {}", cli.gene, cli.dataset))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&chart)?);
    }

    if cli.show {
        let size = chart.figsize;
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([
                    (size.width * 100.0).max(480.0) as f32,
                    (size.height * 100.0 + 40.0) as f32,
                ])
                .with_min_inner_size([320.0, 240.0]),
            ..Default::default()
        };

        let sorted = cli.sort;
        eframe::run_native(
            &format!("sheep – {}", cli.gene),
            options,
            Box::new(move |_cc| Ok(Box::new(SheepApp::new(chart, sorted)))),
        )
        .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["sheep", "ERBB2"]).unwrap();
        assert_eq!(cli.request(), ChartRequest::new("ERBB2"));
        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn cli_collects_every_option() {
        let cli = Cli::try_parse_from([
            "sheep",
            "ERBB2",
            "--dataset",
            "cell_RNA_breast_cancer",
            "--background",
            "tissue_RNA_normal",
            "--cell-line",
            "HCC1419",
            "--cell-line",
            "MX-1",
            "--figsize",
            "3x4",
            "--sort",
            "--save-to",
            "erbb2.png",
        ])
        .unwrap();

        let expected = ChartRequest::new("ERBB2")
            .with_dataset("cell_RNA_breast_cancer")
            .with_background("tissue_RNA_normal")
            .with_cell_lines(["HCC1419", "MX-1"])
            .with_figsize(FigSize::new(3.0, 4.0))
            .sorted(true)
            .save_to("erbb2.png");
        assert_eq!(cli.request(), expected);
    }

    #[test]
    fn malformed_figsize_is_rejected() {
        assert!(Cli::try_parse_from(["sheep", "ERBB2", "--figsize", "big"]).is_err());
    }
}
