use std::path::Path;
use std::sync::{Arc, OnceLock};

use resvg::{tiny_skia, usvg};
use svg::node::element::{Group, Line, Rectangle, Text};
use svg::Document;

use super::ExpressionChart;
use crate::error::{Result, SheepError};

// ---------------------------------------------------------------------------
// Figure layout (SVG user units are points, 72 per inch)
// ---------------------------------------------------------------------------

const PT_PER_INCH: f64 = 72.0;

// Axes placement as fractions of the figure.
const AXES_LEFT: f64 = 0.125;
const AXES_RIGHT: f64 = 0.9;
const AXES_BOTTOM: f64 = 0.11;
const AXES_TOP: f64 = 0.88;

const TICK_LEN: f64 = 3.5;
const TICK_PAD: f64 = 3.5;
const TICK_FONT: f64 = 10.0;
const LABEL_FONT: f64 = 10.0;
const TITLE_FONT: f64 = 12.0;
const TITLE_PAD: f64 = 6.0;
const LABEL_PAD: f64 = 4.0;
/// Padding kept around the drawn content when cropping (0.1 in).
const BBOX_PAD: f64 = 7.2;

const BAR_WIDTH: f64 = 0.8;
const BAR_COLOR: &str = "#1f77b4";
const REFERENCE_COLOR: &str = "red";
const REFERENCE_WIDTH: f64 = 2.0;
const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";

/// Rectangle in figure coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl Bounds {
    fn padded(self, pad: f64) -> Bounds {
        Bounds {
            left: self.left - pad,
            top: self.top - pad,
            right: self.right + pad,
            bottom: self.bottom + pad,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

// ---------------------------------------------------------------------------
// Fonts and measurement
// ---------------------------------------------------------------------------

/// System fonts, loaded once per process.
fn fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("loaded {} font faces", db.len());
            Arc::new(db)
        })
        .clone()
}

fn render_options() -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    options.fontdb = fonts();
    options
}

/// Extent of `node` as actually drawn, strokes and shaped glyphs included.
/// Text that no installed font can draw has no extent.
fn ink_bounds<T>(node: T) -> Result<Bounds>
where
    T: Into<Box<dyn svg::Node>>,
{
    // Without a viewBox user units map one to one onto the canvas.
    let document = Document::new().set("width", 1).set("height", 1).add(node);
    let tree = usvg::Tree::from_str(&document.to_string(), &render_options())?;
    let bbox = tree.root().abs_stroke_bounding_box();
    Ok(Bounds {
        left: bbox.left().into(),
        top: bbox.top().into(),
        right: bbox.right().into(),
        bottom: bbox.bottom().into(),
    })
}

fn text_width(content: &str, size: f64) -> Result<f64> {
    Ok(ink_bounds(text(content, 0.0, 0.0, size))?.width())
}

// ---------------------------------------------------------------------------
// Y axis ticks
// ---------------------------------------------------------------------------

/// Upper end of the y axis: the tallest mark plus a 5 % margin.
fn y_max(chart: &ExpressionChart) -> f64 {
    let top = chart
        .bars
        .iter()
        .map(|b| b.value)
        .chain(chart.reference.map(|r| r.y))
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if top > 0.0 {
        top * 1.05
    } else {
        1.0
    }
}

/// Round tick positions in `0..=max`, aiming for five to ten of them.
fn y_ticks(max: f64) -> Vec<f64> {
    let raw_step = max / 6.0;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let count = (max / step + 1e-9).floor() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

fn tick_label(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let text = format!("{rounded}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

fn text(content: impl Into<String>, x: f64, y: f64, size: f64) -> Text {
    Text::new(content.into())
        .set("x", x)
        .set("y", y)
        .set("font-family", FONT_FAMILY)
        .set("font-size", size)
        .set("fill", "black")
}

impl ExpressionChart {
    /// The figure as an SVG document, cropped to the measured extent of
    /// everything drawn plus 0.1 in.
    pub fn to_svg_document(&self) -> Result<Document> {
        let fig_w = self.figsize.width * PT_PER_INCH;
        let fig_h = self.figsize.height * PT_PER_INCH;
        let axes = Bounds {
            left: AXES_LEFT * fig_w,
            top: (1.0 - AXES_TOP) * fig_h,
            right: AXES_RIGHT * fig_w,
            bottom: (1.0 - AXES_BOTTOM) * fig_h,
        };

        let (x_min, x_max) = self.x_range;
        let y_top = y_max(self);
        let sx = |x: f64| axes.left + (x - x_min) / (x_max - x_min) * axes.width();
        let sy = |y: f64| axes.bottom - y / y_top * axes.height();

        let mut content = Group::new();

        // Bars
        for bar in self.bars.iter().filter(|b| b.value.is_finite()) {
            let x0 = sx(bar.position - BAR_WIDTH / 2.0);
            let x1 = sx(bar.position + BAR_WIDTH / 2.0);
            let y = sy(bar.value.max(0.0));
            content = content.add(
                Rectangle::new()
                    .set("x", x0)
                    .set("y", y)
                    .set("width", x1 - x0)
                    .set("height", axes.bottom - y)
                    .set("fill", BAR_COLOR),
            );
        }

        // Background level
        if let Some(line) = &self.reference {
            let y = sy(line.y);
            content = content.add(
                Line::new()
                    .set("x1", sx(line.x_span.0))
                    .set("y1", y)
                    .set("x2", sx(line.x_span.1))
                    .set("y2", y)
                    .set("stroke", REFERENCE_COLOR)
                    .set("stroke-width", REFERENCE_WIDTH)
                    .set("stroke-dasharray", "7.4,3.2"),
            );
        }

        // Frame
        content = content.add(
            Rectangle::new()
                .set("x", axes.left)
                .set("y", axes.top)
                .set("width", axes.width())
                .set("height", axes.height())
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", 0.8),
        );

        // Y ticks
        let mut widest_y_label: f64 = 0.0;
        for value in y_ticks(y_top) {
            let y = sy(value);
            let label = tick_label(value);
            widest_y_label = widest_y_label.max(text_width(&label, TICK_FONT)?);
            content = content
                .add(
                    Line::new()
                        .set("x1", axes.left - TICK_LEN)
                        .set("y1", y)
                        .set("x2", axes.left)
                        .set("y2", y)
                        .set("stroke", "black")
                        .set("stroke-width", 0.8),
                )
                .add(
                    text(label, axes.left - TICK_LEN - TICK_PAD, y, TICK_FONT)
                        .set("text-anchor", "end")
                        .set("dominant-baseline", "central"),
                );
        }

        // X ticks: cell types, rotated to read bottom-up and hanging below the axis
        let label_top = axes.bottom + TICK_LEN + TICK_PAD;
        for bar in &self.bars {
            let x = sx(bar.position);
            content = content
                .add(
                    Line::new()
                        .set("x1", x)
                        .set("y1", axes.bottom)
                        .set("x2", x)
                        .set("y2", axes.bottom + TICK_LEN)
                        .set("stroke", "black")
                        .set("stroke-width", 0.8),
                )
                .add(
                    text(bar.label.as_str(), x, label_top, TICK_FONT)
                        .set("text-anchor", "end")
                        .set("dominant-baseline", "central")
                        .set("transform", format!("rotate(-90 {x} {label_top})")),
                );
        }

        // Y label, clear of the widest tick label
        if !self.y_label.is_empty() {
            let x = axes.left - TICK_LEN - TICK_PAD - widest_y_label - LABEL_PAD - LABEL_FONT / 2.0;
            let y = (axes.top + axes.bottom) / 2.0;
            content = content.add(
                text(self.y_label.as_str(), x, y, LABEL_FONT)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("transform", format!("rotate(-90 {x} {y})")),
            );
        }

        // Title
        if !self.title.is_empty() {
            let x = (axes.left + axes.right) / 2.0;
            let y = axes.top - TITLE_PAD;
            content = content.add(text(self.title.as_str(), x, y, TITLE_FONT).set("text-anchor", "middle"));
        }

        let view = ink_bounds(content.clone())?.padded(BBOX_PAD);
        Ok(Document::new()
            .set("viewBox", (view.left, view.top, view.width(), view.height()))
            .set("width", format!("{}pt", view.width()))
            .set("height", format!("{}pt", view.height()))
            .add(
                Rectangle::new()
                    .set("x", view.left)
                    .set("y", view.top)
                    .set("width", view.width())
                    .set("height", view.height())
                    .set("fill", "white"),
            )
            .add(content))
    }

    pub fn to_svg(&self) -> Result<String> {
        Ok(self.to_svg_document()?.to_string())
    }

    /// Write the chart to `path`. `.svg` is written as vector graphics; any
    /// other extension is rasterised at `dpi` and encoded by the `image`
    /// crate according to that extension.
    pub fn save(&self, path: impl AsRef<Path>, dpi: f64) -> Result<()> {
        let path = path.as_ref();
        if !self.figsize.is_valid() {
            return Err(SheepError::FigureSize {
                width: self.figsize.width,
                height: self.figsize.height,
            });
        }

        let document = self.to_svg_document()?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if is_svg {
            svg::save(path, &document)?;
        } else {
            rasterize(&document.to_string(), dpi)?.save(path)?;
        }
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Raster output
// ---------------------------------------------------------------------------

/// Render an SVG string at `dpi` into an RGB image.
fn rasterize(svg_text: &str, dpi: f64) -> Result<image::RgbImage> {
    let tree = usvg::Tree::from_str(svg_text, &render_options())?;

    let scale = (dpi / PT_PER_INCH) as f32;
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(SheepError::Canvas { width, height })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // Opaque white background, so premultiplied RGBA equals plain RGBA.
    let rgba = image::RgbaImage::from_raw(width, height, pixmap.take())
        .ok_or(SheepError::Canvas { width, height })?;
    Ok(image::DynamicImage::ImageRgba8(rgba).to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::FigSize;
    use crate::data::model::ExpressionRow;

    fn chart() -> ExpressionChart {
        let row = ExpressionRow::resolved(
            "ERBB2".into(),
            vec!["HCC1419".into(), "MX-1".into()],
            vec![120.0, 35.5],
        );
        ExpressionChart::from_row("ERBB2", &row, FigSize::for_bars(2))
    }

    #[test]
    fn ticks_are_round_and_cover_the_range() {
        assert_eq!(y_ticks(126.0), [0.0, 25.0, 50.0, 75.0, 100.0, 125.0]);

        let small = y_ticks(1.0);
        assert_eq!(small.len(), 6);
        assert!((small[5] - 1.0).abs() < 1e-9);
        assert!((small[1] - 0.2).abs() < 1e-9);

        assert_eq!(tick_label(120.0), "120");
        assert_eq!(tick_label(0.6000000000000001), "0.6");
        assert_eq!(tick_label(2.5), "2.5");
    }

    #[test]
    fn y_axis_leaves_headroom_above_the_tallest_mark() {
        let mut c = chart();
        assert!((y_max(&c) - 126.0).abs() < 1e-9);
        c.add_reference_line(200.0);
        assert!((y_max(&c) - 210.0).abs() < 1e-9);
        assert_eq!(y_max(&ExpressionChart::empty()), 1.0);
    }

    #[test]
    fn svg_contains_bars_labels_and_title() {
        let svg = chart().to_svg().unwrap();
        assert!(svg.contains("ERBB2"));
        assert!(svg.contains("HCC1419"));
        assert!(svg.contains("MX-1"));
        assert!(svg.contains("RNA expression / nTPM"));
        assert!(svg.contains("rotate(-90"));
        assert_eq!(svg.matches(BAR_COLOR).count(), 2);
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn reference_line_is_dashed_and_red() {
        let mut c = chart();
        c.add_reference_line(50.0);
        let svg = c.to_svg().unwrap();
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(REFERENCE_COLOR));
    }

    #[test]
    fn crop_keeps_wide_text_inside_the_figure() {
        let wide = "W".repeat(30);
        let row = ExpressionRow::resolved(wide.clone(), vec!["W".repeat(28)], vec![5.0]);
        let chart = ExpressionChart::from_row(&wide, &row, FigSize::for_bars(1));

        // The crop leaves 0.1 in of margin: at 72 dpi the outer pixels stay blank.
        let image = rasterize(&chart.to_svg().unwrap(), 72.0).unwrap();
        let (w, h) = image.dimensions();
        let white = image::Rgb([255u8, 255, 255]);
        for x in 0..w {
            for y in [0, 1, 2, h - 3, h - 2, h - 1] {
                assert_eq!(image.get_pixel(x, y), &white, "ink at ({x}, {y})");
            }
        }
        for y in 0..h {
            for x in [0, 1, 2, w - 3, w - 2, w - 1] {
                assert_eq!(image.get_pixel(x, y), &white, "ink at ({x}, {y})");
            }
        }
    }

    #[test]
    fn crop_follows_measured_text() {
        let short = chart();
        let mut wide = chart();
        wide.title = "W".repeat(60);
        let with_fonts = text_width("W", TITLE_FONT).unwrap() > 0.0;

        let view_width = |c: &ExpressionChart| {
            let svg = c.to_svg().unwrap();
            let tree = usvg::Tree::from_str(&svg, &render_options()).unwrap();
            tree.size().width()
        };
        if with_fonts {
            assert!(view_width(&wide) > view_width(&short));
        } else {
            assert_eq!(view_width(&wide), view_width(&short));
        }
    }

    #[test]
    fn raster_output_scales_with_dpi() {
        let svg = chart().to_svg().unwrap();
        let low = rasterize(&svg, 72.0).unwrap();
        let high = rasterize(&svg, 300.0).unwrap();
        assert!(high.width() > 4 * low.width() - 4);
        assert!(high.height() > 4 * low.height() - 4);
    }

    #[test]
    fn save_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let svg_path = dir.path().join("chart.svg");
        chart().save(&svg_path, 300.0).unwrap();
        assert!(std::fs::read_to_string(&svg_path).unwrap().contains("<svg"));

        let png_path = dir.path().join("chart.png");
        chart().save(&png_path, 300.0).unwrap();
        let decoded = image::open(&png_path).unwrap();
        assert!(decoded.width() > 0);

        let jpg_path = dir.path().join("chart.jpg");
        chart().save(&jpg_path, 100.0).unwrap();
        assert!(jpg_path.exists());
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = chart().save(dir.path().join("chart.xyz"), 300.0).unwrap_err();
        assert!(matches!(err, SheepError::Image(_)));
    }

    #[test]
    fn empty_chart_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        ExpressionChart::empty().save(&path, 100.0).unwrap();
        assert!(path.exists());
    }
}
