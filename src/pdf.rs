use std::io::BufWriter;
use std::path::Path;

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::*;
use textwrap::core::{Fragment, Word};
use textwrap::wrap_algorithms::wrap_first_fit;
use textwrap::WordSeparator;

use crate::config::{Sender, SlipConfig};
use crate::error::{Result, SlipError};
use crate::layout::{grid_cell, SlipBlock, SlipPage};
use crate::metrics::text_width;

// A4 portrait (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 8.0;
const GUTTER: f32 = 6.0;
const PAD: f32 = 3.0;
const LINE_H: f32 = 4.0;
const FONT_SIZE: f32 = 8.5;
const LABEL_SIZE: f32 = 7.0;
const HEADER_SIZE: f32 = 10.0;
const LABEL_COL_W: f32 = 24.0;
const LOGO_MAX_H: f32 = 12.0;
const LOGO_MAX_W: f32 = 24.0;

const ELLIPSIS: char = '\u{2026}';

/// Clip `text` so it fits in `width` mm at `size` pt.
fn fit(text: &str, width: f32, size: f32, bold: bool) -> String {
    if text_width(text, size, bold) <= width {
        return text.to_string();
    }
    let mut budget = width - text_width(&ELLIPSIS.to_string(), size, bold);
    let mut clipped = String::new();
    for c in text.chars() {
        let w = text_width(c.encode_utf8(&mut [0u8; 4]), size, bold);
        if w > budget {
            break;
        }
        budget -= w;
        clipped.push(c);
    }
    clipped.push(ELLIPSIS);
    clipped
}

/// A word measured in mm of printed Helvetica.
#[derive(Debug)]
struct Measured<'a> {
    word: Word<'a>,
    width: f64,
    space: f64,
}

impl Fragment for Measured<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.space
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Break `text` into lines no wider than `width` mm. A single word wider
/// than the line gets a line of its own and is clipped when drawn.
fn wrap(text: &str, width: f32, size: f32, bold: bool) -> Vec<String> {
    let words: Vec<Measured> = WordSeparator::AsciiSpace
        .find_words(text)
        .map(|word| Measured {
            width: f64::from(text_width(word.word, size, bold)),
            space: f64::from(text_width(word.whitespace, size, bold)),
            word,
        })
        .collect();
    if words.is_empty() {
        return vec![String::new()];
    }
    wrap_first_fit(&words, &[f64::from(width)])
        .into_iter()
        .map(|line| {
            let mut out = String::new();
            for (i, m) in line.iter().enumerate() {
                out.push_str(m.word.word);
                if i + 1 < line.len() {
                    out.push_str(m.word.whitespace);
                }
            }
            out
        })
        .collect()
}

/// A rectangle on the page, measured from the top-left corner.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl Frame {
    fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

fn cell_frame(index: usize, config: &SlipConfig) -> Frame {
    let columns = config.columns.max(1);
    let rows = config.rows().max(1);
    let w = (PAGE_W - 2.0 * MARGIN - (columns - 1) as f32 * GUTTER) / columns as f32;
    let h = (PAGE_H - 2.0 * MARGIN - (rows - 1) as f32 * GUTTER) / rows as f32;
    let cell = grid_cell(index, columns);
    Frame {
        x: MARGIN + cell.column as f32 * (w + GUTTER),
        y: MARGIN + cell.row as f32 * (h + GUTTER),
        w,
        h,
    }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| SlipError::Pdf(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| SlipError::Pdf(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc
            .get_page(self.current_page)
            .get_layer(self.current_layer)
    }

    /// Draw text with its baseline `y` mm below the top edge.
    fn text(&self, s: &str, x: f32, y: f32, size: f32, bold: bool) {
        if s.is_empty() {
            return;
        }
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer()
            .use_text(s, size, Mm(x), Mm(PAGE_H - y), font);
    }

    fn line(&self, points: &[(f32, f32)], closed: bool, thickness: f32) {
        let layer = self.layer();
        layer.set_outline_thickness(thickness);
        layer.add_line(Line {
            points: points
                .iter()
                .map(|&(x, y)| (Point::new(Mm(x), Mm(PAGE_H - y)), false))
                .collect(),
            is_closed: closed,
        });
    }

    fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.line(&[(x1, y), (x2, y)], false, 0.3);
    }

    fn border(&self, f: Frame) {
        self.line(
            &[
                (f.x, f.y),
                (f.x + f.w, f.y),
                (f.x + f.w, f.bottom()),
                (f.x, f.bottom()),
            ],
            true,
            0.6,
        );
    }

    /// Place `logo` with its top-left corner at (`x`, `y`); returns the drawn width.
    fn logo(&self, logo: &DynamicImage, x: f32, y: f32) -> f32 {
        let (px_w, px_h) = logo.dimensions();
        if px_w == 0 || px_h == 0 {
            return 0.0;
        }
        let dpi = (px_h as f32 * 25.4 / LOGO_MAX_H).max(px_w as f32 * 25.4 / LOGO_MAX_W);
        let w = px_w as f32 * 25.4 / dpi;
        let h = px_h as f32 * 25.4 / dpi;
        Image::from_dynamic_image(logo).add_to_layer(
            self.layer(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(Mm(PAGE_H - y - h)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        w
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| SlipError::Pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| SlipError::Pdf(e.to_string()))
    }
}

/// Cursor that writes lines down a frame and stops at its bottom edge.
struct Column<'a> {
    pdf: &'a PdfWriter,
    x: f32,
    y: f32,
    width: f32,
    limit: f32,
}

impl Column<'_> {
    fn line(&mut self, s: &str, size: f32, bold: bool) {
        if self.y + LINE_H > self.limit {
            return;
        }
        self.y += LINE_H;
        self.pdf.text(&fit(s, self.width, size, bold), self.x, self.y, size, bold);
    }

    fn wrapped(&mut self, s: &str, size: f32, bold: bool) {
        for l in wrap(s, self.width, size, bold) {
            self.line(&l, size, bold);
        }
    }

    fn rule(&mut self) {
        if self.y + LINE_H > self.limit {
            return;
        }
        self.y += 1.5;
        self.pdf.hline(self.x - PAD, self.x + self.width + PAD, self.y);
    }

    fn field(&mut self, label: &str, value: &str) {
        if self.y + LINE_H > self.limit {
            return;
        }
        self.y += LINE_H;
        self.pdf
            .text(&fit(label, LABEL_COL_W - 1.0, LABEL_SIZE, false), self.x, self.y, LABEL_SIZE, false);
        let value_w = self.width - LABEL_COL_W;
        self.pdf
            .text(&fit(value, value_w, FONT_SIZE, true), self.x + LABEL_COL_W, self.y, FONT_SIZE, true);
    }
}

fn draw_block(
    pdf: &PdfWriter,
    frame: Frame,
    block: &SlipBlock,
    config: &SlipConfig,
    logo: Option<&DynamicImage>,
) {
    pdf.border(frame);

    let mut header_x = frame.x + PAD;
    let mut header_bottom = frame.y + PAD;
    if let Some(img) = logo {
        let w = pdf.logo(img, frame.x + PAD, frame.y + PAD);
        header_x += w + 2.0;
        header_bottom += LOGO_MAX_H;
    }

    let mut col = Column {
        pdf,
        x: header_x,
        y: frame.y + PAD - 1.0,
        width: frame.x + frame.w - PAD - header_x,
        limit: frame.bottom() - PAD,
    };
    for (i, line) in config.header.iter().enumerate() {
        if i == 0 {
            col.line(line, HEADER_SIZE, true);
        } else {
            col.line(line, LABEL_SIZE, false);
        }
    }

    col.x = frame.x + PAD;
    col.width = frame.w - 2.0 * PAD;
    col.y = col.y.max(header_bottom);
    if !config.header.is_empty() || logo.is_some() {
        col.rule();
    }

    write_party(&mut col, "FROM (Consignor)", &config.sender);
    col.rule();

    col.line("TO (Consignee)", LABEL_SIZE, false);
    col.wrapped(&block.receiver.name, FONT_SIZE, true);
    for l in &block.receiver.address {
        col.wrapped(l, FONT_SIZE, false);
    }
    col.line(&block.receiver.city, FONT_SIZE, false);
    if !block.receiver.contact.is_empty() {
        col.line(&format!("Ph: {}", block.receiver.contact), FONT_SIZE, false);
    }
    col.rule();

    for (label, value) in block.tracking_fields() {
        col.field(label, value);
    }
}

fn write_party(col: &mut Column<'_>, label: &str, sender: &Sender) {
    col.line(label, LABEL_SIZE, false);
    col.wrapped(&sender.name, FONT_SIZE, true);
    for l in &sender.lines {
        col.wrapped(l, FONT_SIZE, false);
    }
}

fn load_logo(path: &Path) -> Result<DynamicImage> {
    let img = image_crate::open(path).map_err(|e| SlipError::Logo {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    // Alpha channels render as black boxes in some viewers.
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Render paginated slips. An empty page list yields a single page that
/// says so, never an error.
pub fn render_slips(pages: &[SlipPage], config: &SlipConfig) -> Result<Vec<u8>> {
    let logo = config.logo.as_deref().map(load_logo).transpose()?;
    let mut pdf = PdfWriter::new("Courier Receipts")?;

    if pages.is_empty() {
        pdf.text(
            "No receipts for this selection.",
            MARGIN,
            MARGIN + 10.0,
            HEADER_SIZE,
            true,
        );
        return pdf.to_bytes();
    }

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            pdf.new_page();
        }
        log::debug!("Page {}: {} slips", page.number, page.filled());
        for (index, cell) in page.cells.iter().enumerate() {
            if let Some(block) = cell {
                draw_block(&pdf, cell_frame(index, config), block, config, logo.as_ref());
            }
        }
    }
    log::info!("Rendered {} slip pages", pages.len());
    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::paginate;
    use crate::selection::Slip;
    use crate::testutil::{docket, party};

    fn slips(n: usize) -> Vec<Slip> {
        (0..n)
            .map(|i| Slip {
                docket: docket(&(500 + i).to_string(), "2024-12-05", "P01"),
                party: party("P01", "ABC Company"),
            })
            .collect()
    }

    fn count_pages(bytes: &[u8]) -> usize {
        let count = |needle: &[u8]| {
            bytes
                .windows(needle.len() + 1)
                .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
                .count()
        };
        count(b"/Type/Page") + count(b"/Type /Page")
    }

    #[test]
    fn test_render_produces_pdf() {
        let config = SlipConfig::default();
        let pages = paginate(&slips(5), &config);
        let bytes = render_slips(&pages, &config).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_one_pdf_page_per_slip_page() {
        let config = SlipConfig::default();
        let pages = paginate(&slips(9), &config);
        let bytes = render_slips(&pages, &config).unwrap();
        assert_eq!(count_pages(&bytes), 3);
    }

    #[test]
    fn test_render_empty_is_not_an_error() {
        let bytes = render_slips(&[], &SlipConfig::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(count_pages(&bytes), 1);
    }

    #[test]
    fn test_missing_logo_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = SlipConfig {
            logo: Some(dir.path().join("logo.png")),
            ..SlipConfig::default()
        };
        let err = render_slips(&paginate(&slips(1), &config), &config).unwrap_err();
        assert!(matches!(err, SlipError::Logo { .. }));
    }

    fn contains(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_logo_is_embedded_in_each_page() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        image_crate::RgbaImage::from_pixel(40, 20, image_crate::Rgba([200, 30, 30, 128]))
            .save(&logo)
            .unwrap();
        let config = SlipConfig {
            logo: Some(logo),
            ..SlipConfig::default()
        };
        let bytes = render_slips(&paginate(&slips(5), &config), &config).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(contains(&bytes, b"/Subtype /Image") || contains(&bytes, b"/Subtype/Image"));
        assert_eq!(count_pages(&bytes), 2);
    }

    #[test]
    fn test_loaded_logo_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        image_crate::RgbaImage::from_pixel(8, 4, image_crate::Rgba([0, 0, 0, 0]))
            .save(&path)
            .unwrap();
        let img = load_logo(&path).unwrap();
        assert!(matches!(img, DynamicImage::ImageRgb8(_)));
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[test]
    fn test_cell_frames_tile_the_page() {
        let config = SlipConfig::default();
        let a = cell_frame(0, &config);
        let b = cell_frame(1, &config);
        let c = cell_frame(2, &config);
        let d = cell_frame(3, &config);
        assert_eq!(a.y, b.y);
        assert_eq!(a.x, c.x);
        assert!(b.x > a.x + a.w);
        assert!(c.y > a.y + a.h);
        assert!(d.x + d.w <= PAGE_W - MARGIN + 0.01);
        assert!(d.bottom() <= PAGE_H - MARGIN + 0.01);
    }

    const CAPS: &str = "SHREE GANESH MEDICAL AGENCY AHMEDABAD ROAD WAREHOUSE";

    fn value_column_width() -> f32 {
        let frame = cell_frame(1, &SlipConfig::default());
        frame.w - 2.0 * PAD - LABEL_COL_W
    }

    #[test]
    fn test_fit_clips_long_text() {
        assert_eq!(fit("SHORT", 50.0, FONT_SIZE, false), "SHORT");
        let long = "X".repeat(200);
        let clipped = fit(&long, 30.0, FONT_SIZE, false);
        assert!(clipped.ends_with(ELLIPSIS));
        assert!(text_width(&clipped, FONT_SIZE, false) <= 30.0);
    }

    #[test]
    fn test_fit_keeps_capitals_inside_value_column() {
        let width = value_column_width();
        assert!(text_width(CAPS, FONT_SIZE, true) > width);
        let clipped = fit(CAPS, width, FONT_SIZE, true);
        assert!(clipped.ends_with(ELLIPSIS));
        assert!(clipped.starts_with("SHREE GANESH"));
        let drawn = text_width(&clipped, FONT_SIZE, true);
        assert!(drawn <= width, "{clipped:?} is {drawn}mm in a {width}mm column");
        // Nothing more could have been kept.
        let kept = clipped.chars().count() - 1;
        let longer: String = CAPS.chars().take(kept + 1).chain([ELLIPSIS]).collect();
        assert!(text_width(&longer, FONT_SIZE, true) > width);
    }

    #[test]
    fn test_wrap_keeps_capitals_inside_cell() {
        let width = cell_frame(0, &SlipConfig::default()).w - 2.0 * PAD;
        let text = format!("{CAPS} {CAPS}");
        let lines = wrap(&text, width, FONT_SIZE, true);
        assert!(lines.len() >= 2);
        for line in &lines {
            let w = text_width(line, FONT_SIZE, true);
            assert!(w <= width, "{line:?} is {w}mm in a {width}mm cell");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_blank_text_is_one_empty_line() {
        assert_eq!(wrap("", 50.0, FONT_SIZE, false), vec![String::new()]);
    }
}
