//! # Receipt Pipeline Tests
//!
//! End-to-end checks of the layout engine and raster encoder through the
//! public API: content in, ESC/POS bytes out.
//!
//! All text is set in the built-in bitmap font, whose advance is exactly
//! `size / 2` dots per character, so widths and heights are predictable.

use image::{GrayImage, Luma};
use pretty_assertions::assert_eq;

use rollprint::layout::flex::{self, FlexPlan};
use rollprint::layout::{
    Alignment, Content, FlexGroup, Image, Justify, LayoutContext, QrCode, Spacer, Text,
    VerticalAlign, compose, text,
};
use rollprint::printer::{PaperWidth, PrinterConfig};
use rollprint::protocol::{graphics, raster};
use rollprint::render::canvas::{BLACK, WHITE};
use rollprint::render::{Canvas, FontBook, FontRef, GlyphMetrics};
use rollprint::transport::Capture;
use rollprint::{PrintError, Printer, document};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn session(config: PrinterConfig) -> (Printer, Capture) {
    let capture = Capture::new();
    let printer = Printer::with_transport(config, Box::new(capture.clone())).unwrap();
    (printer, capture)
}

fn mm58() -> PrinterConfig {
    PrinterConfig::new("", PaperWidth::Mm58)
}

/// Columns holding at least one non-white pixel in rows `rows`.
fn inked_columns(canvas: &Canvas, rows: std::ops::Range<u32>) -> Vec<u32> {
    (0..canvas.width())
        .filter(|&x| rows.clone().any(|y| canvas.get(x, y) != WHITE))
        .collect()
}

/// Split a job into its raster commands: (row_bytes, height, data).
fn raster_commands(job: &[u8]) -> Vec<(u32, u32, Vec<u8>)> {
    let mut commands = Vec::new();
    let mut i = 0;
    while i + graphics::RASTER_HEADER_LEN <= job.len() {
        if job[i..i + 4] != graphics::RASTER_OPCODE {
            i += 1;
            continue;
        }
        let row_bytes = u16::from_le_bytes([job[i + 4], job[i + 5]]) as u32;
        let height = u16::from_le_bytes([job[i + 6], job[i + 7]]) as u32;
        let start = i + graphics::RASTER_HEADER_LEN;
        let end = start + (row_bytes * height) as usize;
        commands.push((row_bytes, height, job[start..end].to_vec()));
        i = end;
    }
    commands
}

// ============================================================================
// WIDTH CONTAINMENT
// ============================================================================

#[test]
fn test_text_lines_never_exceed_available_width() {
    let fonts = FontBook::new();
    let sample = "The quick brown fox jumps over the lazy dog, twice. 0123456789";
    for size in [16, 20, 28, 40] {
        for available in [13, 50, 97, 200, 384] {
            let lines = text::wrap(&fonts, &FontRef::Builtin, size, sample, available);
            let char_width = size / 2;
            for line in &lines {
                assert!(
                    line.width <= available || line.text.chars().count() == 1,
                    "size {} available {}: '{}' is {} wide",
                    size,
                    available,
                    line.text,
                    line.width
                );
                assert_eq!(line.width, char_width * line.text.chars().count() as u32);
            }
            let rejoined: String = lines.iter().map(|l| l.text.as_str()).collect();
            assert_eq!(rejoined, sample);
        }
    }
}

#[test]
fn test_flex_rows_never_exceed_available_width() {
    let fonts = FontBook::new();
    let ctx = LayoutContext::new(&fonts, FontRef::Builtin);
    let group = FlexGroup::new()
        .item_gap(6)
        .row_gap(2)
        .item(Text::new("Espresso").size(24))
        .item(Text::new("Cortado con leche").size(24))
        .item(QrCode::new("https://example.invalid/m").module_size(2))
        .item(Image::new(GrayImage::from_pixel(500, 40, Luma([BLACK]))))
        .item(FlexGroup::new().item(Text::new("nested").size(20)));

    for available in [120, 200, 368] {
        let canvas = flex::render(&ctx, &group, Some(available)).unwrap();
        assert_eq!(canvas.width(), available);
    }
}

#[test]
fn test_receipt_is_paper_width() {
    for paper in [PaperWidth::Mm58, PaperWidth::Mm80] {
        let (mut printer, _) = session(PrinterConfig::new("", paper).with_padding(10));
        printer
            .text(Text::new("A very long line that certainly needs more than one row to fit"))
            .image_pixels(
                GrayImage::from_pixel(2000, 100, Luma([0])),
                rollprint::session::ImageWidth::Natural,
            )
            .qrcode(QrCode::new("https://example.invalid/r/77").module_size(30));
        let canvas = printer.render().unwrap();
        assert_eq!(canvas.width(), paper.dots());
    }
}

// ============================================================================
// ROW MONOTONICITY
// ============================================================================

#[test]
fn test_placements_are_row_monotonic() {
    let group = FlexGroup::new().item_gap(4).row_gap(3);
    let sizes: Vec<(u32, u32)> = (0..60)
        .map(|i| (8 + (i * 13) % 70, 4 + (i * 5) % 9))
        .collect();
    let plan: FlexPlan = flex::plan(&sizes, &group, Some(150));

    let mut previous: Option<(u32, u32)> = None;
    for (index, placement) in plan.placements.iter().enumerate() {
        if let Some((px, py)) = previous {
            assert!(placement.y >= py, "item {} moved up", index);
            if placement.y > py {
                assert_eq!(placement.x, 0, "item {} starts a row", index);
            } else {
                assert!(placement.x > px);
            }
        }
        previous = Some((placement.x, placement.y));
    }

    let flattened: Vec<usize> = plan.rows.iter().flat_map(|r| r.items.clone()).collect();
    assert_eq!(flattened, (0..60).collect::<Vec<_>>());
}

// ============================================================================
// ALIGNMENT
// ============================================================================

#[test]
fn test_between_gap_is_free_space() {
    let group = FlexGroup::new().justify(Justify::Between);
    let plan = flex::plan(&[(50, 20), (30, 20)], &group, Some(200));
    let first = plan.placements[0];
    let second = plan.placements[1];
    assert_eq!(second.x - (first.x + first.width), 120);
    assert_eq!(second.x + second.width, 200);
}

#[test]
fn test_between_rendered_edges() {
    let fonts = FontBook::new();
    let ctx = LayoutContext::new(&fonts, FontRef::Builtin);
    // 20px font: "HELLO" is 50 wide, "YOU" is 30 wide
    let group = FlexGroup::new()
        .justify(Justify::Between)
        .item(Text::new("HELLO").size(20))
        .item(Text::new("YOU").size(20));
    let canvas = flex::render(&ctx, &group, Some(200)).unwrap();
    let inked = inked_columns(&canvas, 0..canvas.height());
    assert!(inked.iter().all(|&x| x < 50 || x >= 170));
    assert!(inked.iter().any(|&x| x < 50));
    assert!(inked.iter().any(|&x| x >= 170));
}

#[test]
fn test_vertical_center_in_row() {
    let group = FlexGroup::new().align(VerticalAlign::Center);
    let plan = flex::plan(&[(10, 40), (10, 10), (10, 21)], &group, Some(100));
    let ys: Vec<u32> = plan.placements.iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![0, 15, 9]);
}

#[test]
fn test_centered_text_line() {
    let (mut printer, _) = session(mm58());
    // 28px font: "ABCD" is 56 wide, centered at (384 - 56) / 2 = 164
    printer.text(Text::new("ABCD").align(Alignment::Center));
    let canvas = printer.render().unwrap();
    let inked = inked_columns(&canvas, 0..32);
    assert!(inked.iter().all(|&x| (164..220).contains(&x)));
}

// ============================================================================
// SPACING
// ============================================================================

#[test]
fn test_text_spacer_is_half_font_size() {
    let fonts = FontBook::new();
    let ctx = LayoutContext::new(&fonts, FontRef::Builtin);
    let config = mm58();

    let block = compose::compose(&ctx, &config, &[Text::new("Total").size(28).into()]).unwrap();
    let line_height = fonts.line_height(&FontRef::Builtin, 28);
    assert_eq!(block.height() - line_height, 14);

    let odd = compose::compose(&ctx, &config, &[Text::new("x").size(29).into()]).unwrap();
    assert_eq!(odd.height() - fonts.line_height(&FontRef::Builtin, 29), 14);
}

#[test]
fn test_spacers_add_up() {
    let fonts = FontBook::new();
    let ctx = LayoutContext::new(&fonts, FontRef::Builtin);
    let contents: Vec<Content> = vec![
        Spacer::new(5).repeat(4).into(),
        Spacer::new(0).into(),
        Spacer::new(7).into(),
    ];
    let canvas = compose::compose(&ctx, &mm58(), &contents).unwrap();
    assert_eq!(canvas.height(), 27);
}

// ============================================================================
// RASTER ENCODING
// ============================================================================

#[test]
fn test_checkerboard_round_trip() {
    let mut canvas = Canvas::new(8, 8);
    for y in 0..8 {
        for x in 0..8 {
            if (x + y) % 2 == 1 {
                canvas.put(x, y, 150);
            }
        }
    }
    let cmd = raster::encode(&canvas);
    assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 1, 0, 8, 0]);
    assert_eq!(&cmd[8..], &[0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA]);

    let decoded = raster::unpack(&cmd[8..], 1, 8);
    for y in 0..8 {
        for x in 0..8 {
            let expected = if (x + y) % 2 == 1 { BLACK } else { WHITE };
            assert_eq!(decoded.get(x, y), expected);
        }
    }
}

#[test]
fn test_width_is_padded_to_byte_multiple() {
    let cmd = raster::encode(&Canvas::new(385, 10));
    assert_eq!(&cmd[4..6], &49u16.to_le_bytes());
    assert_eq!(&cmd[6..8], &10u16.to_le_bytes());
    assert_eq!(cmd.len(), graphics::RASTER_HEADER_LEN + 49 * 10);
}

#[test]
fn test_job_carries_the_printed_bitmap() {
    let (mut printer, capture) = session(mm58().with_padding(8));
    printer
        .text(Text::new("CHURRA MART").align(Alignment::Center).size(36))
        .between("Churros x3", "4.50")
        .newline(12, 1)
        .qrcode(QrCode::new("https://example.invalid/r/1001").module_size(4));
    printer.print().unwrap();

    let canvas = printer.render().unwrap();
    let job = capture.bytes();
    assert_eq!(&job[..5], &[0x1B, 0x40, 0x1B, 0x64, 4]);
    assert_eq!(&job[job.len() - 6..], &[0x1B, 0x64, 4, 0x1D, 0x56, 0x00]);

    let commands = raster_commands(&job);
    assert_eq!(commands.len(), 1);
    let (row_bytes, height, data) = &commands[0];
    assert_eq!((*row_bytes, *height), (48, canvas.height()));
    assert_eq!(raster::unpack(data, *row_bytes, *height), raster::preview(&canvas));
}

// ============================================================================
// SESSION BEHAVIOUR
// ============================================================================

#[test]
fn test_rendering_is_idempotent() {
    let (mut printer, capture) = session(mm58().with_padding(4));
    printer
        .text(Text::new("Order 42").size(32).line_spacing(2))
        .flex(
            FlexGroup::new()
                .justify(Justify::Right)
                .align(VerticalAlign::Bottom)
                .item(Text::new("Qty 2").size(20))
                .item(QrCode::new("42").module_size(3)),
        )
        .newline(10, 2);

    let first = printer.build().unwrap();
    let second = printer.build().unwrap();
    assert_eq!(first, second);

    printer.print().unwrap();
    printer.print().unwrap();
    let jobs = capture.jobs();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0], jobs[1]);
    assert_eq!(jobs[0], first);
}

#[test]
fn test_clear_starts_over() {
    let (mut printer, _) = session(mm58());
    printer.text("first receipt");
    let first = printer.build().unwrap();
    printer.print().unwrap();

    printer.clear();
    assert!(printer.contents().is_empty());
    assert!(printer.pending().is_empty());

    printer.text("first receipt");
    assert_eq!(printer.build().unwrap(), first);
}

#[test]
fn test_unloadable_font_falls_back() {
    let config = mm58().with_font("/nonexistent/fonts/Receipt.ttf");
    let (mut with_missing, _) = session(config);
    let (mut builtin, _) = session(mm58());

    with_missing.text("Fallback");
    builtin.text("Fallback");
    assert_eq!(with_missing.build().unwrap(), builtin.build().unwrap());
}

#[test]
fn test_layout_failure_prints_nothing() {
    let (mut printer, capture) = session(mm58());
    let mut nested = FlexGroup::new().item(Text::new("deep"));
    for _ in 0..flex::MAX_DEPTH {
        nested = FlexGroup::new().item(nested);
    }
    printer.text("header").flex(nested);

    assert!(matches!(printer.print(), Err(PrintError::Layout(_))));
    assert!(capture.jobs().is_empty());
    assert!(printer.pending().is_empty());
}

// ============================================================================
// DOCUMENTS
// ============================================================================

#[test]
fn test_document_matches_builder_calls() {
    let doc = document::parse(
        r#"{
            "content": [
                {"type": "text", "content": "CHURRA MART", "align": "center", "size": "xl"},
                {"type": "between", "left": "Churros x3", "right": "4.50"},
                {"type": "spacer", "height": 10, "repeat": 2},
                {"type": "flex", "justify": "between", "items": [
                    {"type": "text", "content": "Paid", "size": 20},
                    {"type": "qr_code", "data": "1001", "module_size": 3, "border": 1}
                ]}
            ]
        }"#,
    )
    .unwrap();

    let (mut from_doc, _) = session(mm58());
    doc.apply(&mut from_doc, std::path::Path::new(".")).unwrap();

    let (mut from_code, _) = session(mm58());
    from_code
        .text(Text::new("CHURRA MART").align(Alignment::Center).size(36))
        .between("Churros x3", "4.50")
        .newline(10, 2)
        .flex(
            FlexGroup::new()
                .justify(Justify::Between)
                .item(Text::new("Paid").size(20))
                .item(QrCode::new("1001").module_size(3).border(1)),
        );

    assert_eq!(from_doc.contents(), from_code.contents());
    assert_eq!(from_doc.build().unwrap(), from_code.build().unwrap());
}
