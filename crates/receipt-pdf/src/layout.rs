//! Single-page receipt layout.
//!
//! Layout is a chain of steps over [`ReceiptLayout`], each consuming the
//! layout and returning it with new draw operations appended and the
//! vertical cursor moved down. The cursor starts under the header band and
//! only ever decreases. Overflow past the footer is not detected; receipts
//! are expected to fit on one page.

use chrono::{DateTime, Utc};
use receipt_types::ReceiptRecord;

use crate::config::ReceiptConfig;
use crate::content::{DrawOp, FontRef, Rgb};
use crate::format::{format_amount, format_datetime, format_timestamp};
use crate::sanitize::{sanitize, sanitize_or_placeholder};
use crate::wrap::wrap;

/// A4 in points
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

pub const MARGIN: f64 = 48.0;
pub const HEADER_HEIGHT: f64 = 96.0;
pub const ACCENT_HEIGHT: f64 = 2.0;
pub const GUTTER: f64 = 24.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
pub const COLUMN_WIDTH: f64 = (CONTENT_WIDTH - GUTTER) / 2.0;

/// Space between the accent bar and the first section label
const HEADER_PADDING: f64 = 30.0;
/// Section label baseline to first field value baseline
const SECTION_HEADING_HEIGHT: f64 = 28.0;
/// Divider offset below a section label
const DIVIDER_OFFSET: f64 = 6.0;
const ROW_HEIGHT: f64 = 34.0;
/// Extra space after a section's last row, for 40pt between sections
const SECTION_SPACING: f64 = 6.0;
pub const LINE_HEIGHT: f64 = 14.0;
/// Field labels sit this far above their value
const FIELD_LABEL_RISE: f64 = 12.0;

const TITLE_SIZE: f64 = 20.0;
const SUBTITLE_SIZE: f64 = 10.0;
const SECTION_LABEL_SIZE: f64 = 8.0;
const FIELD_LABEL_SIZE: f64 = 8.0;
const FIELD_VALUE_SIZE: f64 = 11.0;
pub const PARAGRAPH_SIZE: f64 = 10.0;
const FOOTER_SIZE: f64 = 8.0;

const HEADER_FILL: Rgb = Rgb(0.09, 0.13, 0.24);
const ACCENT: Rgb = Rgb(0.16, 0.55, 0.96);
const HEADER_TEXT: Rgb = Rgb(1.0, 1.0, 1.0);
const HEADER_MUTED: Rgb = Rgb(0.8, 0.84, 0.9);
const INK: Rgb = Rgb(0.09, 0.11, 0.15);
const MUTED: Rgb = Rgb(0.45, 0.49, 0.56);
const RULE: Rgb = Rgb(0.86, 0.88, 0.91);
const RULE_WIDTH: f64 = 0.5;

/// Draw operations for one page plus the running vertical cursor
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLayout {
    ops: Vec<DrawOp>,
    cursor_y: f64,
}

impl Default for ReceiptLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptLayout {
    /// Empty page with the cursor at the top edge
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            cursor_y: PAGE_HEIGHT,
        }
    }

    pub fn cursor_y(&self) -> f64 {
        self.cursor_y
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    fn advance(mut self, dy: f64) -> Self {
        debug_assert!(dy >= 0.0, "layout cursor moved up by {}", -dy);
        self.cursor_y -= dy.max(0.0);
        self
    }

    fn move_to(mut self, y: f64) -> Self {
        debug_assert!(y <= self.cursor_y, "layout cursor moved up to {}", y);
        self.cursor_y = y.min(self.cursor_y);
        self
    }

    fn fill(mut self, color: Rgb) -> Self {
        self.ops.push(DrawOp::FillColor(color));
        self
    }

    fn stroke(mut self, color: Rgb) -> Self {
        self.ops.push(DrawOp::StrokeColor(color));
        self
    }

    fn text(mut self, text: String, x: f64, y: f64, size: f64, font: FontRef) -> Self {
        self.ops.push(DrawOp::Text {
            text,
            x,
            y,
            size,
            font,
        });
        self
    }

    fn rule(mut self, y: f64) -> Self {
        self.ops.push(DrawOp::Line {
            x1: MARGIN,
            y1: y,
            x2: PAGE_WIDTH - MARGIN,
            y2: y,
            width: RULE_WIDTH,
        });
        self
    }

    /// Header band, accent bar, title and subtitle. Leaves the cursor just
    /// under the band.
    pub fn header(mut self, title: &str, subtitle: &str) -> Self {
        let band_bottom = PAGE_HEIGHT - HEADER_HEIGHT;
        self = self.fill(HEADER_FILL);
        self.ops.push(DrawOp::Rect {
            x: 0.0,
            y: band_bottom,
            w: PAGE_WIDTH,
            h: HEADER_HEIGHT,
        });
        self = self.fill(ACCENT);
        self.ops.push(DrawOp::Rect {
            x: 0.0,
            y: band_bottom - ACCENT_HEIGHT,
            w: PAGE_WIDTH,
            h: ACCENT_HEIGHT,
        });

        self.fill(HEADER_TEXT)
            .text(
                sanitize_or_placeholder(title),
                MARGIN,
                PAGE_HEIGHT - 44.0,
                TITLE_SIZE,
                FontRef::Bold,
            )
            .fill(HEADER_MUTED)
            .text(
                sanitize_or_placeholder(subtitle),
                MARGIN,
                PAGE_HEIGHT - 66.0,
                SUBTITLE_SIZE,
                FontRef::Regular,
            )
            .move_to(band_bottom - ACCENT_HEIGHT - HEADER_PADDING)
    }

    /// Small-caps section label with a divider underneath
    pub fn section(self, label: &str) -> Self {
        let y = self.cursor_y;
        self.fill(ACCENT)
            .text(
                sanitize(label).to_uppercase(),
                MARGIN,
                y,
                SECTION_LABEL_SIZE,
                FontRef::Bold,
            )
            .stroke(RULE)
            .rule(y - DIVIDER_OFFSET)
            .advance(SECTION_HEADING_HEIGHT)
    }

    /// Muted label above a bold value, both at `x`, value on the cursor line
    pub fn field(self, label: &str, value: &str, x: f64) -> Self {
        let y = self.cursor_y;
        self.fill(MUTED)
            .text(
                sanitize_or_placeholder(label),
                x,
                y + FIELD_LABEL_RISE,
                FIELD_LABEL_SIZE,
                FontRef::Regular,
            )
            .fill(INK)
            .text(
                sanitize_or_placeholder(value),
                x,
                y,
                FIELD_VALUE_SIZE,
                FontRef::Bold,
            )
    }

    /// One row of the two-column grid, then the cursor moves down a row
    pub fn field_row(self, left: (&str, &str), right: Option<(&str, &str)>) -> Self {
        let layout = self.field(left.0, left.1, MARGIN);
        let layout = match right {
            Some((label, value)) => layout.field(label, value, MARGIN + COLUMN_WIDTH + GUTTER),
            None => layout,
        };
        layout.advance(ROW_HEIGHT)
    }

    /// Full-width field whose value is word-wrapped, one text draw per line
    pub fn paragraph_field(self, label: &str, text: &str) -> Self {
        let y = self.cursor_y;
        let mut layout = self
            .fill(MUTED)
            .text(
                sanitize_or_placeholder(label),
                MARGIN,
                y + FIELD_LABEL_RISE,
                FIELD_LABEL_SIZE,
                FontRef::Regular,
            )
            .fill(INK);

        for line in wrap(text, CONTENT_WIDTH, PARAGRAPH_SIZE) {
            let y = layout.cursor_y;
            layout = layout
                .text(line, MARGIN, y, PARAGRAPH_SIZE, FontRef::Regular)
                .advance(LINE_HEIGHT);
        }

        layout.advance(ROW_HEIGHT - LINE_HEIGHT)
    }

    pub fn end_section(self) -> Self {
        self.advance(SECTION_SPACING)
    }

    /// Fixed footer near the bottom margin. Does not move the cursor.
    pub fn footer(self, generated_at: &str, note: &str) -> Self {
        self.stroke(RULE)
            .rule(MARGIN + 36.0)
            .fill(MUTED)
            .text(
                format!("Generated at {}", sanitize_or_placeholder(generated_at)),
                MARGIN,
                MARGIN + 20.0,
                FOOTER_SIZE,
                FontRef::Regular,
            )
            .text(
                sanitize_or_placeholder(note),
                MARGIN,
                MARGIN + 8.0,
                FOOTER_SIZE,
                FontRef::Regular,
            )
    }
}

/// Lay out a full receipt for `record`
pub fn layout_receipt(
    record: &ReceiptRecord,
    config: &ReceiptConfig,
    generated_at: &DateTime<Utc>,
) -> ReceiptLayout {
    let created = format_timestamp(record.created_at.as_deref());
    let executed = format_timestamp(record.executed_at.as_deref());
    let gross = format_amount(record.gross(), &config.currency_suffix);
    let net = format_amount(record.net(), &config.currency_suffix);

    let mut layout = ReceiptLayout::new()
        .header(&config.title, &config.subtitle)
        .section("Summary")
        .field_row(
            ("Payout ID", record.id.as_str()),
            Some(("Status", record.status.label())),
        )
        .end_section()
        .section("Dates")
        .field_row(
            ("Created", created.as_str()),
            Some(("Executed", executed.as_str())),
        );

    if let Some(failed_at) = record.failed_at.as_deref().filter(|s| !s.trim().is_empty()) {
        let failed = format_timestamp(Some(failed_at));
        layout = layout.field_row(("Failed", failed.as_str()), None);
    }

    layout = layout
        .end_section()
        .section("Amounts")
        .field_row(
            ("Gross Amount", gross.as_str()),
            Some(("Net Amount", net.as_str())),
        )
        .end_section()
        .section("Destination")
        .paragraph_field("Account", &record.destination)
        .end_section();

    if let Some(reason) = record.failure_reason() {
        layout = layout
            .section("Failure Reason")
            .paragraph_field("Reason", reason)
            .end_section();
    }

    tracing::debug!(
        ops = layout.ops().len(),
        cursor_y = layout.cursor_y(),
        "Receipt laid out"
    );

    layout.footer(&format_datetime(generated_at), &config.footer_note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use receipt_types::PayoutStatus;

    fn texts(layout: &ReceiptLayout) -> Vec<&str> {
        layout
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    fn completed_record() -> ReceiptRecord {
        ReceiptRecord {
            id: "po_123".into(),
            status: PayoutStatus::Completed,
            created_at: Some("2024-03-01T10:00:00Z".into()),
            executed_at: Some("2024-03-02T09:15:00Z".into()),
            gross_amount: Some(455.0),
            net_amount: Some(450.0),
            destination: "Bank ****4567".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_column_geometry() {
        assert!((CONTENT_WIDTH - 499.28).abs() < 1e-9);
        assert!((COLUMN_WIDTH - 237.64).abs() < 1e-9);
    }

    #[test]
    fn test_header_places_cursor_below_band() {
        let layout = ReceiptLayout::new().header("Title", "Sub");
        assert_eq!(
            layout.cursor_y(),
            PAGE_HEIGHT - HEADER_HEIGHT - ACCENT_HEIGHT - HEADER_PADDING
        );
        assert_eq!(
            layout.ops()[1],
            DrawOp::Rect {
                x: 0.0,
                y: PAGE_HEIGHT - HEADER_HEIGHT,
                w: PAGE_WIDTH,
                h: HEADER_HEIGHT
            }
        );
        assert_eq!(texts(&layout), vec!["Title", "Sub"]);
    }

    #[test]
    fn test_section_emits_label_and_divider() {
        let layout = ReceiptLayout::new().section("Amounts");
        assert_eq!(texts(&layout), vec!["AMOUNTS"]);
        assert!(layout.ops().iter().any(|op| matches!(
            op,
            DrawOp::Line { y1, y2, .. } if *y1 == PAGE_HEIGHT - DIVIDER_OFFSET && *y2 == *y1
        )));
        assert_eq!(layout.cursor_y(), PAGE_HEIGHT - SECTION_HEADING_HEIGHT);
    }

    #[test]
    fn test_field_label_above_value() {
        let layout = ReceiptLayout::new().field("Net Amount", "450.00 US$", 100.0);
        let positions: Vec<(f64, f64)> = layout
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(
            positions,
            vec![(100.0, PAGE_HEIGHT + FIELD_LABEL_RISE), (100.0, PAGE_HEIGHT)]
        );
        // A bare field does not move the cursor
        assert_eq!(layout.cursor_y(), PAGE_HEIGHT);
    }

    #[test]
    fn test_field_row_columns() {
        let layout = ReceiptLayout::new().field_row(("A", "1"), Some(("B", "2")));
        let xs: Vec<f64> = layout
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        let right = MARGIN + COLUMN_WIDTH + GUTTER;
        assert_eq!(xs, vec![MARGIN, MARGIN, right, right]);
        assert_eq!(layout.cursor_y(), PAGE_HEIGHT - ROW_HEIGHT);
    }

    #[test]
    fn test_empty_value_gets_placeholder() {
        let layout = ReceiptLayout::new().field("Label", "", MARGIN);
        assert_eq!(texts(&layout), vec!["Label", "--"]);
    }

    #[test]
    fn test_paragraph_advances_per_line() {
        let long = "word ".repeat(60);
        let lines = wrap(&long, CONTENT_WIDTH, PARAGRAPH_SIZE).len();
        assert!(lines > 1);
        let layout = ReceiptLayout::new().paragraph_field("Reason", &long);
        assert_eq!(texts(&layout).len(), lines + 1);
        let expected = PAGE_HEIGHT - LINE_HEIGHT * lines as f64 - (ROW_HEIGHT - LINE_HEIGHT);
        assert!((layout.cursor_y() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_completed_receipt_fields() {
        let layout = layout_receipt(&completed_record(), &ReceiptConfig::default(), &generated_at());
        let texts = texts(&layout);
        for expected in [
            "Payout Receipt",
            "SUMMARY",
            "po_123",
            "Completed",
            "2024-03-01 10:00 UTC",
            "2024-03-02 09:15 UTC",
            "Gross Amount",
            "455.00 US$",
            "Net Amount",
            "450.00 US$",
            "Bank ****4567",
            "Generated at 2024-03-05 12:00 UTC",
        ] {
            assert!(texts.contains(&expected), "missing {:?}", expected);
        }
        assert!(!texts.contains(&"FAILURE REASON"));
        assert!(!texts.contains(&"Failed"));
    }

    #[test]
    fn test_failed_receipt_sections() {
        let record = ReceiptRecord {
            id: "po_9".into(),
            status: PayoutStatus::Failed,
            failed_at: Some("2024-03-03T08:00:00Z".into()),
            amount: Some(20.0),
            failure_reason: Some("Destination account rejected.".into()),
            ..Default::default()
        };
        let layout = layout_receipt(&record, &ReceiptConfig::default(), &generated_at());
        let texts = texts(&layout);
        assert!(texts.contains(&"FAILURE REASON"));
        assert!(texts.contains(&"Destination account rejected."));
        assert!(texts.contains(&"2024-03-03 08:00 UTC"));
        assert!(texts.contains(&"20.00 US$"));
        // Created / Executed are absent and fall back to the placeholder
        assert_eq!(texts.iter().filter(|t| **t == "--").count(), 3);
    }

    #[test]
    fn test_content_stays_above_footer() {
        let record = ReceiptRecord {
            failed_at: Some("2024-03-03T08:00:00Z".into()),
            failure_reason: Some("rejected ".repeat(40)),
            destination: "Bank account ".repeat(20),
            ..completed_record()
        };
        let layout = layout_receipt(&record, &ReceiptConfig::default(), &generated_at());
        assert!(layout.cursor_y() > MARGIN + 36.0);
    }
}
