//! Payout receipt PDF generation
//!
//! Builds a single-page PDF receipt for a payout from first principles, with
//! no PDF library involved:
//! - `sanitize` / `wrap`: text reduction to printable ASCII and line wrapping
//! - `layout`: positioned draw operations for the page
//! - `content`: draw operations to content stream operators
//! - `assemble`: object table, xref and trailer with exact byte offsets
//! - `inspect`: structural reader used to check generated documents
//!
//! Generation is pure: the same record, config and timestamp always produce
//! the same bytes.

pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod format;
pub mod inspect;
pub mod layout;
pub mod sanitize;
pub mod wrap;

use chrono::{DateTime, Utc};

pub use assemble::{assemble, AssembledDocument, ByteOffsetTable};
pub use config::ReceiptConfig;
pub use error::ReceiptError;
pub use inspect::DocumentStructure;
pub use layout::{layout_receipt, ReceiptLayout};
pub use receipt_types::{PayoutStatus, ReceiptRecord};
pub use sanitize::{escape, sanitize};
pub use wrap::wrap;

/// File extension of generated receipts
pub const RECEIPT_EXTENSION: &str = "pdf";

/// Render `record` as a complete PDF document
pub fn generate_receipt(
    record: &ReceiptRecord,
    config: &ReceiptConfig,
    generated_at: DateTime<Utc>,
) -> Vec<u8> {
    generate_receipt_document(record, config, generated_at).bytes
}

/// Render `record`, keeping the offset table alongside the bytes
pub fn generate_receipt_document(
    record: &ReceiptRecord,
    config: &ReceiptConfig,
    generated_at: DateTime<Utc>,
) -> AssembledDocument {
    let layout = layout_receipt(record, config, &generated_at);
    let stream = content::emit(layout.ops());
    let document = assemble::assemble_document(&stream);

    tracing::debug!(
        id = %record.id,
        stream_bytes = stream.len(),
        total_bytes = document.bytes.len(),
        "Receipt generated"
    );

    document
}

/// Decode a dashboard JSON record and render it
pub fn generate_receipt_from_json(
    json: &str,
    config: &ReceiptConfig,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReceiptError> {
    let record = ReceiptRecord::from_json(json)?;
    Ok(generate_receipt(&record, config, generated_at))
}

/// File name for a saved receipt: `<prefix>_<id>.pdf`, prefix lowercased.
///
/// Characters in the id that could form a path are replaced with `_`.
pub fn receipt_filename(prefix: &str, id: &str) -> String {
    let safe_id: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe_id = if safe_id.is_empty() || safe_id.chars().all(|c| c == '.') {
        safe_id.replace('.', "_")
    } else {
        safe_id
    };

    format!(
        "{}_{}.{}",
        prefix.to_lowercase(),
        safe_id,
        RECEIPT_EXTENSION
    )
}
