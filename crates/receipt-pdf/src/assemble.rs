//! Single-page PDF assembly.
//!
//! The object table is fixed:
//! ```text
//! 1 Catalog  -> /Pages 2 0 R
//! 2 Pages    -> /Kids [3 0 R] /Count 1
//! 3 Page     -> /Parent 2 0 R, /Font << /F1 4 0 R /F2 5 0 R >>, /Contents 6 0 R
//! 4 Font     Helvetica
//! 5 Font     Helvetica-Bold
//! 6 Contents << /Length N >> stream ... endstream
//! ```
//!
//! Serialization runs in two passes: every object body is rendered first,
//! then the bodies are concatenated while the running byte length is
//! recorded as each object's xref offset.

use crate::content::FontRef;
use crate::layout::{PAGE_HEIGHT, PAGE_WIDTH};

pub const PDF_HEADER: &str = "%PDF-1.4\n";

pub const CATALOG_ID: u32 = 1;
pub const PAGES_ID: u32 = 2;
pub const PAGE_ID: u32 = 3;
pub const FONT_REGULAR_ID: u32 = 4;
pub const FONT_BOLD_ID: u32 = 5;
pub const CONTENTS_ID: u32 = 6;
pub const OBJECT_COUNT: u32 = 6;

/// Object number holding a font resource
pub fn font_object_id(font: FontRef) -> u32 {
    match font {
        FontRef::Regular => FONT_REGULAR_ID,
        FontRef::Bold => FONT_BOLD_ID,
    }
}

/// Absolute byte offset of each object's `n 0 obj` token, by object number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteOffsetTable {
    offsets: Vec<usize>,
}

impl ByteOffsetTable {
    fn push(&mut self, offset: usize) {
        self.offsets.push(offset);
    }

    /// Offset of object `id` (1-indexed)
    pub fn get(&self, id: u32) -> Option<usize> {
        let index = (id as usize).checked_sub(1)?;
        self.offsets.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// (object number, offset) pairs in object order
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| (i as u32 + 1, *offset))
    }
}

/// A serialized document with the bookkeeping used to write it
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    pub offsets: ByteOffsetTable,
    pub xref_offset: usize,
}

fn font_dict(font: FontRef) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.base_font()
    )
}

/// Pass 1: render every object body, in object-number order
pub fn object_bodies(content: &str) -> Vec<String> {
    let catalog = format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES_ID);
    let pages = format!("<< /Type /Pages /Kids [{} 0 R] /Count 1 >>", PAGE_ID);
    let page = format!(
        "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {} {}] \
         /Resources << /Font << /{} {} 0 R /{} {} 0 R >> >> /Contents {} 0 R >>",
        PAGES_ID,
        PAGE_WIDTH,
        PAGE_HEIGHT,
        FontRef::Regular.resource_name(),
        font_object_id(FontRef::Regular),
        FontRef::Bold.resource_name(),
        font_object_id(FontRef::Bold),
        CONTENTS_ID,
    );
    let contents = format!(
        "<< /Length {} >>\nstream\n{}\nendstream",
        content.len(),
        content
    );

    vec![
        catalog,
        pages,
        page,
        font_dict(FontRef::Regular),
        font_dict(FontRef::Bold),
        contents,
    ]
}

/// Pass 2: concatenate bodies, recording offsets, then write xref and trailer
pub fn serialize(bodies: &[String]) -> AssembledDocument {
    let mut output = String::new();
    let mut offsets = ByteOffsetTable::default();

    output.push_str(PDF_HEADER);

    for (index, body) in bodies.iter().enumerate() {
        let id = index + 1;
        offsets.push(output.len());
        output.push_str(&format!("{} 0 obj\n{}\nendobj\n", id, body));
    }

    // +1 for the free-list head, object 0
    let size = bodies.len() + 1;
    let xref_offset = output.len();
    output.push_str("xref\n");
    output.push_str(&format!("0 {}\n", size));
    output.push_str("0000000000 65535 f \n");
    for (_, offset) in offsets.iter() {
        output.push_str(&format!("{:010} 00000 n \n", offset));
    }

    output.push_str(&format!(
        "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF",
        size, CATALOG_ID, xref_offset
    ));

    tracing::debug!(
        objects = bodies.len(),
        xref_offset,
        bytes = output.len(),
        "PDF serialized"
    );

    AssembledDocument {
        bytes: output.into_bytes(),
        offsets,
        xref_offset,
    }
}

/// Wrap a finished content stream into a complete single-page PDF
pub fn assemble_document(content: &str) -> AssembledDocument {
    let bodies = object_bodies(content);
    debug_assert_eq!(bodies.len(), OBJECT_COUNT as usize);
    serialize(&bodies)
}

/// Wrap a finished content stream into complete PDF bytes
pub fn assemble(content: &str) -> Vec<u8> {
    assemble_document(content).bytes
}
