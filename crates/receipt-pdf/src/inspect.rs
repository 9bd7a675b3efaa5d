//! Structural reader for generated receipts.
//!
//! Reads just enough of a document to check its bookkeeping: the
//! `startxref` pointer, the xref table, the trailer and individual objects
//! located through their xref offsets. It understands the classic
//! uncompressed layout that [`crate::assemble`] writes:
//!
//! ```text
//! %PDF-1.x
//! ... objects ...
//! xref
//! 0 N
//! 0000000000 65535 f
//! 0000000009 00000 n
//! ...
//! trailer
//! << /Size N /Root 1 0 R >>
//! startxref
//! OFFSET
//! %%EOF
//! ```

use std::collections::BTreeMap;
use std::ops::Range;
use std::str::FromStr;

use crate::error::ReceiptError;

/// Object reference (object number, generation number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjRef(pub u32, pub u16);

/// Cross-reference entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XrefEntry {
    pub offset: usize,
    pub generation: u16,
    pub in_use: bool,
}

/// Trailer information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerInfo {
    pub root: ObjRef,
    pub size: u32,
}

/// Parsed document structure
#[derive(Debug)]
pub struct DocumentStructure<'a> {
    pub version: String,
    pub xref_offset: usize,
    pub xref: BTreeMap<u32, XrefEntry>,
    pub trailer: TrailerInfo,
    bytes: &'a [u8],
}

impl<'a> DocumentStructure<'a> {
    /// Parse header, xref table and trailer
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ReceiptError> {
        if !bytes.starts_with(b"%PDF-") || bytes.len() < 8 {
            return Err(ReceiptError::ParseError("Not a valid PDF".into()));
        }

        let version = std::str::from_utf8(&bytes[5..8])
            .map_err(|_| ReceiptError::ParseError("Invalid version".into()))?
            .to_string();

        let xref_offset = find_startxref(bytes)?;
        let (xref, trailer_offset) = parse_xref_table(bytes, xref_offset)?;
        let trailer = parse_trailer(bytes, trailer_offset)?;

        Ok(DocumentStructure {
            version,
            xref_offset,
            xref,
            trailer,
            bytes,
        })
    }

    /// Raw bytes of object `id`, from its xref offset through `endobj`.
    ///
    /// A stream body is stepped over using its `/Length`, so keywords that
    /// appear inside the data do not end the object early.
    pub fn read_object(&self, id: u32) -> Result<&'a [u8], ReceiptError> {
        let entry = self
            .xref
            .get(&id)
            .ok_or_else(|| ReceiptError::ParseError(format!("Object {} not found", id)))?;

        if !entry.in_use {
            return Err(ReceiptError::ParseError(format!("Object {} is free", id)));
        }
        let body = self.bytes.get(entry.offset..).ok_or_else(|| {
            ReceiptError::ParseError(format!(
                "Object {} offset {} past end of file",
                id, entry.offset
            ))
        })?;

        let resume = stream_span(body)?.map_or(0, |span| span.end);
        let end = find(&body[resume..], b"endobj")
            .ok_or_else(|| ReceiptError::ParseError(format!("endobj not found for object {}", id)))?
            + resume
            + b"endobj".len();

        Ok(&body[..end])
    }

    /// Stream data of object `id` and the `/Length` it declares
    pub fn read_stream(&self, id: u32) -> Result<(&'a [u8], usize), ReceiptError> {
        let obj = self.read_object(id)?;
        let span = stream_span(obj)?
            .ok_or_else(|| ReceiptError::ParseError(format!("Object {} is not a stream", id)))?;
        let declared = span.len();

        Ok((&obj[span], declared))
    }

    /// Check offsets, trailer and stream length bookkeeping
    pub fn verify(&self) -> Result<(), ReceiptError> {
        for (&id, entry) in self.xref.iter().filter(|(_, e)| e.in_use) {
            let token = format!("{} {} obj", id, entry.generation);
            let at = self.bytes.get(entry.offset..).unwrap_or_default();
            if !at.starts_with(token.as_bytes()) {
                return Err(ReceiptError::ParseError(format!(
                    "xref offset {} does not start object {}",
                    entry.offset, id
                )));
            }
            self.read_object(id)?;
        }

        if self.trailer.size as usize != self.xref.len() {
            return Err(ReceiptError::ParseError(format!(
                "Trailer /Size {} but xref has {} entries",
                self.trailer.size,
                self.xref.len()
            )));
        }

        if self.trailer.root != ObjRef(1, 0) {
            return Err(ReceiptError::ParseError(format!(
                "Trailer /Root is {} {} R",
                self.trailer.root.0, self.trailer.root.1
            )));
        }

        let last = self
            .xref
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| ReceiptError::ParseError("Empty xref".into()))?;
        self.read_stream(last)?;

        Ok(())
    }
}

/// Offset named by the last `startxref` in the file tail.
///
/// Receipt text can contain the keyword too, but only the real pointer
/// follows the xref table.
fn find_startxref(bytes: &[u8]) -> Result<usize, ReceiptError> {
    let search_start = bytes.len().saturating_sub(1024);
    let pos = rfind(&bytes[search_start..], b"startxref")
        .ok_or_else(|| ReceiptError::ParseError("startxref not found".into()))?;

    let after = &bytes[search_start + pos + b"startxref".len()..];
    let offset: usize = next_token(after)
        .and_then(parse_token)
        .ok_or_else(|| ReceiptError::ParseError("Invalid startxref number".into()))?;

    if offset >= bytes.len() {
        return Err(ReceiptError::ParseError(format!(
            "startxref {} past end of file",
            offset
        )));
    }
    Ok(offset)
}

/// Parse xref table starting at given offset
fn parse_xref_table(
    bytes: &[u8],
    offset: usize,
) -> Result<(BTreeMap<u32, XrefEntry>, usize), ReceiptError> {
    let mut xref = BTreeMap::new();
    let mut pos = offset;

    if !bytes[pos..].starts_with(b"xref") {
        return Err(ReceiptError::ParseError("Expected 'xref' keyword".into()));
    }
    pos = skip_whitespace(bytes, pos + 4);

    // Subsections until "trailer"
    while pos < bytes.len() && bytes[pos] != b't' {
        let line_end = bytes[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| p + pos);
        let line = std::str::from_utf8(&bytes[pos..line_end])
            .map_err(|_| ReceiptError::ParseError("Invalid xref subsection".into()))?
            .trim();

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            return Err(ReceiptError::ParseError(format!(
                "Invalid xref subsection header: {:?}",
                line
            )));
        }

        let start_obj: u32 = parts[0]
            .parse()
            .map_err(|_| ReceiptError::ParseError("Invalid xref start".into()))?;
        let count: u32 = parts[1]
            .parse()
            .map_err(|_| ReceiptError::ParseError("Invalid xref count".into()))?;

        pos = line_end + 1;

        for i in 0..count {
            let entry_line = bytes
                .get(pos..pos + 20)
                .ok_or_else(|| ReceiptError::ParseError("Truncated xref entry".into()))?;
            if !entry_line.is_ascii() {
                return Err(ReceiptError::ParseError("Invalid xref entry".into()));
            }
            let entry_str = std::str::from_utf8(entry_line)
                .map_err(|_| ReceiptError::ParseError("Invalid xref entry".into()))?;

            let offset: usize = entry_str[0..10]
                .trim()
                .parse()
                .map_err(|_| ReceiptError::ParseError("Invalid xref offset".into()))?;
            let generation: u16 = entry_str[11..16]
                .trim()
                .parse()
                .map_err(|_| ReceiptError::ParseError("Invalid xref generation".into()))?;
            let in_use = match entry_line[17] {
                b'n' => true,
                b'f' => false,
                _ => return Err(ReceiptError::ParseError("Invalid xref entry type".into())),
            };

            let id = start_obj
                .checked_add(i)
                .ok_or_else(|| ReceiptError::ParseError("xref object number overflow".into()))?;
            xref.insert(
                id,
                XrefEntry {
                    offset,
                    generation,
                    in_use,
                },
            );

            pos += 20;
        }

        pos = skip_whitespace(bytes, pos);
    }

    Ok((xref, pos))
}

/// Parse trailer dictionary
fn parse_trailer(bytes: &[u8], offset: usize) -> Result<TrailerInfo, ReceiptError> {
    let rest = bytes.get(offset..).unwrap_or_default();
    if !rest.starts_with(b"trailer") {
        return Err(ReceiptError::ParseError("Expected 'trailer' keyword".into()));
    }

    let open = find(rest, b"<<")
        .ok_or_else(|| ReceiptError::ParseError("Trailer dict not found".into()))?;
    let close = find(&rest[open..], b">>")
        .ok_or_else(|| ReceiptError::ParseError("Trailer end not found".into()))?
        + open;
    let dict = &rest[open..close];

    let root = dict_ref(dict, b"/Root")
        .ok_or_else(|| ReceiptError::ParseError("No /Root in trailer".into()))?;
    let size = dict_value(dict, b"/Size")
        .ok_or_else(|| ReceiptError::ParseError("No /Size in trailer".into()))?;

    Ok(TrailerInfo { root, size })
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b'\n' | b'\r' | b' ') {
        pos += 1;
    }
    pos
}

/// Byte range of an object's stream data, or `None` when it has no stream.
///
/// The range is taken from the `/Length` in the object's dictionary and must
/// end exactly where `\nendstream` begins.
fn stream_span(object: &[u8]) -> Result<Option<Range<usize>>, ReceiptError> {
    let keyword = match find(object, b"stream\n") {
        Some(at) => at,
        None => return Ok(None),
    };
    let dict = &object[..keyword];
    // The keyword belongs to a later object
    if find(dict, b"endobj").is_some() {
        return Ok(None);
    }

    let length: usize = dict_value(dict, b"/Length")
        .ok_or_else(|| ReceiptError::ParseError("Stream has no /Length".into()))?;
    let start = keyword + b"stream\n".len();
    let end = start
        .checked_add(length)
        .filter(|&end| object[end.min(object.len())..].starts_with(b"\nendstream"))
        .ok_or_else(|| {
            ReceiptError::ParseError(format!(
                "Stream /Length {} does not end at endstream",
                length
            ))
        })?;

    Ok(Some(start..end))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// First whitespace-delimited token in `bytes`
fn next_token(bytes: &[u8]) -> Option<&[u8]> {
    tokens(bytes).next()
}

fn tokens(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes
        .split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
}

fn parse_token<T: FromStr>(token: &[u8]) -> Option<T> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Number following `key` in a dictionary, as in `/Size 7`
fn dict_value<T: FromStr>(dict: &[u8], key: &[u8]) -> Option<T> {
    let at = find(dict, key)?;
    next_token(&dict[at + key.len()..]).and_then(parse_token)
}

/// Indirect reference following `key` in a dictionary, as in `/Root 1 0 R`
fn dict_ref(dict: &[u8], key: &[u8]) -> Option<ObjRef> {
    let at = find(dict, key)?;
    let mut rest = tokens(&dict[at + key.len()..]);
    let number = parse_token(rest.next()?)?;
    let generation = parse_token(rest.next()?)?;
    (rest.next()? == b"R").then_some(ObjRef(number, generation))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn parse_never_panics(input in prop::collection::vec(any::<u8>(), 0..600)) {
            let _ = DocumentStructure::parse(&input).map(|doc| doc.verify());
        }

        #[test]
        fn parse_never_panics_on_truncation(cut in 0usize..400) {
            let bytes = crate::assemble::assemble("BT\n/F1 9 Tf\n1 2 Td\n(x) Tj\nET");
            let end = bytes.len().saturating_sub(cut);
            let _ = DocumentStructure::parse(&bytes[..end]).map(|doc| doc.verify());
        }
    }
}
