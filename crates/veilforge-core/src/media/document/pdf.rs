//! Hiding in PDF files through an incremental update.
//!
//! The region becomes the body of an extra stream object. A classic cross
//! reference section with a `/Prev` link to the previous one is appended, so
//! readers still find every original object, `/Root` and `/Info` included.

use log::debug;

use crate::media::frame;
use crate::media::{CarrierFormat, Concealer};
use crate::{Result, VeilError};

const FORMAT: &str = "PDF document";
const PAYLOAD_TYPE: &[u8] = b"/Type /VeilForgePayload";
/// smallest capacity, even for tiny documents
pub const MIN_SLOT_CAPACITY: usize = 4096;

/// What an incremental update has to carry over from the last trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Trailer {
    size: u32,
    root: String,
    info: Option<String>,
    startxref: usize,
}

#[derive(Debug, Clone)]
pub struct PdfCarrier {
    bytes: Vec<u8>,
    trailer: Trailer,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

fn skip_whitespace(bytes: &[u8], mut at: usize) -> usize {
    while bytes.get(at).is_some_and(|b| b.is_ascii_whitespace()) {
        at += 1;
    }
    at
}

/// parses an unsigned decimal number, returns it and the offset after it
fn number_at(bytes: &[u8], at: usize) -> Option<(usize, usize)> {
    let start = skip_whitespace(bytes, at);
    let len = bytes.get(start..)?.iter().take_while(|b| b.is_ascii_digit()).count();
    let digits = std::str::from_utf8(&bytes[start..start + len]).ok()?;

    Some((digits.parse().ok()?, start + len))
}

/// returns the dictionary starting at the first `<<` after `from`, nested
/// dictionaries included
fn dictionary_at(bytes: &[u8], from: usize) -> Option<&[u8]> {
    let start = find(bytes, b"<<", from)?;
    let mut depth = 0usize;
    let mut at = start;
    while at + 1 < bytes.len() {
        match &bytes[at..at + 2] {
            b"<<" => {
                depth += 1;
                at += 2;
            }
            b">>" => {
                depth -= 1;
                at += 2;
                if depth == 0 {
                    return Some(&bytes[start..at]);
                }
            }
            _ => at += 1,
        }
    }

    None
}

/// reads an indirect reference like `/Root 1 0 R`
fn reference(dict: &[u8], key: &[u8]) -> Option<String> {
    let at = find(dict, key, 0)? + key.len();
    let (object, at) = number_at(dict, at)?;
    let (generation, at) = number_at(dict, at)?;
    let at = skip_whitespace(dict, at);

    (dict.get(at) == Some(&b'R')).then(|| format!("{object} {generation} R"))
}

impl Trailer {
    fn read(bytes: &[u8]) -> Result<Self> {
        let invalid = |reason: &str| VeilError::invalid_carrier(FORMAT, reason);

        let keyword = rfind(bytes, b"startxref").ok_or_else(|| invalid("missing startxref"))?;
        let (startxref, _) = number_at(bytes, keyword + b"startxref".len())
            .ok_or_else(|| invalid("startxref has no offset"))?;
        let section = bytes
            .get(startxref..)
            .ok_or_else(|| invalid("startxref points past the end"))?;

        let dict = if section.starts_with(b"xref") {
            let trailer =
                find(bytes, b"trailer", startxref).ok_or_else(|| invalid("missing trailer"))?;
            dictionary_at(bytes, trailer)
        } else if number_at(bytes, startxref).is_some() {
            // cross reference stream, its dictionary doubles as trailer
            dictionary_at(bytes, startxref)
        } else {
            None
        };
        let dict = dict.ok_or_else(|| invalid("unreadable trailer dictionary"))?;

        let size_at = find(dict, b"/Size", 0).ok_or_else(|| invalid("trailer without /Size"))?;
        let (size, _) =
            number_at(dict, size_at + 5).ok_or_else(|| invalid("trailer with a bad /Size"))?;
        let size = u32::try_from(size).map_err(|_| invalid("trailer with a bad /Size"))?;
        let root = reference(dict, b"/Root").ok_or_else(|| invalid("trailer without /Root"))?;

        Ok(Self {
            size,
            root,
            info: reference(dict, b"/Info"),
            startxref,
        })
    }
}

impl PdfCarrier {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(VeilError::invalid_carrier(FORMAT, "missing header"));
        }
        let trailer = Trailer::read(bytes)?;
        debug!(
            "{FORMAT} with {} objects, root {}, last xref at {}",
            trailer.size, trailer.root, trailer.startxref
        );

        Ok(Self {
            bytes: bytes.to_vec(),
            trailer,
        })
    }
}

impl Concealer for PdfCarrier {
    fn format(&self) -> CarrierFormat {
        CarrierFormat::Pdf
    }

    fn raw_capacity(&self) -> usize {
        (self.bytes.len() / 4).max(MIN_SLOT_CAPACITY)
    }

    fn embed(&self, region: &[u8]) -> Result<Vec<u8>> {
        let framed = frame::wrap(region)?;
        if framed.len() > self.raw_capacity() {
            return Err(VeilError::CapacityExceeded {
                required: framed.len(),
                capacity: self.raw_capacity(),
            });
        }

        let object = self.trailer.size;
        let mut out = self.bytes.clone();
        if out.last() != Some(&b'\n') {
            out.push(b'\n');
        }

        let object_offset = out.len();
        out.extend_from_slice(
            format!(
                "{object} 0 obj\n<< /Type /VeilForgePayload /Length {} >>\nstream\n",
                framed.len()
            )
            .as_bytes(),
        );
        out.extend_from_slice(&framed);
        out.extend_from_slice(b"\nendstream\nendobj\n");

        let xref_offset = out.len();
        let info = self
            .trailer
            .info
            .as_ref()
            .map(|info| format!(" /Info {info}"))
            .unwrap_or_default();
        let update = format!(
            "xref\n0 1\n0000000000 65535 f \n{object} 1\n{object_offset:010} 00000 n \n\
             trailer\n<< /Size {} /Root {}{info} /Prev {} >>\nstartxref\n{xref_offset}\n%%EOF\n",
            object + 1,
            self.trailer.root,
            self.trailer.startxref
        );
        out.extend_from_slice(update.as_bytes());

        Ok(out)
    }

    fn extract(&self) -> Result<Vec<u8>> {
        let object = rfind(&self.bytes, PAYLOAD_TYPE).ok_or(VeilError::NoHiddenDataFound)?;
        let length_at =
            find(&self.bytes, b"/Length", object).ok_or(VeilError::NoHiddenDataFound)?;
        let (length, after) =
            number_at(&self.bytes, length_at + 7).ok_or(VeilError::NoHiddenDataFound)?;

        let keyword = find(&self.bytes, b"stream", after).ok_or(VeilError::NoHiddenDataFound)?;
        let mut start = keyword + b"stream".len();
        if self.bytes.get(start) == Some(&b'\r') {
            start += 1;
        }
        if self.bytes.get(start) == Some(&b'\n') {
            start += 1;
        }
        let body = start
            .checked_add(length)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| {
                VeilError::EnvelopeCorrupt(format!("payload stream declares {length} bytes"))
            })?;

        frame::unwrap(body).map(|region| region.to_vec())
    }
}
