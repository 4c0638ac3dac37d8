//! GTF/GFF seqname renaming
//!
//! GTF has 9 tab-separated fields; the chromosome is the first one
//! (seqname). Lines starting with `#` are comments or pragmas such as
//! `#!genome-build GRCh38` and are never touched.

use crate::core::ChromMap;
use crate::formats::rename::{LineEdit, LineKind};
use memchr::{memchr, memchr_iter};

/// Number of tab-separated fields in a GTF/GFF record
pub const GTF_FIELD_COUNT: usize = 9;

/// GTF/GFF parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GtfParseError {
    EmptyLine,
    TooFewFields { expected: usize, found: usize },
}

impl std::fmt::Display for GtfParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GtfParseError::EmptyLine => write!(f, "Empty line"),
            GtfParseError::TooFewFields { expected, found } => {
                write!(f, "Too few fields: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for GtfParseError {}

/// Zero-copy view of the parts of a GTF record the renamer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GtfRecordView<'a> {
    /// Sequence name (chromosome)
    pub seqname: &'a [u8],
    /// Everything from the first tab on
    pub rest: &'a [u8],
    /// Number of tab-separated fields
    pub field_count: usize,
}

impl<'a> GtfRecordView<'a> {
    /// Parse a record line (terminator already stripped)
    pub fn parse(content: &'a [u8]) -> Result<Self, GtfParseError> {
        if content.is_empty() {
            return Err(GtfParseError::EmptyLine);
        }

        let field_count = memchr_iter(b'\t', content).count() + 1;
        if field_count < GTF_FIELD_COUNT {
            return Err(GtfParseError::TooFewFields {
                expected: GTF_FIELD_COUNT,
                found: field_count,
            });
        }

        // At least 8 tabs exist, so there is a first one
        let seqname_end = memchr(b'\t', content).unwrap_or(content.len());
        let (seqname, rest) = content.split_at(seqname_end);
        Ok(Self {
            seqname,
            rest,
            field_count,
        })
    }
}

/// True for `#` comment and `#!` pragma lines
#[inline]
pub fn is_comment(content: &[u8]) -> bool {
    content.first() == Some(&b'#')
}

/// Decide how a single GTF line is rewritten
///
/// Records with fewer than 9 fields are passed through unchanged and
/// reported as malformed, even when their first field is a known name.
pub fn edit_line<'m>(content: &[u8], map: &'m ChromMap) -> LineEdit<'m> {
    if is_comment(content) {
        return LineEdit::Keep(LineKind::Comment);
    }

    let view = match GtfRecordView::parse(content) {
        Ok(view) => view,
        Err(GtfParseError::EmptyLine) => return LineEdit::Keep(LineKind::Blank),
        Err(GtfParseError::TooFewFields { .. }) => return LineEdit::Keep(LineKind::Malformed),
    };

    match map.get(view.seqname) {
        Some(target) => LineEdit::Replace {
            range: 0..view.seqname.len(),
            with: target,
        },
        None => LineEdit::Unmapped {
            range: 0..view.seqname.len(),
        },
    }
}
