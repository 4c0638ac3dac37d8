//! FASTA header renaming
//!
//! Only header lines carry a chromosome identifier: the first
//! whitespace-delimited token after `>`. Everything after that token,
//! separator included, is kept as is:
//!
//! ```text
//! >1 dna:chromosome chromosome:GRCh38:1:1:248956422:1 REF
//!  ^ identifier
//! ```

use crate::core::ChromMap;
use crate::formats::rename::{LineEdit, LineKind};
use memchr::memchr2;

/// Zero-copy view of a FASTA header line (terminator already stripped)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastaHeaderView<'a> {
    /// Sequence name, between `>` and the first space or tab
    pub name: &'a [u8],
    /// Separator and description, possibly empty
    pub rest: &'a [u8],
}

impl<'a> FastaHeaderView<'a> {
    /// Parse a header line; `None` for sequence lines
    pub fn parse(content: &'a [u8]) -> Option<Self> {
        let body = content.strip_prefix(b">")?;
        let name_end = memchr2(b' ', b'\t', body).unwrap_or(body.len());
        let (name, rest) = body.split_at(name_end);
        Some(Self { name, rest })
    }
}

/// Decide how a single FASTA line is rewritten
pub fn edit_line<'m>(content: &[u8], map: &'m ChromMap) -> LineEdit<'m> {
    let Some(header) = FastaHeaderView::parse(content) else {
        return LineEdit::Keep(LineKind::Sequence);
    };

    // `>` with no name is left alone like any unmapped name
    match map.get(header.name) {
        Some(target) => LineEdit::Replace {
            range: 1..1 + header.name.len(),
            with: target,
        },
        None => LineEdit::Unmapped {
            range: 1..1 + header.name.len(),
        },
    }
}
