//! Streaming chromosome renamer
//!
//! Reads FASTA or GTF text line by line and rewrites the chromosome
//! identifier of qualifying lines through a [`ChromMap`]. Every input line
//! produces exactly one output line, in order, and anything that is not
//! the identifier itself (including line terminators) is copied byte for
//! byte. With an empty map the output equals the (decompressed) input.

use crate::core::io::{open_input, split_terminator, ByteLineIterator, OutputCompression, OutputFile};
use crate::core::{ChromMap, RenameError, RenameResult};
use crate::formats::{fasta, gtf, FileFormat};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Malformed records logged individually before going quiet
const MAX_MALFORMED_WARNINGS: usize = 5;

/// Distinct unmapped identifiers kept in [`RenameStats::unmapped_ids`]
pub const UNMAPPED_IDS_LIMIT: usize = 100;

/// What a line turned out to be when it was copied without an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// FASTA sequence line
    Sequence,
    /// GTF comment or pragma
    Comment,
    /// Empty GTF line
    Blank,
    /// GTF record with fewer than 9 fields
    Malformed,
}

/// Rewrite decision for a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEdit<'m> {
    /// Copy the line verbatim
    Keep(LineKind),
    /// Copy the line verbatim; `range` holds an identifier with no entry in the map
    Unmapped { range: Range<usize> },
    /// Replace `range` of the line content with `with`
    Replace { range: Range<usize>, with: &'m [u8] },
}

/// Renaming statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameStats {
    /// Lines read (and written)
    pub total: usize,
    /// Identifier positions seen (FASTA headers, well-formed GTF records)
    pub identifiers: usize,
    /// Identifiers replaced
    pub renamed: usize,
    /// Identifiers left as they were
    pub unmapped: usize,
    /// FASTA sequence lines
    pub sequence: usize,
    /// GTF comment/pragma lines
    pub comments: usize,
    /// Empty GTF lines
    pub blank: usize,
    /// GTF records with too few fields, passed through unchanged
    pub malformed: usize,
    /// Distinct identifiers that had no mapping, at most [`UNMAPPED_IDS_LIMIT`]
    pub unmapped_ids: BTreeSet<String>,
    /// Set once an unmapped identifier was left out of `unmapped_ids`
    pub unmapped_ids_truncated: bool,
}

impl RenameStats {
    fn record(&mut self, edit: &LineEdit<'_>, content: &[u8]) {
        self.total += 1;
        match edit {
            LineEdit::Replace { .. } => {
                self.identifiers += 1;
                self.renamed += 1;
            }
            LineEdit::Unmapped { range } => {
                self.identifiers += 1;
                self.unmapped += 1;
                self.record_unmapped_id(&content[range.clone()]);
            }
            LineEdit::Keep(LineKind::Sequence) => self.sequence += 1,
            LineEdit::Keep(LineKind::Comment) => self.comments += 1,
            LineEdit::Keep(LineKind::Blank) => self.blank += 1,
            LineEdit::Keep(LineKind::Malformed) => self.malformed += 1,
        }
    }

    fn record_unmapped_id(&mut self, id: &[u8]) {
        let id = String::from_utf8_lossy(id);
        if self.unmapped_ids.contains(&*id) {
            return;
        }
        if self.unmapped_ids.len() < UNMAPPED_IDS_LIMIT {
            self.unmapped_ids.insert(id.into_owned());
        } else {
            self.unmapped_ids_truncated = true;
        }
    }
}

/// Lazy renamed view over an input stream
///
/// Produces one output line per input line. Lines are borrowed from an
/// internal buffer and must be consumed before the next call.
pub struct RenamedLines<'m, R: BufRead> {
    lines: ByteLineIterator<R>,
    map: &'m ChromMap,
    format: FileFormat,
    output: Vec<u8>,
    stats: RenameStats,
}

impl<'m, R: BufRead> RenamedLines<'m, R> {
    pub fn new(reader: R, map: &'m ChromMap, format: FileFormat) -> Self {
        Self {
            lines: ByteLineIterator::new(reader),
            map,
            format,
            output: Vec::with_capacity(1024),
            stats: RenameStats::default(),
        }
    }

    /// Next output line, terminator included
    ///
    /// A read or decompression failure is fatal; after an error the stream
    /// should be abandoned.
    pub fn next_line(&mut self) -> Option<RenameResult<&[u8]>> {
        let line_number = self.lines.line_number() + 1;
        let line = match self.lines.next_line()? {
            Ok(line) => line,
            Err(source) => {
                return Some(Err(RenameError::Read {
                    line: line_number,
                    source,
                }))
            }
        };

        let (content, terminator) = split_terminator(line);
        let edit = match self.format {
            FileFormat::Fasta => fasta::edit_line(content, self.map),
            FileFormat::Gtf => gtf::edit_line(content, self.map),
        };

        self.stats.record(&edit, content);
        if edit == LineEdit::Keep(LineKind::Malformed) {
            if self.stats.malformed <= MAX_MALFORMED_WARNINGS {
                log::warn!(
                    "Line {}: fewer than {} tab-separated fields, left unchanged",
                    line_number,
                    gtf::GTF_FIELD_COUNT
                );
            } else if self.stats.malformed == MAX_MALFORMED_WARNINGS + 1 {
                log::warn!("Further malformed lines will only be counted");
            }
        }

        match edit {
            LineEdit::Keep(_) | LineEdit::Unmapped { .. } => Some(Ok(line)),
            LineEdit::Replace { range, with } => {
                self.output.clear();
                self.output.extend_from_slice(&content[..range.start]);
                self.output.extend_from_slice(with);
                self.output.extend_from_slice(&content[range.end..]);
                self.output.extend_from_slice(terminator);
                Some(Ok(&self.output))
            }
        }
    }

    /// Statistics for the lines produced so far
    pub fn stats(&self) -> &RenameStats {
        &self.stats
    }

    pub fn into_stats(self) -> RenameStats {
        self.stats
    }
}

/// Rename a whole stream into `writer`
pub fn rename_stream<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    map: &ChromMap,
    format: FileFormat,
) -> RenameResult<RenameStats> {
    let mut lines = RenamedLines::new(reader, map, format);
    while let Some(line) = lines.next_line() {
        writer.write_all(line?).map_err(RenameError::Write)?;
    }
    writer.flush().map_err(RenameError::Write)?;

    let stats = lines.into_stats();
    if stats.malformed > 0 {
        log::warn!("{} malformed line(s) passed through unchanged", stats.malformed);
    }
    Ok(stats)
}

/// Rename a local file, decompressing it if needed
///
/// The output only appears at `output` once it has been written
/// completely.
pub fn rename_file(
    input: &Path,
    output: &Path,
    map: &ChromMap,
    format: FileFormat,
    compression: OutputCompression,
) -> RenameResult<RenameStats> {
    let reader = open_input(input).map_err(|source| RenameError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let mut out = OutputFile::create(output, compression).map_err(|source| create_error(output, source))?;

    let stats = rename_stream(reader, &mut out, map, format)?;
    out.finish().map_err(|source| create_error(output, source))?;
    Ok(stats)
}

fn create_error(path: &Path, source: std::io::Error) -> RenameError {
    RenameError::Create {
        path: PathBuf::from(path),
        source,
    }
}
