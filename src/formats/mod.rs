//! File format adapters
//!
//! Chromosome renaming for FASTA and GTF/GFF text, plus the streaming
//! renamer that drives them.

pub mod fasta;
pub mod gtf;
pub mod rename;

use crate::core::CompressionFormat;
use std::fmt;
use std::path::Path;

pub use fasta::FastaHeaderView;
pub use gtf::{GtfParseError, GtfRecordView};
pub use rename::{
    rename_file, rename_stream, LineEdit, LineKind, RenameStats, RenamedLines, UNMAPPED_IDS_LIMIT,
};

/// Text format being renamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// FASTA: identifier is the first token of `>` header lines
    Fasta,
    /// GTF/GFF: identifier is the first tab-separated field
    Gtf,
}

impl FileFormat {
    /// Infer the format from a file name, looking through `.gz`/`.bz2`
    pub fn from_path(path: &Path) -> Option<Self> {
        let inner = if CompressionFormat::from_extension(path).is_some() {
            Path::new(path.file_stem()?)
        } else {
            path
        };

        let extension = inner.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "fa" | "fasta" | "fna" | "fas" => Some(FileFormat::Fasta),
            "gtf" | "gff" | "gff3" => Some(FileFormat::Gtf),
            _ => None,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Gtf => write!(f, "GTF"),
        }
    }
}
