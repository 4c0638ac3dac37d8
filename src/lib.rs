//! annofetch - Ensembl reference downloads with chromosome renaming
//!
//! Downloads genome FASTA and GTF annotation files from the Ensembl
//! archive and optionally converts chromosome names between the Ensembl
//! (`1`) and UCSC (`chr1`) conventions.
//!
//! # Features
//!
//! - Single-pass streaming: download, gunzip and rename without
//!   holding the file in memory
//! - Byte-exact pass-through of everything except the chromosome name
//! - Bundled Ensembl to UCSC tables for GRCh38, GRCh37, GRCm39 and GRCm38
//! - Reverse (UCSC to Ensembl) conversion from the same tables
//!
//! # Example
//!
//! ```no_run
//! use annofetch::{Direction, FileFormat, MappingLoader, OutputCompression};
//! use annofetch::formats::rename_file;
//! use std::path::Path;
//!
//! let map = MappingLoader::bundled().load("GRCh38", Direction::Forward)?;
//! let stats = rename_file(
//!     Path::new("Homo_sapiens.GRCh38.112.gtf.gz"),
//!     Path::new("GRCh38.ucsc.gtf"),
//!     &map,
//!     FileFormat::Gtf,
//!     OutputCompression::Plain,
//! )?;
//! println!("renamed {} records", stats.renamed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod download;
pub mod formats;

// Re-export commonly used types
pub use crate::core::{
    AnnofetchError, ChromMap, ConfigError, Direction, EnsemblRelease, Fetch, FetchError,
    HttpFetcher, MappingError, MappingLoader, OutputCompression, RenameError, Result,
};
pub use download::{download_to_file, DownloadOptions};
pub use formats::{rename_stream, FileFormat, RenameStats, RenamedLines};
