//! Core functionality
//!
//! This module contains the error types, the compression-aware I/O
//! layer, chromosome mapping tables and the Ensembl remote fetcher.

mod error;
pub mod io;
pub mod mapping;
pub mod remote;

pub use error::{
    AnnofetchError, ConfigError, FetchError, FetchResult, MappingError, MappingResult,
    RenameError, RenameResult, Result,
};
pub use io::{
    detect_compression, open_input, ByteLineIterator, CompressionFormat, OutputCompression,
    OutputFile, DEFAULT_BUFFER_SIZE,
};
pub use mapping::{ChromMap, Direction, MappingLoader};
pub use remote::{EnsemblRelease, Fetch, Fetched, HttpFetcher, DEFAULT_GENOME_SUFFIX, ENSEMBL_BASE_URL};
