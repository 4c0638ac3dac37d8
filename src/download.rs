//! Download pipeline
//!
//! Fetches a remote file, decompresses it on the fly, renames chromosomes
//! and writes the result, all in one streaming pass.

use crate::core::io::{decoding_reader, CompressionFormat, OutputCompression, OutputFile};
use crate::core::{ChromMap, Fetch, RenameError, Result};
use crate::formats::{rename_stream, FileFormat, RenameStats};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{msg} [{elapsed_precise}] {spinner} {bytes} ({bytes_per_sec})";

/// Where and how a download is written
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions<'a> {
    pub format: FileFormat,
    pub compression: OutputCompression,
    /// Mapping to apply; `None` copies the decompressed file as is
    pub map: Option<&'a ChromMap>,
    pub show_progress: bool,
}

fn progress_bar(length: Option<u64>, label: String, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let (bar, template) = match length {
        Some(length) => (ProgressBar::new(length), BAR_TEMPLATE),
        None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
    };
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        bar.set_style(style.progress_chars("##-"));
    }
    bar.set_message(label);
    bar
}

/// Download `url` into `output`
///
/// Gzip input (by URL extension) is decompressed while streaming. The
/// file only appears at `output` when the whole transfer succeeded.
pub fn download_to_file<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    output: &Path,
    options: DownloadOptions<'_>,
) -> Result<RenameStats> {
    let fetched = fetcher.fetch(url)?;
    let compression =
        CompressionFormat::from_extension(Path::new(url)).unwrap_or(CompressionFormat::Plain);

    let label = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bar = progress_bar(fetched.content_length, label, options.show_progress);
    let reader = decoding_reader(bar.wrap_read(fetched.reader), compression);

    let mut out = OutputFile::create(output, options.compression).map_err(|source| {
        RenameError::Create {
            path: output.to_path_buf(),
            source,
        }
    })?;

    let empty = ChromMap::new();
    let map = options.map.unwrap_or(&empty);
    let stats = rename_stream(reader, &mut out, map, options.format);
    bar.finish_and_clear();
    let stats = stats?;

    let written = out.finish().map_err(|source| RenameError::Create {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!("Successfully downloaded and saved to {}", written.display());
    Ok(stats)
}
