//! Compression-aware I/O layer
//!
//! Opens plain, gzip and bzip2 inputs behind a single `BufRead`, writes
//! plain or gzip output, and reads lines as raw bytes with their
//! terminators intact so untouched lines are copied byte for byte.

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Default buffer size for readers and writers (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Suffix appended to an output path while it is being written
pub const PARTIAL_SUFFIX: &str = "part";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5a, 0x68];

/// Compression format of an input stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

impl CompressionFormat {
    /// Guess from the file extension alone
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") | Some("bgz") => Some(CompressionFormat::Gzip),
            Some("bz2") => Some(CompressionFormat::Bzip2),
            _ => None,
        }
    }

    /// Guess from the leading bytes of a stream
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.starts_with(&GZIP_MAGIC) {
            CompressionFormat::Gzip
        } else if magic.starts_with(&BZIP2_MAGIC) {
            CompressionFormat::Bzip2
        } else {
            CompressionFormat::Plain
        }
    }
}

/// Detect compression format from file path and/or content
///
/// The extension wins when it is recognised; otherwise the first bytes
/// of the file are inspected.
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    if let Some(format) = CompressionFormat::from_extension(path) {
        return Ok(format);
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let mut filled = 0;
    // A single read may return fewer bytes than the file holds
    while filled < magic.len() {
        match file.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    Ok(CompressionFormat::from_magic(&magic[..filled]))
}

/// Wrap a raw byte stream in the matching decoder
///
/// Gzip uses a multi-member decoder: Ensembl and bgzip files are often
/// concatenated gzip members.
pub fn decoding_reader<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Box<dyn BufRead + 'a> {
    match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            MultiGzDecoder::new(reader),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::MultiBzDecoder::new(reader),
        )),
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, reader)),
    }
}

/// Open a file for line reading, decompressing transparently
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let format = detect_compression(path)?;
    log::debug!("Opening {} as {:?}", path.display(), format);
    let file = File::open(path)?;
    Ok(decoding_reader(file, format))
}

/// Compression applied to written output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputCompression {
    /// Plain text
    #[default]
    Plain,
    /// Gzip
    Gzip,
}

impl OutputCompression {
    /// Gzip when requested explicitly or when the path already ends in `.gz`
    pub fn for_path(path: &Path, compress: bool) -> Self {
        if compress || CompressionFormat::from_extension(path) == Some(CompressionFormat::Gzip) {
            OutputCompression::Gzip
        } else {
            OutputCompression::Plain
        }
    }

    /// Append `.gz` to a file name when compressing and it is not already there
    pub fn apply_to(self, path: PathBuf) -> PathBuf {
        match self {
            OutputCompression::Gzip if path.extension().and_then(|e| e.to_str()) != Some("gz") => {
                let mut name = path.into_os_string();
                name.push(".gz");
                PathBuf::from(name)
            }
            _ => path,
        }
    }
}

enum OutputSink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

/// Output file written under a temporary name and moved into place on
/// [`finish`](OutputFile::finish)
///
/// Dropping an unfinished `OutputFile` removes the `.part` file, so a
/// failed run leaves nothing behind at either path.
pub struct OutputFile {
    sink: Option<OutputSink>,
    partial_path: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl OutputFile {
    /// Create the partial file, making parent directories as needed
    pub fn create(path: &Path, compression: OutputCompression) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let partial_path = partial_path(path);
        let file = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, File::create(&partial_path)?);
        let sink = match compression {
            OutputCompression::Plain => OutputSink::Plain(file),
            OutputCompression::Gzip => OutputSink::Gzip(GzEncoder::new(file, Compression::default())),
        };

        Ok(Self {
            sink: Some(sink),
            partial_path,
            final_path: path.to_path_buf(),
            committed: false,
        })
    }

    /// Path the data is currently being written to
    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    /// Flush everything, close the encoder and rename into place
    ///
    /// On error the partial file is removed when `self` is dropped.
    pub fn finish(mut self) -> io::Result<PathBuf> {
        if let Some(sink) = self.sink.take() {
            let mut file = match sink {
                OutputSink::Plain(writer) => writer,
                OutputSink::Gzip(encoder) => encoder.finish()?,
            };
            file.flush()?;
        }

        fs::rename(&self.partial_path, &self.final_path)?;
        self.committed = true;
        Ok(self.final_path.clone())
    }

    fn sink(&mut self) -> io::Result<&mut dyn Write> {
        match self.sink.as_mut() {
            Some(OutputSink::Plain(w)) => Ok(w),
            Some(OutputSink::Gzip(w)) => Ok(w),
            None => Err(io::Error::new(io::ErrorKind::Other, "output already finished")),
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.sink()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink()?.flush()
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        // Close the handle before unlinking
        drop(self.sink.take());
        match fs::remove_file(&self.partial_path) {
            Ok(()) => log::debug!("Removed incomplete output {}", self.partial_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove {}: {}", self.partial_path.display(), e),
        }
    }
}

/// `<path>.part`
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Split a raw line into its content and its terminator (`\n`, `\r\n` or empty)
pub fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    let mut content_len = line.len();
    if line.last() == Some(&b'\n') {
        content_len -= 1;
        if content_len > 0 && line[content_len - 1] == b'\r' {
            content_len -= 1;
        }
    }
    line.split_at(content_len)
}

/// Byte line iterator that keeps line terminators
///
/// Reuses one buffer for every line, so each line must be consumed before
/// the next call.
pub struct ByteLineIterator<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> ByteLineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
            line_number: 0,
        }
    }

    /// Read the next line as bytes, terminator included
    pub fn next_line(&mut self) -> Option<io::Result<&[u8]>> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None, // EOF
            Ok(_) => {
                self.line_number += 1;
                Some(Ok(&self.buffer))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// 1-based number of the last line returned (0 before the first)
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
