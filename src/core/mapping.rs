//! Chromosome name mapping tables
//!
//! A [`ChromMap`] is a read-only lookup from one chromosome naming
//! convention to another (Ensembl `1` to UCSC `chr1`). Tables are
//! two-column text files, one per genome build, where the column order
//! defines the forward direction:
//!
//! ```text
//! # Ensembl	UCSC
//! 1	chr1
//! MT	chrM
//! ```
//!
//! [`MappingLoader`] resolves a build name to a table. A build without a
//! table yields an empty map, which turns renaming into a no-op.

use crate::core::error::{MappingError, MappingResult};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// File name suffix of a mapping table: `<build>_ensembl2UCSC.txt`
pub const MAPPING_FILE_SUFFIX: &str = "_ensembl2UCSC.txt";

/// Tables compiled into the binary, keyed by build name
const BUNDLED_TABLES: &[(&str, &str)] = &[
    ("GRCh38", include_str!("../../data/GRCh38_ensembl2UCSC.txt")),
    ("GRCh37", include_str!("../../data/GRCh37_ensembl2UCSC.txt")),
    ("GRCm39", include_str!("../../data/GRCm39_ensembl2UCSC.txt")),
    ("GRCm38", include_str!("../../data/GRCm38_ensembl2UCSC.txt")),
];

/// Which column of a mapping table is the lookup key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// First column to second column (Ensembl to UCSC)
    #[default]
    Forward,
    /// Second column to first column (UCSC to Ensembl)
    Reverse,
}

impl Direction {
    /// Order a (first column, second column) pair as (key, value)
    fn orient<'a>(self, first: &'a str, second: &'a str) -> (&'a str, &'a str) {
        match self {
            Direction::Forward => (first, second),
            Direction::Reverse => (second, first),
        }
    }
}

/// Immutable chromosome identifier lookup table
///
/// Keys and values are raw bytes so identifiers can be looked up straight
/// from the data stream.
#[derive(Debug, Clone, Default)]
pub struct ChromMap {
    entries: HashMap<Vec<u8>, Vec<u8>>,
    skipped_lines: usize,
}

impl ChromMap {
    /// An empty table; renaming with it changes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from (first column, second column) pairs
    pub fn from_pairs<I, A, B>(pairs: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: AsRef<str>,
    {
        let mut map = Self::new();
        for (first, second) in pairs {
            let (key, value) = direction.orient(first.as_ref(), second.as_ref());
            map.insert(key, value, None);
        }
        map
    }

    /// Parse a two-column table from text
    pub fn from_text(text: &str, direction: Direction) -> Self {
        let mut map = Self::new();
        for (idx, line) in text.lines().enumerate() {
            map.add_line(line, idx + 1, direction);
        }
        map
    }

    /// Parse a two-column table from a reader
    ///
    /// Blank lines and `#` comments are ignored. Lines that do not have
    /// exactly two whitespace separated columns are skipped and counted.
    pub fn from_reader<R: BufRead>(reader: R, direction: Direction) -> io::Result<Self> {
        let mut map = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            map.add_line(&line?, idx + 1, direction);
        }
        Ok(map)
    }

    fn add_line(&mut self, line: &str, line_number: usize, direction: Direction) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let mut columns = trimmed.split_ascii_whitespace();
        match (columns.next(), columns.next(), columns.next()) {
            (Some(first), Some(second), None) => {
                let (key, value) = direction.orient(first, second);
                self.insert(key, value, Some(line_number));
            }
            _ => {
                log::warn!(
                    "Skipping mapping line {}: expected 2 columns: {:?}",
                    line_number,
                    trimmed
                );
                self.skipped_lines += 1;
            }
        }
    }

    fn insert(&mut self, key: &str, value: &str, line_number: Option<usize>) {
        let previous = self
            .entries
            .insert(key.as_bytes().to_vec(), value.as_bytes().to_vec());
        if let Some(previous) = previous {
            log::warn!(
                "Duplicate mapping for {:?}{}: {:?} replaced by {:?}",
                key,
                line_number.map(|n| format!(" at line {}", n)).unwrap_or_default(),
                String::from_utf8_lossy(&previous),
                value
            );
        }
    }

    /// Look up the replacement for an identifier
    #[inline]
    pub fn get(&self, id: &[u8]) -> Option<&[u8]> {
        self.entries.get(id).map(Vec::as_slice)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no identifier would be renamed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines dropped while parsing because they were not two columns
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// The same table looked up from the other column
    pub fn reversed(&self) -> Self {
        let mut map = Self::new();
        for (key, value) in &self.entries {
            if map.entries.insert(value.clone(), key.clone()).is_some() {
                log::warn!(
                    "Reversed mapping has duplicate key {:?}",
                    String::from_utf8_lossy(value)
                );
            }
        }
        map
    }
}

/// Resolves a genome build name to its mapping table
///
/// Tables in the optional override directory take precedence over the
/// ones compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct MappingLoader {
    dir: Option<PathBuf>,
}

impl MappingLoader {
    /// Loader that only knows the bundled tables
    pub fn bundled() -> Self {
        Self { dir: None }
    }

    /// Loader that searches `dir` before the bundled tables
    pub fn with_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: Some(dir.into()) }
    }

    /// `<build>_ensembl2UCSC.txt`
    pub fn file_name(build: &str) -> String {
        format!("{}{}", build, MAPPING_FILE_SUFFIX)
    }

    /// Builds with a table compiled into the binary
    pub fn bundled_builds() -> impl Iterator<Item = &'static str> {
        BUNDLED_TABLES.iter().map(|(build, _)| *build)
    }

    /// Load the table for `build`
    ///
    /// An unknown build is not an error: the returned table is empty and
    /// the caller decides how to report it.
    pub fn load(&self, build: &str, direction: Direction) -> MappingResult<ChromMap> {
        // Build names end up in a file name
        if build.is_empty() || build.contains(|c: char| c == '/' || c == '\\') || build.starts_with('.') {
            log::info!("No chromosome mapping for build {:?}", build);
            return Ok(ChromMap::new());
        }

        if let Some(path) = self.override_path(build) {
            log::info!("Loading chromosome mapping from {}", path.display());
            return load_file(&path, direction);
        }

        match BUNDLED_TABLES.iter().find(|(name, _)| *name == build) {
            Some((_, text)) => {
                let map = ChromMap::from_text(text, direction);
                log::debug!("Loaded bundled mapping for {} ({} entries)", build, map.len());
                Ok(map)
            }
            None => {
                log::info!(
                    "No chromosome mapping for build '{}' (bundled: {})",
                    build,
                    Self::bundled_builds().collect::<Vec<_>>().join(", ")
                );
                Ok(ChromMap::new())
            }
        }
    }

    fn override_path(&self, build: &str) -> Option<PathBuf> {
        let path = self.dir.as_ref()?.join(Self::file_name(build));
        path.is_file().then_some(path)
    }
}

fn load_file(path: &Path, direction: Direction) -> MappingResult<ChromMap> {
    let file = File::open(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ChromMap::from_reader(BufReader::new(file), direction).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_from_text_skips_comments_and_blanks() {
        let map = ChromMap::from_text("# Ensembl\tUCSC\n\n1\tchr1\nMT\tchrM\n", Direction::Forward);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(b"1"), Some(&b"chr1"[..]));
        assert_eq!(map.get(b"MT"), Some(&b"chrM"[..]));
        assert_eq!(map.get(b"chr1"), None);
        assert_eq!(map.skipped_lines(), 0);
    }

    #[test]
    fn test_whitespace_delimited_columns() {
        let map = ChromMap::from_text("1   chr1\n2 \t chr2\n", Direction::Forward);
        assert_eq!(map.get(b"1"), Some(&b"chr1"[..]));
        assert_eq!(map.get(b"2"), Some(&b"chr2"[..]));
    }

    #[test]
    fn test_malformed_lines_are_counted() {
        let map = ChromMap::from_text("1\tchr1\nlonely\n3\tchr3\textra\n", Direction::Forward);
        assert_eq!(map.len(), 1);
        assert_eq!(map.skipped_lines(), 2);
    }

    #[test]
    fn test_reverse_direction_swaps_columns() {
        let map = ChromMap::from_text("1\tchr1\nMT\tchrM\n", Direction::Reverse);
        assert_eq!(map.get(b"chr1"), Some(&b"1"[..]));
        assert_eq!(map.get(b"chrM"), Some(&b"MT"[..]));
        assert_eq!(map.get(b"1"), None);
    }

    #[test]
    fn test_duplicate_source_last_wins() {
        let map = ChromMap::from_text("1\tchr1\n1\tchrOne\n", Direction::Forward);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(b"1"), Some(&b"chrOne"[..]));
    }

    #[test]
    fn test_reversed_matches_reverse_direction() {
        let text = "1\tchr1\nX\tchrX\n";
        let reversed = ChromMap::from_text(text, Direction::Forward).reversed();
        let direct = ChromMap::from_text(text, Direction::Reverse);
        assert_eq!(reversed.get(b"chrX"), direct.get(b"chrX"));
        assert_eq!(reversed.get(b"chr1"), Some(&b"1"[..]));
    }

    #[test]
    fn test_from_reader() -> io::Result<()> {
        let map = ChromMap::from_reader(Cursor::new("Y\tchrY\n"), Direction::Forward)?;
        assert_eq!(map.get(b"Y"), Some(&b"chrY"[..]));
        Ok(())
    }

    #[test]
    fn test_from_pairs() {
        let map = ChromMap::from_pairs([("1", "chr1"), ("2", "chr2")], Direction::Reverse);
        assert_eq!(map.get(b"chr2"), Some(&b"2"[..]));
    }

    #[test]
    fn test_bundled_grch38() {
        let map = MappingLoader::bundled().load("GRCh38", Direction::Forward).unwrap();
        assert_eq!(map.get(b"1"), Some(&b"chr1"[..]));
        assert_eq!(map.get(b"22"), Some(&b"chr22"[..]));
        assert_eq!(map.get(b"MT"), Some(&b"chrM"[..]));
        assert_eq!(map.get(b"KI270706.1"), Some(&b"chr1_KI270706v1_random"[..]));
        assert_eq!(map.skipped_lines(), 0);
    }

    #[test]
    fn test_bundled_tables_are_well_formed() {
        for build in MappingLoader::bundled_builds() {
            let map = MappingLoader::bundled().load(build, Direction::Forward).unwrap();
            assert!(!map.is_empty(), "{} is empty", build);
            assert_eq!(map.skipped_lines(), 0, "{} has malformed lines", build);
            // Every bundled table must be invertible
            assert_eq!(map.reversed().len(), map.len(), "{} is not one-to-one", build);
        }
    }

    #[test]
    fn test_bundled_tables_cover_primary_assembly() {
        // Every sequence of the Ensembl primary assembly
        let expected = [("GRCh38", 194), ("GRCh37", 84), ("GRCm39", 64), ("GRCm38", 66)];
        for (build, count) in expected {
            let map = MappingLoader::bundled().load(build, Direction::Forward).unwrap();
            assert_eq!(map.len(), count, "{}", build);
        }
    }

    #[test]
    fn test_bundled_unplaced_scaffolds() {
        let loader = MappingLoader::bundled();

        let grch38 = loader.load("GRCh38", Direction::Forward).unwrap();
        assert_eq!(grch38.get(b"KI270741.1"), Some(&b"chrUn_KI270741v1"[..]));
        assert_eq!(grch38.get(b"KI270329.1"), Some(&b"chrUn_KI270329v1"[..]));
        assert_eq!(grch38.get(b"KI270593.1"), Some(&b"chrUn_KI270593v1"[..]));
        assert_eq!(grch38.get(b"GL000216.2"), Some(&b"chrUn_GL000216v2"[..]));

        let grcm39 = loader.load("GRCm39", Direction::Forward).unwrap();
        assert_eq!(grcm39.get(b"JH584304.1"), Some(&b"chrUn_JH584304v1"[..]));
        assert_eq!(grcm39.get(b"GL456233.2"), Some(&b"chrX_GL456233v2_random"[..]));

        let grcm38 = loader.load("GRCm38", Direction::Forward).unwrap();
        assert_eq!(grcm38.get(b"GL456210.1"), Some(&b"chr1_GL456210_random"[..]));
        assert_eq!(grcm38.get(b"GL456396.1"), Some(&b"chrUn_GL456396"[..]));
    }

    #[test]
    fn test_unknown_build_is_empty() {
        let map = MappingLoader::bundled().load("CHM13", Direction::Forward).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_build_with_path_separator_is_empty() {
        let map = MappingLoader::bundled().load("../GRCh38", Direction::Forward).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_override_dir_wins() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("GRCh38_ensembl2UCSC.txt"), "1\tNC_000001.11\n")?;
        std::fs::write(dir.path().join("T2T_ensembl2UCSC.txt"), "1\tchr1\n")?;

        let loader = MappingLoader::with_dir(dir.path());
        let map = loader.load("GRCh38", Direction::Forward).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(b"1"), Some(&b"NC_000001.11"[..]));

        let map = loader.load("T2T", Direction::Forward).unwrap();
        assert_eq!(map.get(b"1"), Some(&b"chr1"[..]));

        // Falls back to bundled tables
        let map = loader.load("GRCh37", Direction::Forward).unwrap();
        assert_eq!(map.get(b"X"), Some(&b"chrX"[..]));
        Ok(())
    }

    #[test]
    fn test_unreadable_override_is_read_error() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("GRCh38_ensembl2UCSC.txt"), b"1\tchr1\n\xff\xfe\tchr2\n")?;

        let result = MappingLoader::with_dir(dir.path()).load("GRCh38", Direction::Forward);
        assert!(matches!(result, Err(MappingError::Read { .. })));
        Ok(())
    }

    #[test]
    fn test_file_name() {
        assert_eq!(MappingLoader::file_name("GRCh38"), "GRCh38_ensembl2UCSC.txt");
    }
}
