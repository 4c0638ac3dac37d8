//! Ensembl archive layout and HTTP transfer
//!
//! Builds the predictable Ensembl FTP URLs for a species/release/build
//! and opens them as byte streams.

use crate::core::error::{ConfigError, FetchError, FetchResult};
use std::io::Read;
use std::time::Duration;

/// Root of the Ensembl archive
pub const ENSEMBL_BASE_URL: &str = "https://ftp.ensembl.org/pub";

/// Default FASTA flavour: chromosomes plus unplaced/unlocalised scaffolds
pub const DEFAULT_GENOME_SUFFIX: &str = "primary_assembly";

/// One species/release/build combination in the Ensembl archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsemblRelease {
    species: String,
    release: u32,
    build: String,
    base_url: String,
}

impl EnsemblRelease {
    /// `species` is lower-cased, e.g. `Homo_Sapiens` becomes `homo_sapiens`
    pub fn new(species: &str, release: u32, build: &str) -> Result<Self, ConfigError> {
        let species = species.trim().to_lowercase();
        let build = build.trim();
        if species.is_empty() {
            return Err(ConfigError::Missing("species"));
        }
        if build.is_empty() {
            return Err(ConfigError::Missing("build"));
        }
        if release == 0 {
            return Err(ConfigError::InvalidRelease(release));
        }

        Ok(Self {
            species,
            release,
            build: build.to_string(),
            base_url: ENSEMBL_BASE_URL.to_string(),
        })
    }

    /// Point at a mirror instead of the main archive
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn release(&self) -> u32 {
        self.release
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    /// Species as it appears in Ensembl file names: `Homo_sapiens`
    fn file_species(&self) -> String {
        let mut chars = self.species.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// `{base}/release-{release}/fasta/{species}/dna/{Species}.{build}.dna.{suffix}.fa.gz`
    pub fn genome_url(&self, suffix: &str) -> String {
        format!(
            "{}/release-{}/fasta/{}/dna/{}.{}.dna.{}.fa.gz",
            self.base_url,
            self.release,
            self.species,
            self.file_species(),
            self.build,
            suffix
        )
    }

    /// `{base}/release-{release}/gtf/{species}/{Species}.{build}.{release}.gtf.gz`
    pub fn gtf_url(&self) -> String {
        format!(
            "{}/release-{}/gtf/{}/{}.{}.{}.gtf.gz",
            self.base_url,
            self.release,
            self.species,
            self.file_species(),
            self.build,
            self.release
        )
    }

    /// `{species}_{build}_{release}.fa`
    pub fn genome_file_name(&self) -> String {
        format!("{}_{}_{}.fa", self.species, self.build, self.release)
    }

    /// `{species}_{build}_{release}.gtf`
    pub fn gtf_file_name(&self) -> String {
        format!("{}_{}_{}.gtf", self.species, self.build, self.release)
    }
}

/// An opened remote resource
pub struct Fetched {
    /// Raw (still compressed) response body
    pub reader: Box<dyn Read + Send>,
    /// Body size when the server announced it
    pub content_length: Option<u64>,
}

/// Opens a URL as a byte stream
pub trait Fetch {
    fn fetch(&self, url: &str) -> FetchResult<Fetched>;
}

/// Blocking HTTP(S) fetcher
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> FetchResult<Self> {
        // No overall timeout: genome downloads can take a long time
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(None)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> FetchResult<Fetched> {
        log::info!("Downloading from: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(Fetched {
            content_length: response.content_length(),
            reader: Box::new(response),
        })
    }
}
