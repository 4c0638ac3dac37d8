//! annofetch CLI entry point
//!
//! Downloads genome and annotation files from Ensembl, with optional
//! Ensembl/UCSC chromosome name conversion.

use anyhow::Context;
use annofetch::core::io::open_input;
use annofetch::core::{DEFAULT_GENOME_SUFFIX, ENSEMBL_BASE_URL};
use annofetch::formats::rename_file;
use annofetch::{
    download_to_file, rename_stream, ChromMap, ConfigError, Direction, DownloadOptions,
    EnsemblRelease, FileFormat, HttpFetcher, MappingLoader, OutputCompression, RenameStats,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Unmapped identifiers listed in the summary before truncating
const MAX_LISTED_UNMAPPED: usize = 10;

#[derive(Parser)]
#[command(name = "annofetch")]
#[command(about = "A CLI for downloading genome and annotation files from Ensembl")]
#[command(version)]
struct Cli {
    /// Directory searched for <build>_ensembl2UCSC.txt before the bundled tables
    #[arg(long = "mapping-dir", global = true, env = "ANNOFETCH_MAPPING_DIR")]
    mapping_dir: Option<PathBuf>,

    /// Root of the Ensembl archive (or a mirror)
    #[arg(long = "base-url", global = true, env = "ANNOFETCH_BASE_URL", default_value = ENSEMBL_BASE_URL)]
    base_url: String,

    /// Hide the download progress bar
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Parameters shared by the download commands
#[derive(Args)]
struct ReleaseArgs {
    /// Ensembl species name (e.g., 'homo_sapiens')
    #[arg(long)]
    species: String,
    /// Ensembl release number (e.g., 112)
    #[arg(long)]
    release: u32,
    /// Genome build (e.g., 'GRCh38')
    #[arg(long)]
    build: String,
    /// Directory to save the file
    #[arg(long = "output-dir", default_value = "resources/ref")]
    output_dir: PathBuf,
    /// Convert chromosome names to UCSC style (e.g., '1' -> 'chr1'). Requires a mapping for the build
    #[arg(long = "add-ucsc-style")]
    add_ucsc_style: bool,
    /// Gzip the output file
    #[arg(short = 'c', long)]
    compress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// FASTA (rename header sequence names)
    #[value(name = "fasta")]
    Fasta,
    /// GTF/GFF (rename the first column)
    #[value(name = "gtf")]
    Gtf,
}

impl From<FormatArg> for FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => FileFormat::Fasta,
            FormatArg::Gtf => FileFormat::Gtf,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Download a genome FASTA file from Ensembl
    Genome {
        #[command(flatten)]
        args: ReleaseArgs,
        /// File suffix for the FASTA file
        #[arg(long, default_value = DEFAULT_GENOME_SUFFIX)]
        suffix: String,
    },
    /// Download a GTF annotation file from Ensembl
    Gtf {
        #[command(flatten)]
        args: ReleaseArgs,
    },
    /// Rename chromosomes in a local FASTA/GTF file (plain, gzip or bzip2)
    Rename {
        /// Input FASTA/GTF file
        input: PathBuf,
        /// Output file (optional, stdout if not specified)
        output: Option<PathBuf>,
        /// Genome build selecting the mapping table (e.g., 'GRCh38')
        #[arg(short = 'b', long)]
        build: String,
        /// Input format (default: inferred from the file name)
        #[arg(short = 'f', long, value_enum)]
        format: Option<FormatArg>,
        /// Convert UCSC names back to Ensembl names (e.g., 'chr1' -> '1')
        #[arg(long = "to-ensembl")]
        to_ensembl: bool,
        /// Gzip the output file (requires OUTPUT)
        #[arg(short = 'c', long, requires = "output")]
        compress: bool,
    },
}

fn mapping_loader(cli: &Cli) -> MappingLoader {
    match &cli.mapping_dir {
        Some(dir) => MappingLoader::with_dir(dir),
        None => MappingLoader::bundled(),
    }
}

/// Load the UCSC mapping for a download, or `None` when conversion is off or impossible
fn ucsc_mapping(cli: &Cli, args: &ReleaseArgs, what: &str) -> anyhow::Result<Option<ChromMap>> {
    if !args.add_ucsc_style {
        return Ok(None);
    }

    let map = mapping_loader(cli)
        .load(&args.build, Direction::Forward)
        .with_context(|| format!("Failed to load chromosome mapping for build '{}'", args.build))?;
    if map.is_empty() {
        log::warn!(
            "Cannot perform UCSC style conversion for {}. No mapping file found for build '{}'.",
            what,
            args.build
        );
        log::warn!("Proceeding with download without chromosome name conversion.");
        return Ok(None);
    }

    log::info!(
        "Using '{}' map to convert {} chromosome names to UCSC style",
        args.build,
        what
    );
    Ok(Some(map))
}

fn ensembl_release(cli: &Cli, args: &ReleaseArgs) -> anyhow::Result<EnsemblRelease> {
    let release = EnsemblRelease::new(&args.species, args.release, &args.build)
        .context("Missing or invalid Ensembl parameters")?;
    log::info!(
        "Initialized downloader for {} (release {}, build {})",
        release.species(),
        release.release(),
        release.build()
    );
    Ok(release.with_base_url(&cli.base_url))
}

fn download(
    cli: &Cli,
    args: &ReleaseArgs,
    url: &str,
    file_name: String,
    format: FileFormat,
) -> anyhow::Result<RenameStats> {
    let map = ucsc_mapping(cli, args, &format.to_string())?;
    let compression = if args.compress {
        OutputCompression::Gzip
    } else {
        OutputCompression::Plain
    };
    let output_path = args.output_dir.join(compression.apply_to(PathBuf::from(file_name)));

    eprintln!("Downloading {} file: {} -> {:?}", format, url, output_path);
    let fetcher = HttpFetcher::new()?;
    let options = DownloadOptions {
        format,
        compression,
        map: map.as_ref(),
        show_progress: !cli.quiet,
    };
    let stats = download_to_file(&fetcher, url, &output_path, options)
        .with_context(|| format!("Failed to download {}", url))?;
    Ok(stats)
}

fn rename(
    cli: &Cli,
    input: &Path,
    output: Option<&Path>,
    build: &str,
    format: Option<FormatArg>,
    to_ensembl: bool,
    compress: bool,
) -> anyhow::Result<RenameStats> {
    let format = match format {
        Some(format) => format.into(),
        None => FileFormat::from_path(input)
            .ok_or_else(|| ConfigError::UnknownFormat(input.to_path_buf()))?,
    };
    let direction = if to_ensembl {
        Direction::Reverse
    } else {
        Direction::Forward
    };

    let map = mapping_loader(cli)
        .load(build, direction)
        .with_context(|| format!("Failed to load chromosome mapping for build '{}'", build))?;
    if map.is_empty() {
        log::warn!(
            "No mapping file found for build '{}'. Output will be identical to the input.",
            build
        );
    }

    match output {
        Some(output) => {
            let compression = OutputCompression::for_path(output, compress);
            eprintln!("Renaming {} file: {:?} -> {:?}", format, input, output);
            Ok(rename_file(input, output, &map, format, compression)?)
        }
        None => {
            let reader = open_input(input).with_context(|| format!("Failed to open {:?}", input))?;
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            Ok(rename_stream(reader, &mut writer, &map, format)?)
        }
    }
}

fn print_stats(stats: &RenameStats, start: Instant) {
    eprintln!("\n=== Rename Statistics ===");
    eprintln!("Total lines:     {}", stats.total);
    eprintln!("Identifiers:     {}", stats.identifiers);
    eprintln!("  - Renamed:     {}", stats.renamed);
    eprintln!("  - Unmapped:    {}", stats.unmapped);
    if stats.comments > 0 {
        eprintln!("Comments:        {}", stats.comments);
    }
    if stats.malformed > 0 {
        eprintln!("Malformed:       {}", stats.malformed);
    }
    if !stats.unmapped_ids.is_empty() && stats.renamed > 0 {
        let listed: Vec<&str> = stats
            .unmapped_ids
            .iter()
            .take(MAX_LISTED_UNMAPPED)
            .map(String::as_str)
            .collect();
        let more = stats.unmapped_ids.len().saturating_sub(listed.len());
        if stats.unmapped_ids_truncated {
            eprintln!("Unmapped names:  {} (+{} or more)", listed.join(", "), more + 1);
        } else if more > 0 {
            eprintln!("Unmapped names:  {} (+{} more)", listed.join(", "), more);
        } else {
            eprintln!("Unmapped names:  {}", listed.join(", "));
        }
    }
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let start = Instant::now();

    let stats = match &cli.command {
        Commands::Genome { args, suffix } => {
            let release = ensembl_release(&cli, args)?;
            download(
                &cli,
                args,
                &release.genome_url(suffix),
                release.genome_file_name(),
                FileFormat::Fasta,
            )?
        }

        Commands::Gtf { args } => {
            let release = ensembl_release(&cli, args)?;
            download(&cli, args, &release.gtf_url(), release.gtf_file_name(), FileFormat::Gtf)?
        }

        Commands::Rename {
            input,
            output,
            build,
            format,
            to_ensembl,
            compress,
        } => rename(
            &cli,
            input,
            output.as_deref(),
            build,
            *format,
            *to_ensembl,
            *compress,
        )?,
    };

    print_stats(&stats, start);
    Ok(())
}
