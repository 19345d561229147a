//! A binary to map annotated genomic variants onto protein interfaces.
//!
//! ```shell
//! cargo run --release --bin=pdbmapper --features=binaries -- \
//!     map --interfaces intDB --variants varDB --out out --pident 50 \
//!     --biomart biomart.csv ENSP00000263025
//! ```
//!
//! Two subcommands are provided:
//!
//! * `map` maps every unit (protein, gene, transcript) given either
//!   explicitly or through an Ensembl BioMart cross-reference, appending the
//!   results to the output directory.
//! * `split` splits a combined interface or variant file into a store with
//!   one file per identifier.
//!
//! The variant store may be given through the `PDBMAPPER_VARIANT_DB`
//! environment variable.

use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap_verbosity_flag::Verbosity;
use pdbmapper::crossref::CrossRef;
use pdbmapper::mapper;
use pdbmapper::mapper::Unit;
use pdbmapper::store;
use pdbmapper::store::split::Splitter;
use rayon::prelude::*;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// Gets the default number of workers: one less than the available
/// hardware threads, and at least one.
fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

////////////////////////////////////////////////////////////////////////////////////////
// Map
////////////////////////////////////////////////////////////////////////////////////////

/// Maps variants onto the interfaces of one or more proteins.
#[derive(Args)]
struct MapArgs {
    /// Ensembl protein (`ENSP…`) or gene (`ENSG…`) identifiers, resolved
    /// into units through `--biomart`.
    ids: Vec<String>,

    /// An explicit unit as `protein,gene,transcript`. May be repeated.
    #[arg(short, long = "unit")]
    units: Vec<Unit>,

    /// An Ensembl BioMart export with gene, transcript and protein stable
    /// IDs.
    #[arg(short, long)]
    biomart: Option<PathBuf>,

    /// The interface store (a file or a directory of per-protein files).
    #[arg(long)]
    interfaces: PathBuf,

    /// The variant store (a file or a directory of per-gene files).
    #[arg(long, env = "PDBMAPPER_VARIANT_DB")]
    variants: PathBuf,

    /// The directory to append the results to.
    #[arg(short, long)]
    out: PathBuf,

    /// The minimum sequence identity (percentage) of the interfaces.
    #[arg(long)]
    pident: Option<u32>,

    /// An isoform label naming the MappedVariants file. May be repeated.
    #[arg(short, long = "isoform")]
    isoforms: Vec<String>,

    /// A consequence term to filter variants by. May be repeated.
    #[arg(short, long = "consequence")]
    consequences: Vec<String>,

    /// A variant identifier to filter variants by.
    #[arg(long)]
    variant_id: Option<String>,

    /// Whether to also write the LocatedVariants file.
    #[arg(long, default_value_t = false)]
    locations: bool,

    /// The number of units to map in parallel.
    #[arg(short, long, default_value_t = default_jobs())]
    jobs: usize,
}

/// Gathers the units to map from explicit units and cross-referenced ids.
fn units(args: &MapArgs) -> Result<Vec<Unit>> {
    let mut units = args.units.clone();

    if !args.ids.is_empty() {
        let path = args
            .biomart
            .as_ref()
            .context("`--biomart` is required to map protein or gene identifiers")?;

        let crossref = CrossRef::from_path(path)
            .with_context(|| format!("reading cross-reference: {}", path.display()))?;
        debug!("read {} units from {}", crossref.len(), path.display());

        for id in &args.ids {
            match crossref.units(id) {
                Ok(found) => units.extend(found),
                Err(err) => warn!("skipping {id}: {err}"),
            }
        }
    }

    Ok(units)
}

fn map(args: MapArgs) -> Result<()> {
    let units = units(&args)?;

    if units.is_empty() {
        bail!("no units to map");
    }

    let mut builder = mapper::Builder::default()
        .interface_store(args.interfaces)?
        .variant_store(args.variants)?
        .out_dir(args.out)?;

    if let Some(pident) = args.pident {
        builder = builder.pident(pident)?;
    }

    if let Some(id) = args.variant_id {
        builder = builder.variant_id(id)?;
    }

    for isoform in args.isoforms {
        builder = builder.push_isoform(isoform);
    }

    for term in args.consequences {
        builder = builder.push_consequence(term);
    }

    let mapper = builder.try_build()?;

    std::fs::create_dir_all(mapper.out_dir()).with_context(|| {
        format!(
            "creating output directory: {}",
            mapper.out_dir().display()
        )
    })?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()
        .context("building worker pool")?;
    debug!("using {} worker(s)", pool.current_num_threads());

    // Mapping runs in parallel; appends are serialized so that units never
    // interleave within an output file.
    let results = pool.install(|| {
        units
            .par_iter()
            .map(|unit| mapper.map(unit))
            .collect::<Vec<_>>()
    });

    let (mut mapped, mut skipped, mut failed) = (0usize, 0usize, 0usize);

    for (unit, result) in units.iter().zip(results) {
        match result.and_then(|mapping| mapper.write(&mapping, args.locations)) {
            Ok(()) => mapped += 1,
            Err(err) if err.is_skippable() => {
                warn!("skipping {unit}: {err}");
                skipped += 1;
            }
            Err(err) => {
                error!("failed to map {unit}: {err}");
                failed += 1;
            }
        }
    }

    info!(mapped, skipped, failed, "finished mapping {} unit(s)", units.len());

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Split
////////////////////////////////////////////////////////////////////////////////////////

/// Splits a combined delimited file into one file per identifier.
#[derive(Args)]
struct SplitArgs {
    /// The combined file (optionally gzipped).
    input: PathBuf,

    /// The directory to write the per-identifier files to.
    #[arg(short, long)]
    out: PathBuf,

    /// The pattern identifying the key of each line (e.g. `ENSP\d+` for
    /// interfaces).
    #[arg(long, default_value = r"ENSG\d+")]
    pattern: String,

    /// The extension of the files written.
    #[arg(short, long, default_value = "txt")]
    extension: String,

    /// Whether to overwrite the files of a non-empty output directory.
    #[arg(short, long, default_value_t = false)]
    force: bool,
}

fn split(args: SplitArgs) -> Result<()> {
    let reader = store::open(&args.input)
        .with_context(|| format!("opening input: {}", args.input.display()))?;

    let summary = Splitter::try_new(&args.pattern, args.extension)?
        .force(args.force)
        .split(store::Reader::new(reader), &args.out)?;

    info!(
        ids = summary.ids,
        lines = summary.lines,
        skipped = summary.skipped,
        "split {} into {}",
        args.input.display(),
        args.out.display()
    );

    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////
// Main
////////////////////////////////////////////////////////////////////////////////////////

/// The subcommands.
#[derive(Subcommand)]
enum Command {
    /// Maps variants onto the interfaces of one or more proteins.
    Map(MapArgs),

    /// Splits a combined delimited file into one file per identifier.
    Split(SplitArgs),
}

/// Maps annotated genomic variants onto protein interfaces.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(cli.verbose.log_level_filter().as_trace())
            .init(),
    };

    match cli.command {
        Command::Map(args) => map(args),
        Command::Split(args) => split(args),
    }
}
