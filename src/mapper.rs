//! Mapping of annotated variants onto protein interfaces.
//!
//! A [`Mapper`] processes one [`Unit`] (a protein, its gene and one of its
//! transcripts) at a time:
//!
//! 1. the interfaces of the protein are loaded, exploded and thresholded on
//!    sequence identity;
//! 2. the variants of the gene are loaded, their protein-position ranges
//!    are resolved and they pass through the [filter chain](filter::Chain);
//! 3. variants are joined against the interfaces whose residue range
//!    contains their position.
//!
//! Every failure is returned as an [`Error`] scoped to the unit; callers
//! processing a batch of units are expected to report it and move on.
//! [`Error::is_skippable()`] distinguishes the expected empty-result
//! conditions from data and I/O faults.

use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use nonempty::NonEmpty;
use tracing::debug;
use tracing::info;

use crate::Table;
use crate::expand;
use crate::filter;
use crate::filter::Criterion;
use crate::join;
use crate::join::Joiner;
use crate::join::Layout;
use crate::output;
use crate::record;
use crate::record::InterfaceRecord;
use crate::record::Records;
use crate::record::VariantRecord;
use crate::resolve;
use crate::store;
use crate::store::Store;

pub mod builder;

pub use builder::Builder;

/// The delimiter between the identifiers of a textual [`Unit`].
const UNIT_DELIMITER: char = ',';

/// An error associated with parsing a [`Unit`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The unit does not hold exactly three identifiers.
    IncorrectNumberOfFields(usize),

    /// One of the identifiers is empty.
    EmptyIdentifier,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "invalid number of fields in unit: expected 3 fields (protein, gene, \
                 transcript), found {n} fields"
            ),
            ParseError::EmptyIdentifier => write!(f, "empty identifier in unit"),
        }
    }
}

impl std::error::Error for ParseError {}

/// The protein, gene and transcript identifiers mapped together.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Unit {
    /// The protein identifier.
    protein_id: String,

    /// The gene identifier.
    gene_id: String,

    /// The transcript identifier.
    transcript_id: String,
}

impl Unit {
    /// Creates a new unit.
    pub fn new(
        protein_id: impl Into<String>,
        gene_id: impl Into<String>,
        transcript_id: impl Into<String>,
    ) -> Self {
        Self {
            protein_id: protein_id.into(),
            gene_id: gene_id.into(),
            transcript_id: transcript_id.into(),
        }
    }

    /// Gets the protein identifier.
    pub fn protein_id(&self) -> &str {
        &self.protein_id
    }

    /// Gets the gene identifier.
    pub fn gene_id(&self) -> &str {
        &self.gene_id
    }

    /// Gets the transcript identifier.
    pub fn transcript_id(&self) -> &str {
        &self.transcript_id
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "protein {} (gene {}, transcript {})",
            self.protein_id, self.gene_id, self.transcript_id
        )
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    /// Parses a unit from its comma-delimited protein, gene and transcript
    /// identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::mapper::Unit;
    ///
    /// let unit = "ENSP00000263025,ENSG00000141510,ENST00000269305".parse::<Unit>()?;
    /// assert_eq!(unit.gene_id(), "ENSG00000141510");
    ///
    /// assert!("ENSP00000263025,ENSG00000141510".parse::<Unit>().is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let fields = s.split(UNIT_DELIMITER).map(str::trim).collect::<Vec<_>>();

        let &[protein_id, gene_id, transcript_id] = fields.as_slice() else {
            return Err(ParseError::IncorrectNumberOfFields(fields.len()));
        };

        if [protein_id, gene_id, transcript_id]
            .iter()
            .any(|id| id.is_empty())
        {
            return Err(ParseError::EmptyIdentifier);
        }

        Ok(Self::new(protein_id, gene_id, transcript_id))
    }
}

/// An error related to mapping a [`Unit`].
#[derive(Debug)]
pub enum Error {
    /// No records exist for an identifier in a store.
    NotFound {
        /// The identifier that was looked up.
        id: String,

        /// The path of the store.
        path: PathBuf,
    },

    /// No interface of the protein reaches the identity threshold.
    ThresholdTooHigh {
        /// The protein identifier.
        protein_id: String,

        /// The requested threshold.
        threshold: u32,

        /// The highest identity available for the protein.
        max: Option<f64>,
    },

    /// A variant filter removed every variant of the unit.
    EmptyResult {
        /// The unit.
        unit: Unit,

        /// The criterion that removed the last variants.
        criterion: Criterion,
    },

    /// No variant of the unit lies within an interface.
    NoMappedVariants(Unit),

    /// A store error.
    Store(store::Error),

    /// An error expanding multi-valued columns.
    Expand(expand::Error),

    /// An error resolving protein-position ranges.
    Resolve(resolve::Error),

    /// A row could not be parsed as a record.
    Record(record::ParseError),

    /// An error joining variants to interfaces.
    Join(join::Error),

    /// An error writing output.
    Output(output::Error),
}

impl Error {
    /// Returns whether the unit was skipped because a stage yielded no
    /// results, as opposed to a data or I/O fault.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::mapper::Error;
    /// use pdbmapper::mapper::Unit;
    ///
    /// let err = Error::NoMappedVariants(Unit::new("P1", "G1", "T1"));
    /// assert!(err.is_skippable());
    /// ```
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::ThresholdTooHigh { .. }
                | Error::EmptyResult { .. }
                | Error::NoMappedVariants(_)
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound { id, path } => {
                write!(f, "no records found for {id} in {}", path.display())
            }
            Error::ThresholdTooHigh {
                protein_id,
                threshold,
                max,
            } => {
                write!(
                    f,
                    "identity threshold of {threshold}% is too high for protein {protein_id}"
                )?;

                match max {
                    Some(max) => write!(
                        f,
                        ": a threshold lower than or equal to {max}% would retrieve results"
                    ),
                    None => Ok(()),
                }
            }
            Error::EmptyResult { unit, criterion } => {
                write!(f, "no variants of {unit} left after filtering by {criterion}")
            }
            Error::NoMappedVariants(unit) => {
                write!(f, "{unit} does not map with any annotated variant")
            }
            Error::Store(err) => write!(f, "store error: {err}"),
            Error::Expand(err) => write!(f, "expansion error: {err}"),
            Error::Resolve(err) => write!(f, "range error: {err}"),
            Error::Record(err) => write!(f, "record error: {err}"),
            Error::Join(err) => write!(f, "join error: {err}"),
            Error::Output(err) => write!(f, "output error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Lifts a store error, singling out missing records.
fn store_error(err: store::Error) -> Error {
    match err {
        store::Error::NotFound { id, path } => Error::NotFound { id, path },
        err => Error::Store(err),
    }
}

/// Lifts a filter error into the scope of `unit`.
fn filter_error(unit: &Unit, err: filter::Error) -> Error {
    match err {
        filter::Error::ThresholdTooHigh { threshold, max } => Error::ThresholdTooHigh {
            protein_id: unit.protein_id.clone(),
            threshold,
            max,
        },
        filter::Error::EmptyResult(criterion) => Error::EmptyResult {
            unit: unit.clone(),
            criterion,
        },
    }
}

/// The result of mapping a [`Unit`].
#[derive(Clone, Debug)]
pub struct Mapping {
    /// The unit.
    unit: Unit,

    /// The deduplicated (structure feature, uploaded variation) pairs.
    set_ids: Table,

    /// The deduplicated rows of the inner join.
    mapped: Table,

    /// The rows of the outer join.
    located: Table,
}

impl Mapping {
    /// Gets the unit.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Gets the (structure feature, uploaded variation) pairs.
    pub fn set_ids(&self) -> &Table {
        &self.set_ids
    }

    /// Gets the variants joined to the interfaces containing them.
    pub fn mapped(&self) -> &Table {
        &self.mapped
    }

    /// Gets every variant and every interface, joined where they overlap.
    pub fn located(&self) -> &Table {
        &self.located
    }
}

/// Maps the variants of units onto their protein interfaces.
///
/// A [`Mapper`] is built with a [`Builder`].
#[derive(Clone, Debug)]
pub struct Mapper {
    /// The store of interface records, keyed by protein identifier.
    interfaces: Store,

    /// The store of variant records, keyed by gene identifier.
    variants: Store,

    /// The directory output files are appended to.
    out_dir: PathBuf,

    /// The identity threshold.
    pident: Option<u32>,

    /// The isoform labels.
    isoforms: Vec<String>,

    /// The consequence terms.
    consequences: Option<NonEmpty<String>>,

    /// The variant identifier.
    variant_id: Option<String>,
}

impl Mapper {
    /// Gets the output directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Gets the filter parameters naming the output files.
    pub fn parameters(&self) -> output::Parameters {
        output::Parameters {
            pident: self.pident,
            isoforms: self.isoforms.clone(),
            consequences: self
                .consequences
                .as_ref()
                .map(|terms| terms.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Loads, explodes and thresholds the interfaces of the unit's protein.
    fn interfaces(&self, unit: &Unit) -> Result<Records<InterfaceRecord>> {
        let table = self
            .interfaces
            .load(unit.protein_id())
            .map_err(store_error)?;
        debug!(protein_id = unit.protein_id(), rows = table.len(), "parsed interfaces");

        let table = expand::explode(table).map_err(Error::Expand)?;
        let interfaces = Records::<InterfaceRecord>::try_from(table).map_err(Error::Record)?;

        match self.pident {
            Some(threshold) => {
                filter::identity(interfaces, threshold).map_err(|err| filter_error(unit, err))
            }
            None => Ok(interfaces),
        }
    }

    /// Loads, resolves and filters the variants of the unit's gene.
    fn variants(&self, unit: &Unit) -> Result<Records<VariantRecord>> {
        let table = self.variants.load(unit.gene_id()).map_err(store_error)?;
        debug!(gene_id = unit.gene_id(), rows = table.len(), "parsed variants");

        let columns = expand::list_columns(&table);
        let table = match columns.is_empty() {
            true => table,
            false => expand::expand(table, &columns).map_err(Error::Expand)?,
        };

        let table = resolve::resolve(table, record::PROTEIN_POSITION).map_err(Error::Resolve)?;
        let variants = Records::<VariantRecord>::try_from(table).map_err(Error::Record)?;

        filter::Chain::new(unit.transcript_id())
            .consequences(self.consequences.clone())
            .variant_id(self.variant_id.clone())
            .apply(variants)
            .map_err(|err| filter_error(unit, err))
    }

    /// Maps the variants of `unit` onto its interfaces.
    ///
    /// Nothing is written; see [`Mapper::write()`].
    pub fn map(&self, unit: &Unit) -> Result<Mapping> {
        let interfaces = self.interfaces(unit)?;
        let variants = self.variants(unit)?;

        let joiner = Joiner::new(interfaces.records());
        let pairs = joiner.inner(variants.records());

        if pairs.is_empty() {
            return Err(Error::NoMappedVariants(unit.clone()));
        }

        let layout = Layout::new(variants.header(), interfaces.header());
        let set_ids = join::set_ids(&pairs).map_err(Error::Join)?;
        let mapped = layout.mapped(&pairs).map_err(Error::Join)?;
        let located = layout
            .located(&joiner.outer(variants.records()))
            .map_err(Error::Join)?;

        info!(
            protein_id = unit.protein_id(),
            gene_id = unit.gene_id(),
            transcript_id = unit.transcript_id(),
            set_ids = set_ids.len(),
            mapped = mapped.len(),
            "mapped variants onto interfaces"
        );

        Ok(Mapping {
            unit: unit.clone(),
            set_ids,
            mapped,
            located,
        })
    }

    /// Appends a mapping to the output files.
    ///
    /// The LocatedVariants file is only written when `locations` is set.
    pub fn write(&self, mapping: &Mapping, locations: bool) -> Result<()> {
        let parameters = self.parameters();

        output::append(
            &self.out_dir.join(parameters.set_id_filename()),
            mapping.set_ids(),
        )
        .map_err(Error::Output)?;

        output::append(
            &self.out_dir.join(parameters.mapped_filename()),
            mapping.mapped(),
        )
        .map_err(Error::Output)?;

        if locations {
            output::append(
                &self.out_dir.join(parameters.located_filename()),
                mapping.located(),
            )
            .map_err(Error::Output)?;
        }

        Ok(())
    }

    /// Maps `unit` and appends the result to the output files.
    pub fn run(&self, unit: &Unit, locations: bool) -> Result<Mapping> {
        let mapping = self.map(unit)?;
        self.write(&mapping, locations)?;
        Ok(mapping)
    }
}
