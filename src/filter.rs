//! Filters applied to interface and variant records before joining.
//!
//! Interfaces are thresholded on sequence identity. Variants then pass
//! through a [`Chain`] of filters, in order:
//!
//! 1. transcript: the `Feature` equals the target transcript;
//! 2. consequence (optional): the `Consequence` field contains any of the
//!    supplied terms;
//! 3. variant id (optional): the `Uploaded_variation` or
//!    `Existing_variation` field contains the supplied id.
//!
//! A filter that removes every record fails instead of returning an empty
//! result.

use nonempty::NonEmpty;

use crate::record::InterfaceRecord;
use crate::record::Records;
use crate::record::VariantRecord;

/// A criterion applied by the variant filter chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Criterion {
    /// The transcript identifier.
    Transcript(String),

    /// The consequence terms, any of which may match.
    Consequence(NonEmpty<String>),

    /// The variant identifier.
    VariantId(String),
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Criterion::Transcript(id) => write!(f, "transcript {id}"),
            Criterion::Consequence(terms) => {
                let terms = terms.iter().map(String::as_str).collect::<Vec<_>>();
                write!(f, "consequence [{}]", terms.join(", "))
            }
            Criterion::VariantId(id) => write!(f, "variant id {id}"),
        }
    }
}

/// An error related to filtering.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// No interface reaches the identity threshold.
    ThresholdTooHigh {
        /// The requested threshold.
        threshold: u32,

        /// The highest identity among the interfaces, if there were any.
        max: Option<f64>,
    },

    /// A variant filter removed every record.
    EmptyResult(Criterion),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ThresholdTooHigh {
                threshold,
                max: Some(max),
            } => write!(
                f,
                "identity threshold of {threshold}% is too high: a threshold lower than or \
                 equal to {max}% would retrieve results"
            ),
            Error::ThresholdTooHigh {
                threshold,
                max: None,
            } => write!(
                f,
                "identity threshold of {threshold}% is too high: no interfaces to filter"
            ),
            Error::EmptyResult(criterion) => {
                write!(f, "no variants left after filtering by {criterion}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Keeps the interfaces whose identity percentage is at least `threshold`.
///
/// When nothing survives, the error reports the highest identity present so
/// that a workable threshold can be chosen.
pub fn identity(
    mut interfaces: Records<InterfaceRecord>,
    threshold: u32,
) -> Result<Records<InterfaceRecord>> {
    let max = interfaces
        .iter()
        .map(InterfaceRecord::pident)
        .fold(None, |max: Option<f64>, pident| match max {
            Some(max) => Some(max.max(pident)),
            None => Some(pident),
        });

    interfaces.retain(|interface| interface.pident() >= f64::from(threshold));

    if interfaces.is_empty() {
        return Err(Error::ThresholdTooHigh { threshold, max });
    }

    tracing::debug!(
        threshold,
        kept = interfaces.len(),
        "filtered interfaces by identity"
    );

    Ok(interfaces)
}

/// The variant filter chain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chain {
    /// The target transcript.
    transcript: String,

    /// The consequence terms, if any.
    consequences: Option<NonEmpty<String>>,

    /// The variant identifier, if any.
    variant_id: Option<String>,
}

impl Chain {
    /// Creates a new chain that filters on `transcript`.
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            consequences: None,
            variant_id: None,
        }
    }

    /// Sets the consequence terms.
    pub fn consequences(mut self, consequences: Option<NonEmpty<String>>) -> Self {
        self.consequences = consequences;
        self
    }

    /// Sets the variant identifier.
    pub fn variant_id(mut self, variant_id: Option<String>) -> Self {
        self.variant_id = variant_id;
        self
    }

    /// Applies each filter of the chain in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::filter::Chain;
    /// use pdbmapper::record::Records;
    /// use pdbmapper::record::VariantRecord;
    /// use pdbmapper::table::Row;
    /// use pdbmapper::Table;
    ///
    /// let table = Table::try_from_parts(
    ///     vec![
    ///         String::from("Uploaded_variation"),
    ///         String::from("Feature"),
    ///         String::from("Consequence"),
    ///         String::from("Protein_position"),
    ///     ],
    ///     vec![
    ///         Row::new(vec!["V1".into(), "T1".into(), "missense_variant".into(), "105".into()]),
    ///         Row::new(vec!["V2".into(), "T2".into(), "missense_variant".into(), "105".into()]),
    ///     ],
    /// )?;
    /// let variants = Records::<VariantRecord>::try_from(table)?;
    ///
    /// let kept = Chain::new("T1").apply(variants.clone())?;
    /// assert_eq!(kept.len(), 1);
    ///
    /// let err = Chain::new("T3").apply(variants).unwrap_err();
    /// assert_eq!(err.to_string(), "no variants left after filtering by transcript T3");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn apply(&self, mut variants: Records<VariantRecord>) -> Result<Records<VariantRecord>> {
        variants.retain(|variant| variant.feature() == self.transcript);
        ensure_nonempty(&variants, || Criterion::Transcript(self.transcript.clone()))?;

        if let Some(terms) = &self.consequences {
            variants.retain(|variant| {
                terms
                    .iter()
                    .any(|term| variant.consequence().contains(term.as_str()))
            });
            ensure_nonempty(&variants, || Criterion::Consequence(terms.clone()))?;
        }

        if let Some(id) = &self.variant_id {
            variants.retain(|variant| {
                variant.uploaded_variation().contains(id.as_str())
                    || variant
                        .existing_variation()
                        .is_some_and(|existing| existing.contains(id.as_str()))
            });
            ensure_nonempty(&variants, || Criterion::VariantId(id.clone()))?;
        }

        tracing::debug!(
            transcript = %self.transcript,
            kept = variants.len(),
            "filtered variants"
        );

        Ok(variants)
    }
}

/// Fails with the criterion built by `f` if `variants` is empty.
fn ensure_nonempty<F>(variants: &Records<VariantRecord>, f: F) -> Result<()>
where
    F: FnOnce() -> Criterion,
{
    match variants.is_empty() {
        true => Err(Error::EmptyResult(f())),
        false => Ok(()),
    }
}
