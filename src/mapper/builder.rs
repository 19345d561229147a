//! A builder for a [`Mapper`].

use std::path::PathBuf;

use nonempty::NonEmpty;

use crate::mapper::Mapper;
use crate::store::Store;

/// An error that occurs when a required field was never provided to the
/// [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MissingError {
    /// No interface store was provided to the [`Builder`].
    InterfaceStore,

    /// No variant store was provided to the [`Builder`].
    VariantStore,

    /// No output directory was provided to the [`Builder`].
    OutDir,
}

impl std::fmt::Display for MissingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingError::InterfaceStore => write!(f, "interface store"),
            MissingError::VariantStore => write!(f, "variant store"),
            MissingError::OutDir => write!(f, "output directory"),
        }
    }
}

impl std::error::Error for MissingError {}

/// An error that occurs when a singular field was provided multiple times to
/// the [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum MultipleError {
    /// The interface store was provided multiple times to the [`Builder`].
    InterfaceStore,

    /// The variant store was provided multiple times to the [`Builder`].
    VariantStore,

    /// The output directory was provided multiple times to the [`Builder`].
    OutDir,

    /// The identity threshold was provided multiple times to the
    /// [`Builder`].
    Pident,

    /// The variant identifier was provided multiple times to the
    /// [`Builder`].
    VariantId,
}

impl std::fmt::Display for MultipleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipleError::InterfaceStore => write!(f, "interface store"),
            MultipleError::VariantStore => write!(f, "variant store"),
            MultipleError::OutDir => write!(f, "output directory"),
            MultipleError::Pident => write!(f, "identity threshold"),
            MultipleError::VariantId => write!(f, "variant id"),
        }
    }
}

impl std::error::Error for MultipleError {}

/// An error related to a [`Builder`].
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// An error where a required field was never provided to the [`Builder`].
    Missing(MissingError),

    /// An error where a singular field was provided to the [`Builder`] more
    /// than once.
    Multiple(MultipleError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Missing(err) => write!(f, "missing required field: {err}"),
            Error::Multiple(err) => write!(f, "singular field set multiple times: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Mapper`].
#[derive(Debug, Default)]
pub struct Builder {
    /// The interface store.
    interface_store: Option<Store>,

    /// The variant store.
    variant_store: Option<Store>,

    /// The output directory.
    out_dir: Option<PathBuf>,

    /// The identity threshold.
    pident: Option<u32>,

    /// The isoform labels.
    isoforms: Vec<String>,

    /// The consequence terms.
    consequences: Option<NonEmpty<String>>,

    /// The variant identifier.
    variant_id: Option<String>,
}

impl Builder {
    /// Sets the interface store for the [`Builder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::mapper::Builder;
    ///
    /// let builder = Builder::default().interface_store("intDB")?;
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn interface_store(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        if self.interface_store.is_some() {
            return Err(Error::Multiple(MultipleError::InterfaceStore));
        }

        self.interface_store = Some(Store::new(path));
        Ok(self)
    }

    /// Sets the variant store for the [`Builder`].
    pub fn variant_store(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        if self.variant_store.is_some() {
            return Err(Error::Multiple(MultipleError::VariantStore));
        }

        self.variant_store = Some(Store::new(path));
        Ok(self)
    }

    /// Sets the output directory for the [`Builder`].
    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        if self.out_dir.is_some() {
            return Err(Error::Multiple(MultipleError::OutDir));
        }

        self.out_dir = Some(path.into());
        Ok(self)
    }

    /// Sets the identity threshold (a percentage) for the [`Builder`].
    pub fn pident(mut self, pident: u32) -> Result<Self> {
        if self.pident.is_some() {
            return Err(Error::Multiple(MultipleError::Pident));
        }

        self.pident = Some(pident);
        Ok(self)
    }

    /// Sets the variant identifier for the [`Builder`].
    pub fn variant_id(mut self, id: impl Into<String>) -> Result<Self> {
        if self.variant_id.is_some() {
            return Err(Error::Multiple(MultipleError::VariantId));
        }

        self.variant_id = Some(id.into());
        Ok(self)
    }

    /// Pushes an isoform label into the [`Builder`].
    pub fn push_isoform(mut self, isoform: impl Into<String>) -> Self {
        self.isoforms.push(isoform.into());
        self
    }

    /// Pushes a consequence term into the [`Builder`].
    pub fn push_consequence(mut self, term: impl Into<String>) -> Self {
        let term = term.into();

        let consequences = match self.consequences {
            Some(mut consequences) => {
                consequences.push(term);
                consequences
            }
            None => NonEmpty::new(term),
        };

        self.consequences = Some(consequences);
        self
    }

    /// Consumes `self` to attempt to build a [`Mapper`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::mapper::Builder;
    ///
    /// let mapper = Builder::default()
    ///     .interface_store("intDB")?
    ///     .variant_store("varDB")?
    ///     .out_dir("out")?
    ///     .pident(50)?
    ///     .push_isoform("principal")
    ///     .push_consequence("missense_variant")
    ///     .try_build()?;
    ///
    /// assert_eq!(
    ///     mapper.parameters().mapped_filename(),
    ///     "MappedVariants_pident50_isoform_principal_consequence_missense_variant.File"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build(self) -> Result<Mapper> {
        let interfaces = self
            .interface_store
            .ok_or(Error::Missing(MissingError::InterfaceStore))?;

        let variants = self
            .variant_store
            .ok_or(Error::Missing(MissingError::VariantStore))?;

        let out_dir = self.out_dir.ok_or(Error::Missing(MissingError::OutDir))?;

        Ok(Mapper {
            interfaces,
            variants,
            out_dir,
            pident: self.pident,
            isoforms: self.isoforms,
            consequences: self.consequences,
            variant_id: self.variant_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_fails_to_produce_a_mapper_when_no_variant_store_is_provided()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .interface_store("intDB")?
            .out_dir("out")?
            .try_build()
            .unwrap_err();

        assert_eq!(err.to_string(), "missing required field: variant store");

        Ok(())
    }

    #[test]
    fn it_fails_to_produce_a_mapper_when_no_output_directory_is_provided()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default()
            .interface_store("intDB")?
            .variant_store("varDB")?
            .try_build()
            .unwrap_err();

        assert_eq!(err, Error::Missing(MissingError::OutDir));

        Ok(())
    }

    #[test]
    fn it_fails_when_the_identity_threshold_is_provided_more_than_once()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let err = Builder::default().pident(80)?.pident(50).unwrap_err();

        assert_eq!(
            err.to_string(),
            "singular field set multiple times: identity threshold"
        );

        Ok(())
    }

    #[test]
    fn it_collects_repeated_isoforms_and_consequences()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mapper = Builder::default()
            .interface_store("intDB")?
            .variant_store("varDB")?
            .out_dir("out")?
            .push_isoform("principal")
            .push_isoform("alternative")
            .push_consequence("missense_variant")
            .push_consequence("stop_gained")
            .variant_id("rs1")?
            .try_build()?;

        let parameters = mapper.parameters();
        assert_eq!(parameters.pident, None);
        assert_eq!(parameters.isoforms, vec!["principal", "alternative"]);
        assert_eq!(parameters.consequences, vec!["missense_variant", "stop_gained"]);

        Ok(())
    }
}
