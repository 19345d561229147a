//! Append-safe output files.
//!
//! Every output table is appended to a comma-delimited file whose name is
//! derived from the filter parameters of the run. The header is written
//! only when the file is new (or empty), so that many mapping units can be
//! accumulated into the same file.

use std::fs::OpenOptions;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use crate::Table;

/// The placeholder rendered in a filename for an absent parameter.
pub const ABSENT: &str = "None";

/// The extension of every output file.
const EXTENSION: &str = "File";

/// The separator between the values of a multi-valued parameter.
const SEPARATOR: &str = "_";

/// An error related to writing output.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(PathBuf, io::Error),

    /// An error serializing a record.
    Csv(PathBuf, csv::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(path, err) => write!(f, "i/o error writing {}: {err}", path.display()),
            Error::Csv(path, err) => write!(f, "csv error writing {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The filter parameters that name the output files of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parameters {
    /// The identity threshold.
    pub pident: Option<u32>,

    /// The isoform labels.
    pub isoforms: Vec<String>,

    /// The consequence terms.
    pub consequences: Vec<String>,
}

impl Parameters {
    /// Gets the identity threshold as it appears in a filename.
    fn pident(&self) -> String {
        match self.pident {
            Some(pident) => pident.to_string(),
            None => String::from(ABSENT),
        }
    }

    /// Gets the name of the SetID file.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::output::Parameters;
    ///
    /// let parameters = Parameters {
    ///     pident: Some(80),
    ///     ..Default::default()
    /// };
    /// assert_eq!(parameters.set_id_filename(), "setID_pident80.File");
    /// ```
    pub fn set_id_filename(&self) -> String {
        format!("setID_pident{}.{EXTENSION}", self.pident())
    }

    /// Gets the name of the MappedVariants file.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::output::Parameters;
    ///
    /// let parameters = Parameters {
    ///     pident: Some(50),
    ///     isoforms: vec![String::from("principal")],
    ///     consequences: vec![String::from("missense_variant"), String::from("stop_gained")],
    /// };
    /// assert_eq!(
    ///     parameters.mapped_filename(),
    ///     "MappedVariants_pident50_isoform_principal_consequence_missense_variant_stop_gained.File"
    /// );
    /// ```
    pub fn mapped_filename(&self) -> String {
        format!(
            "MappedVariants_pident{}_isoform_{}_consequence_{}.{EXTENSION}",
            self.pident(),
            joined(&self.isoforms),
            joined(&self.consequences)
        )
    }

    /// Gets the name of the LocatedVariants file.
    pub fn located_filename(&self) -> String {
        format!("LocatedVariants_pident{}.{EXTENSION}", self.pident())
    }
}

/// Joins the values of a multi-valued parameter for use in a filename.
fn joined(values: &[String]) -> String {
    match values.is_empty() {
        true => String::from(ABSENT),
        false => values.join(SEPARATOR),
    }
}

/// Appends `table` to the file at `path`, creating it if needed.
///
/// The header is written only if the file is empty before appending.
///
/// # Examples
///
/// ```
/// use pdbmapper::output;
/// use pdbmapper::table::Row;
/// use pdbmapper::Table;
///
/// let dir = tempdir::TempDir::new("output")?;
/// let path = dir.path().join("setID_pident80.File");
///
/// let table = Table::try_from_parts(
///     vec![String::from("Structure_feature_id"), String::from("Uploaded_variation")],
///     vec![Row::new(vec!["F1".into(), "V1".into()])],
/// )?;
///
/// output::append(&path, &table)?;
/// output::append(&path, &table)?;
///
/// let contents = std::fs::read_to_string(&path)?;
/// assert_eq!(contents, "Structure_feature_id,Uploaded_variation\nF1,V1\nF1,V1\n");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn append(path: &Path, table: &Table) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Io(path.to_path_buf(), e))?;

    let is_new = file
        .metadata()
        .map_err(|e| Error::Io(path.to_path_buf(), e))?
        .len()
        == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_new {
        writer
            .write_record(table.header())
            .map_err(|e| Error::Csv(path.to_path_buf(), e))?;
    }

    for row in table.rows() {
        writer
            .write_record(row.to_strings())
            .map_err(|e| Error::Csv(path.to_path_buf(), e))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Io(path.to_path_buf(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::table::Row;

    #[test]
    fn test_absent_parameters_render_as_none() {
        let parameters = Parameters::default();
        assert_eq!(parameters.set_id_filename(), "setID_pidentNone.File");
        assert_eq!(
            parameters.mapped_filename(),
            "MappedVariants_pidentNone_isoform_None_consequence_None.File"
        );
        assert_eq!(parameters.located_filename(), "LocatedVariants_pidentNone.File");
    }

    #[test]
    fn test_header_is_not_repeated_for_existing_files()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("output")?;
        let path = dir.path().join("out.File");
        std::fs::write(&path, "a,b\n1,2\n")?;

        let table = Table::try_from_parts(
            vec![String::from("a"), String::from("b")],
            vec![Row::new(vec!["3".into(), "[4, 5]".into()])],
        )?;
        append(&path, &table)?;

        assert_eq!(std::fs::read_to_string(&path)?, "a,b\n1,2\n3,\"[4, 5]\"\n");

        Ok(())
    }
}
