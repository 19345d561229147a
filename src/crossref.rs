//! Cross-referencing of Ensembl identifiers.
//!
//! Interfaces are stored per protein and variants per gene, so mapping a
//! protein requires knowing its gene and transcript. The cross-reference is
//! read from an Ensembl BioMart export with (at least) the columns `Gene
//! stable ID`, `Transcript stable ID` and `Protein stable ID`.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::io::{self};
use std::path::Path;

use crate::mapper::Unit;

/// The column holding gene identifiers.
pub const GENE_COLUMN: &str = "Gene stable ID";

/// The column holding transcript identifiers.
pub const TRANSCRIPT_COLUMN: &str = "Transcript stable ID";

/// The column holding protein identifiers.
pub const PROTEIN_COLUMN: &str = "Protein stable ID";

/// The prefix of Ensembl protein identifiers.
const PROTEIN_PREFIX: &str = "ENSP";

/// The prefix of Ensembl gene identifiers.
const GENE_PREFIX: &str = "ENSG";

/// An error related to a [`CrossRef`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A parse error.
    Csv(csv::Error),

    /// A required column is not present in the header.
    MissingColumn(&'static str),

    /// The identifier is neither a protein nor a gene identifier.
    UnrecognizedId(String),

    /// The identifier is not present in the cross-reference.
    NotFound(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Csv(err) => write!(f, "parse error: {err}"),
            Error::MissingColumn(column) => write!(f, "missing column: {column}"),
            Error::UnrecognizedId(id) => write!(
                f,
                "unrecognized identifier: {id} (expected an Ensembl protein or gene identifier)"
            ),
            Error::NotFound(id) => write!(f, "identifier not found in cross-reference: {id}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A cross-reference between Ensembl gene, transcript and protein
/// identifiers.
#[derive(Clone, Debug, Default)]
pub struct CrossRef {
    /// Every protein-coding (protein, gene, transcript) triple.
    units: Vec<Unit>,
}

impl CrossRef {
    /// Reads a cross-reference from a BioMart CSV export.
    ///
    /// Rows without a protein identifier (non-coding transcripts) are
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::crossref::CrossRef;
    ///
    /// let data = "Gene stable ID,Transcript stable ID,Protein stable ID\n\
    ///             ENSG01,ENST01,ENSP01\n\
    ///             ENSG01,ENST02,ENSP02\n\
    ///             ENSG01,ENST03,\n";
    /// let crossref = CrossRef::from_reader(data.as_bytes())?;
    ///
    /// let units = crossref.units("ENSP02")?;
    /// assert_eq!(units.len(), 1);
    /// assert_eq!(units[0].transcript_id(), "ENST02");
    ///
    /// assert_eq!(crossref.units("ENSG01")?.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R>(reader: R) -> Result<Self>
    where
        R: Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(Error::Csv)?.clone();
        let position = |column: &'static str| {
            headers
                .iter()
                .position(|name| name == column)
                .ok_or(Error::MissingColumn(column))
        };

        let gene = position(GENE_COLUMN)?;
        let transcript = position(TRANSCRIPT_COLUMN)?;
        let protein = position(PROTEIN_COLUMN)?;

        let mut units = Vec::new();
        let mut seen = HashSet::new();

        for result in reader.records() {
            let record = result.map_err(Error::Csv)?;

            let (Some(gene_id), Some(transcript_id), Some(protein_id)) =
                (record.get(gene), record.get(transcript), record.get(protein))
            else {
                continue;
            };

            if protein_id.is_empty() {
                continue;
            }

            let unit = Unit::new(protein_id, gene_id, transcript_id);
            if seen.insert(unit.clone()) {
                units.push(unit);
            }
        }

        Ok(Self { units })
    }

    /// Reads a cross-reference from the BioMart CSV export at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(Error::Io)?;
        Self::from_reader(file)
    }

    /// Gets the number of known units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns whether no units are known.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Gets the units of a protein (`ENSP…`) or of every protein of a gene
    /// (`ENSG…`), in file order.
    pub fn units(&self, id: &str) -> Result<Vec<Unit>> {
        let units = if id.starts_with(PROTEIN_PREFIX) {
            self.units
                .iter()
                .filter(|unit| unit.protein_id() == id)
                .cloned()
                .collect::<Vec<_>>()
        } else if id.starts_with(GENE_PREFIX) {
            self.units
                .iter()
                .filter(|unit| unit.gene_id() == id)
                .cloned()
                .collect::<Vec<_>>()
        } else {
            return Err(Error::UnrecognizedId(id.to_string()));
        };

        match units.is_empty() {
            true => Err(Error::NotFound(id.to_string())),
            false => Ok(units),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = "Gene stable ID,Gene name,Transcript stable ID,Protein stable ID\n\
                        ENSG01,TP53,ENST01,ENSP01\n\
                        ENSG01,TP53,ENST01,ENSP01\n\
                        ENSG02,BRCA2,ENST02,ENSP02\n";

    #[test]
    fn test_duplicate_rows_collapse() -> Result<()> {
        let crossref = CrossRef::from_reader(DATA.as_bytes())?;
        assert_eq!(crossref.len(), 2);
        assert_eq!(
            crossref.units("ENSP01")?,
            vec![Unit::new("ENSP01", "ENSG01", "ENST01")]
        );
        Ok(())
    }

    #[test]
    fn test_unrecognized_and_unknown_ids() -> Result<()> {
        let crossref = CrossRef::from_reader(DATA.as_bytes())?;

        let err = crossref.units("TP53").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized identifier: TP53 (expected an Ensembl protein or gene identifier)"
        );

        let err = crossref.units("ENSG99").unwrap_err();
        assert_eq!(err.to_string(), "identifier not found in cross-reference: ENSG99");

        Ok(())
    }

    #[test]
    fn test_large_export_keeps_file_order() -> Result<()> {
        let mut data = String::from("Gene stable ID,Transcript stable ID,Protein stable ID\n");
        for i in 0..60_000 {
            data.push_str(&format!("ENSG{i:05},ENST{i:05},ENSP{i:05}\n"));
        }
        data.push_str("ENSG00000,ENST00000,ENSP00000\n");

        let crossref = CrossRef::from_reader(data.as_bytes())?;
        assert_eq!(crossref.len(), 60_000);
        assert_eq!(crossref.units[0], Unit::new("ENSP00000", "ENSG00000", "ENST00000"));
        assert_eq!(crossref.units[59_999].protein_id(), "ENSP59999");

        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let err = CrossRef::from_reader("Gene stable ID,Protein stable ID\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "missing column: Transcript stable ID");
    }
}
