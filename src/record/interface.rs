//! Interface records.

use crate::Table;
use crate::record;
use crate::record::ParseError;
use crate::record::Records;
use crate::table::Row;

/// A residue range of a protein that forms an interface on a structure.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceRecord {
    /// The protein identifier, if the store carries one.
    protein_id: Option<String>,

    /// The structure feature identifier.
    structure_feature_id: String,

    /// The first residue of the range.
    start: u64,

    /// The last residue of the range (inclusive).
    end: u64,

    /// The sequence identity percentage.
    pident: f64,

    /// The full row the record was parsed from.
    row: Row,
}

impl InterfaceRecord {
    /// Gets the protein identifier.
    pub fn protein_id(&self) -> Option<&str> {
        self.protein_id.as_deref()
    }

    /// Gets the structure feature identifier.
    pub fn structure_feature_id(&self) -> &str {
        &self.structure_feature_id
    }

    /// Gets the first residue of the range.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Gets the last residue of the range.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Gets the sequence identity percentage.
    pub fn pident(&self) -> f64 {
        self.pident
    }

    /// Gets the full row.
    pub fn row(&self) -> &Row {
        &self.row
    }

    /// Returns whether `position` falls within the range.
    pub fn contains(&self, position: u64) -> bool {
        self.start <= position && position <= self.end
    }
}

/// The indices of the columns of an interface table.
struct Columns {
    /// The protein identifier column, if any.
    protein_id: Option<usize>,

    /// The structure feature identifier column.
    structure_feature_id: usize,

    /// The start position column.
    start: usize,

    /// The end position column.
    end: usize,

    /// The sequence identity column.
    pident: usize,
}

impl Columns {
    /// Locates the columns within `table`.
    fn try_from_table(table: &Table) -> Result<Self, ParseError> {
        Ok(Self {
            protein_id: table.column(record::PROTEIN_ACCESSION),
            structure_feature_id: record::required(table, record::STRUCTURE_FEATURE_ID)?,
            start: record::required(table, record::PROTEIN_START_POSITION)?,
            end: record::required(table, record::PROTEIN_END_POSITION)?,
            pident: record::required(table, record::PIDENT)?,
        })
    }

    /// Parses a record from `row`.
    fn parse(&self, row: Row) -> Result<InterfaceRecord, ParseError> {
        let protein_id = match self.protein_id {
            Some(i) => Some(record::text(&row, i, record::PROTEIN_ACCESSION)?.to_string()),
            None => None,
        };

        let structure_feature_id =
            record::text(&row, self.structure_feature_id, record::STRUCTURE_FEATURE_ID)?
                .to_string();
        let start = record::number(&row, self.start, record::PROTEIN_START_POSITION)?;
        let end = record::number(&row, self.end, record::PROTEIN_END_POSITION)?;
        let pident = record::number(&row, self.pident, record::PIDENT)?;

        if start > end {
            return Err(ParseError::InvalidRange { start, end });
        }

        Ok(InterfaceRecord {
            protein_id,
            structure_feature_id,
            start,
            end,
            pident,
            row,
        })
    }
}

impl TryFrom<Table> for Records<InterfaceRecord> {
    type Error = ParseError;

    /// Parses every row of an (expanded) interface table.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::record::InterfaceRecord;
    /// use pdbmapper::record::Records;
    /// use pdbmapper::table::Row;
    /// use pdbmapper::Table;
    ///
    /// let table = Table::try_from_parts(
    ///     vec![
    ///         String::from("Structure_feature_id"),
    ///         String::from("Protein_start_position"),
    ///         String::from("Protein_end_position"),
    ///         String::from("Pident"),
    ///     ],
    ///     vec![Row::new(vec!["F1".into(), "100".into(), "110".into(), "90.5".into()])],
    /// )?;
    ///
    /// let records = Records::<InterfaceRecord>::try_from(table)?;
    /// let interface = &records.records()[0];
    /// assert_eq!(interface.structure_feature_id(), "F1");
    /// assert!(interface.contains(110));
    /// assert!(!interface.contains(111));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn try_from(table: Table) -> Result<Self, Self::Error> {
        let columns = Columns::try_from_table(&table)?;
        let (header, rows) = table.into_parts();

        let records = rows
            .into_iter()
            .map(|row| columns.parse(row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Records { header, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(header: &[&str], row: &[&str]) -> Table {
        Table::try_from_parts(
            header.iter().map(|name| name.to_string()).collect(),
            vec![Row::new(row.iter().map(|field| (*field).into()).collect())],
        )
        .unwrap()
    }

    const HEADER: [&str; 4] = [
        "Structure_feature_id",
        "Protein_start_position",
        "Protein_end_position",
        "Pident",
    ];

    #[test]
    fn test_missing_structure_feature_id() {
        let table = table(
            &["Protein_accession", "Protein_start_position", "Protein_end_position", "Pident"],
            &["P1", "1", "2", "90"],
        );
        let err = Records::<InterfaceRecord>::try_from(table).unwrap_err();
        assert_eq!(err.to_string(), "missing column: Structure_feature_id");
    }

    #[test]
    fn test_reversed_range() {
        let table = table(&HEADER, &["F1", "20", "10", "90"]);
        let err = Records::<InterfaceRecord>::try_from(table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid range: start position 20 is greater than end position 10"
        );
    }

    #[test]
    fn test_invalid_pident() {
        let table = table(&HEADER, &["F1", "1", "2", "high"]);
        let err = Records::<InterfaceRecord>::try_from(table).unwrap_err();
        assert_eq!(err.to_string(), "invalid number in column Pident: \"high\"");
    }

    #[test]
    fn test_protein_id_is_optional() -> Result<(), Box<dyn std::error::Error>> {
        let records = Records::<InterfaceRecord>::try_from(table(&HEADER, &["F1", "5", "5", "100"]))?;
        assert_eq!(records.records()[0].protein_id(), None);
        assert_eq!(records.records()[0].start(), 5);
        assert!(records.records()[0].contains(5));

        let records = Records::<InterfaceRecord>::try_from(table(
            &["Protein_accession", "Structure_feature_id", "Protein_start_position", "Protein_end_position", "Pident"],
            &["ENSP01", "F1", "5", "9", "87.5"],
        ))?;
        assert_eq!(records.records()[0].protein_id(), Some("ENSP01"));
        assert_eq!(records.records()[0].pident(), 87.5);

        Ok(())
    }
}
