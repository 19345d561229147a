//! Variant records.

use crate::Table;
use crate::record;
use crate::record::ParseError;
use crate::record::Records;
use crate::table::Row;

/// A protein-position range with both bounds unknown.
const UNKNOWN_RANGE: &str = "?-?";

/// The position of a variant along a protein.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProteinPosition {
    /// A single, known residue.
    Known(u64),

    /// The variant has no protein position (e.g. it is intergenic or both
    /// bounds of its range are unknown).
    Unknown,
}

impl ProteinPosition {
    /// Gets the residue, if it is known.
    pub fn get(&self) -> Option<u64> {
        match self {
            ProteinPosition::Known(position) => Some(*position),
            ProteinPosition::Unknown => None,
        }
    }
}

impl std::str::FromStr for ProteinPosition {
    type Err = ParseError;

    /// Parses a resolved protein position.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::record::ProteinPosition;
    ///
    /// assert_eq!("105".parse::<ProteinPosition>()?, ProteinPosition::Known(105));
    /// assert_eq!("-".parse::<ProteinPosition>()?, ProteinPosition::Unknown);
    /// assert_eq!("?-?".parse::<ProteinPosition>()?, ProteinPosition::Unknown);
    /// assert!("120-123".parse::<ProteinPosition>().is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() || s == record::MISSING_VALUE || s == UNKNOWN_RANGE {
            return Ok(ProteinPosition::Unknown);
        }

        s.parse()
            .map(ProteinPosition::Known)
            .map_err(|_| ParseError::InvalidNumber {
                column: record::PROTEIN_POSITION.to_string(),
                value: s.to_string(),
            })
    }
}

/// An annotated variant at a single protein position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariantRecord {
    /// The uploaded variation identifier.
    uploaded_variation: String,

    /// The known variation identifiers co-located with the variant.
    existing_variation: Option<String>,

    /// The transcript identifier.
    feature: String,

    /// The consequence terms.
    consequence: String,

    /// The protein position.
    protein_position: ProteinPosition,

    /// The full row the record was parsed from.
    row: Row,
}

impl VariantRecord {
    /// Gets the uploaded variation identifier.
    pub fn uploaded_variation(&self) -> &str {
        &self.uploaded_variation
    }

    /// Gets the co-located known variation identifiers.
    ///
    /// Returns [`None`] when the store has no such column or the value is
    /// missing.
    pub fn existing_variation(&self) -> Option<&str> {
        self.existing_variation.as_deref()
    }

    /// Gets the transcript identifier.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Gets the raw consequence field.
    pub fn consequence(&self) -> &str {
        &self.consequence
    }

    /// Gets the protein position.
    pub fn protein_position(&self) -> ProteinPosition {
        self.protein_position
    }

    /// Gets the full row.
    pub fn row(&self) -> &Row {
        &self.row
    }
}

/// The indices of the columns of a variant table.
struct Columns {
    /// The uploaded variation column.
    uploaded_variation: usize,

    /// The existing variation column, if any.
    existing_variation: Option<usize>,

    /// The transcript column.
    feature: usize,

    /// The consequence column.
    consequence: usize,

    /// The protein position column.
    protein_position: usize,
}

impl Columns {
    /// Locates the columns within `table`.
    fn try_from_table(table: &Table) -> Result<Self, ParseError> {
        Ok(Self {
            uploaded_variation: record::required(table, record::UPLOADED_VARIATION)?,
            existing_variation: table.column(record::EXISTING_VARIATION),
            feature: record::required(table, record::FEATURE)?,
            consequence: record::required(table, record::CONSEQUENCE)?,
            protein_position: record::required(table, record::PROTEIN_POSITION)?,
        })
    }

    /// Parses a record from `row`.
    fn parse(&self, row: Row) -> Result<VariantRecord, ParseError> {
        let uploaded_variation =
            record::text(&row, self.uploaded_variation, record::UPLOADED_VARIATION)?.to_string();

        let existing_variation = match self.existing_variation {
            Some(i) => {
                let value = record::text(&row, i, record::EXISTING_VARIATION)?;
                match value.is_empty() || value == record::MISSING_VALUE {
                    true => None,
                    false => Some(value.to_string()),
                }
            }
            None => None,
        };

        let feature = record::text(&row, self.feature, record::FEATURE)?.to_string();
        let consequence = record::text(&row, self.consequence, record::CONSEQUENCE)?.to_string();
        let protein_position =
            record::text(&row, self.protein_position, record::PROTEIN_POSITION)?.parse()?;

        Ok(VariantRecord {
            uploaded_variation,
            existing_variation,
            feature,
            consequence,
            protein_position,
            row,
        })
    }
}

impl TryFrom<Table> for Records<VariantRecord> {
    type Error = ParseError;

    /// Parses every row of a resolved variant table.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::record::ProteinPosition;
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
    ///     vec![Row::new(vec![
    ///         "V1".into(),
    ///         "T1".into(),
    ///         "missense_variant".into(),
    ///         "105".into(),
    ///     ])],
    /// )?;
    ///
    /// let records = Records::<VariantRecord>::try_from(table)?;
    /// let variant = &records.records()[0];
    /// assert_eq!(variant.protein_position(), ProteinPosition::Known(105));
    /// assert_eq!(variant.existing_variation(), None);
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

    const HEADER: [&str; 5] = [
        "Uploaded_variation",
        "Existing_variation",
        "Feature",
        "Consequence",
        "Protein_position",
    ];

    fn table(rows: &[[&str; 5]]) -> Table {
        Table::try_from_parts(
            HEADER.iter().map(|name| name.to_string()).collect(),
            rows.iter()
                .map(|row| Row::new(row.iter().map(|field| (*field).into()).collect()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_existing_variation_is_none() -> Result<(), Box<dyn std::error::Error>> {
        let records = Records::<VariantRecord>::try_from(table(&[
            ["V1", "-", "T1", "missense_variant", "105"],
            ["V2", "rs99", "T1", "synonymous_variant", "-"],
        ]))?;

        assert_eq!(records.len(), 2);
        assert_eq!(records.records()[0].existing_variation(), None);
        assert_eq!(records.records()[1].existing_variation(), Some("rs99"));
        assert_eq!(
            records.records()[1].protein_position(),
            ProteinPosition::Unknown
        );

        Ok(())
    }

    #[test]
    fn test_unresolved_range_is_rejected() {
        let err = Records::<VariantRecord>::try_from(table(&[[
            "V1",
            "-",
            "T1",
            "inframe_deletion",
            "120-123",
        ]]))
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "invalid number in column Protein_position: \"120-123\""
        );
    }

    #[test]
    fn test_missing_feature_column() {
        let table = Table::new(vec![String::from("Uploaded_variation")]);
        let err = Records::<VariantRecord>::try_from(table).unwrap_err();
        assert_eq!(err.to_string(), "missing column: Feature");
    }
}
