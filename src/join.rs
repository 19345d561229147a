//! Joining variant positions against interface residue ranges.
//!
//! A variant maps onto an interface when its protein position lies within
//! the interface's closed range `[Protein_start_position,
//! Protein_end_position]`. Containment is answered numerically through an
//! [`Index`], so no range ever needs to be expanded into positions.
//!
//! Two views are produced:
//!
//! - the **inner** join keeps only the (variant, interface) pairs that
//!   map, fanning out when a position lies in several interfaces;
//! - the **outer** join additionally keeps unmatched variants and
//!   unmatched interfaces, with the fields of the missing side left empty.

use crate::Table;
use crate::record;
use crate::record::InterfaceRecord;
use crate::record::VariantRecord;
use crate::table;
use crate::table::Cell;
use crate::table::Row;

pub mod index;

pub use index::Index;

/// An error related to joining.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// A table error.
    Table(table::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Table(err) => write!(f, "table error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A variant paired with an interface that contains its position.
#[derive(Clone, Copy, Debug)]
pub struct Pair<'a> {
    /// The variant.
    variant: &'a VariantRecord,

    /// The interface.
    interface: &'a InterfaceRecord,
}

impl<'a> Pair<'a> {
    /// Gets the variant.
    pub fn variant(&self) -> &'a VariantRecord {
        self.variant
    }

    /// Gets the interface.
    pub fn interface(&self) -> &'a InterfaceRecord {
        self.interface
    }
}

/// A row of the outer join.
#[derive(Clone, Copy, Debug)]
pub enum Located<'a> {
    /// A variant within an interface.
    Mapped(Pair<'a>),

    /// A variant outside of every interface.
    Variant(&'a VariantRecord),

    /// An interface containing no variant.
    Interface(&'a InterfaceRecord),
}

/// Joins variants against a fixed set of interfaces.
#[derive(Debug)]
pub struct Joiner<'a> {
    /// The interfaces.
    interfaces: &'a [InterfaceRecord],

    /// The index over `interfaces`.
    index: Index,
}

impl<'a> Joiner<'a> {
    /// Creates a joiner over `interfaces`.
    pub fn new(interfaces: &'a [InterfaceRecord]) -> Self {
        Self {
            interfaces,
            index: Index::new(interfaces),
        }
    }

    /// Gets the interfaces containing `variant`, in interface order.
    ///
    /// A variant with an unknown position matches nothing.
    fn matches(&self, variant: &VariantRecord) -> Vec<usize> {
        match variant.protein_position().get() {
            Some(position) => self.index.find(position),
            None => Vec::new(),
        }
    }

    /// Computes the inner join of `variants` against the interfaces.
    ///
    /// Pairs are emitted in variant order, then interface order.
    pub fn inner<'v>(&self, variants: &'v [VariantRecord]) -> Vec<Pair<'v>>
    where
        'a: 'v,
    {
        let interfaces = self.interfaces;

        variants
            .iter()
            .flat_map(|variant| {
                self.matches(variant).into_iter().map(move |i| Pair {
                    variant,
                    interface: &interfaces[i],
                })
            })
            .collect()
    }

    /// Computes the outer join of `variants` against the interfaces.
    ///
    /// Variants are emitted first, in order, each either with its matching
    /// interfaces or alone. The interfaces that matched no variant follow
    /// in interface order.
    pub fn outer<'v>(&self, variants: &'v [VariantRecord]) -> Vec<Located<'v>>
    where
        'a: 'v,
    {
        let interfaces = self.interfaces;
        let mut matched = vec![false; interfaces.len()];
        let mut located = Vec::new();

        for variant in variants {
            let before = located.len();

            for i in self.matches(variant) {
                matched[i] = true;
                located.push(Located::Mapped(Pair {
                    variant,
                    interface: &interfaces[i],
                }));
            }

            if located.len() == before {
                located.push(Located::Variant(variant));
            }
        }

        located.extend(
            interfaces
                .iter()
                .zip(matched)
                .filter(|(_, matched)| !matched)
                .map(|(interface, _)| Located::Interface(interface)),
        );

        located
    }
}

/// The column layout of a joined row.
///
/// A joined row holds every variant column followed by the interface
/// columns whose names do not already appear among the variant columns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    /// The joined column names.
    header: Vec<String>,

    /// The number of variant columns.
    variant_width: usize,

    /// The interface columns carried into the joined row.
    interface_columns: Vec<usize>,
}

impl Layout {
    /// Creates the layout joining `variant_header` with `interface_header`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::join::Layout;
    ///
    /// let variant = vec![String::from("Uploaded_variation"), String::from("Protein_position")];
    /// let interface = vec![String::from("Structure_feature_id"), String::from("Protein_position")];
    ///
    /// let layout = Layout::new(&variant, &interface);
    /// assert_eq!(
    ///     layout.header(),
    ///     ["Uploaded_variation", "Protein_position", "Structure_feature_id"]
    /// );
    /// ```
    pub fn new(variant_header: &[String], interface_header: &[String]) -> Self {
        let mut header = variant_header.to_vec();
        let mut interface_columns = Vec::new();

        for (i, name) in interface_header.iter().enumerate() {
            if !variant_header.contains(name) {
                header.push(name.clone());
                interface_columns.push(i);
            }
        }

        Self {
            header,
            variant_width: variant_header.len(),
            interface_columns,
        }
    }

    /// Gets the joined column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Builds the joined row for either side, or both.
    fn row(&self, variant: Option<&VariantRecord>, interface: Option<&InterfaceRecord>) -> Row {
        let mut cells = Vec::with_capacity(self.header.len());

        match variant {
            Some(variant) => cells.extend(variant.row().cells().iter().cloned()),
            None => cells.extend((0..self.variant_width).map(|_| Cell::from(""))),
        }

        for &i in &self.interface_columns {
            let cell = interface
                .and_then(|interface| interface.row().get(i))
                .cloned()
                .unwrap_or_else(|| Cell::from(""));
            cells.push(cell);
        }

        Row::new(cells)
    }

    /// Builds the deduplicated table of the inner join.
    pub fn mapped(&self, pairs: &[Pair<'_>]) -> Result<Table> {
        let rows = pairs
            .iter()
            .map(|pair| self.row(Some(pair.variant), Some(pair.interface)))
            .collect();

        let mut table = Table::try_from_parts(self.header.clone(), rows).map_err(Error::Table)?;
        table.dedup();
        Ok(table)
    }

    /// Builds the table of the outer join.
    pub fn located(&self, located: &[Located<'_>]) -> Result<Table> {
        let rows = located
            .iter()
            .map(|entry| match entry {
                Located::Mapped(pair) => self.row(Some(pair.variant), Some(pair.interface)),
                Located::Variant(variant) => self.row(Some(variant), None),
                Located::Interface(interface) => self.row(None, Some(interface)),
            })
            .collect();

        Table::try_from_parts(self.header.clone(), rows).map_err(Error::Table)
    }
}

/// Builds the deduplicated (structure feature, uploaded variation) table
/// from the inner join.
///
/// Pairs keep the order in which they were first seen.
pub fn set_ids(pairs: &[Pair<'_>]) -> Result<Table> {
    let header = vec![
        String::from(record::STRUCTURE_FEATURE_ID),
        String::from(record::UPLOADED_VARIATION),
    ];

    let rows = pairs
        .iter()
        .map(|pair| {
            Row::new(vec![
                Cell::from(pair.interface.structure_feature_id()),
                Cell::from(pair.variant.uploaded_variation()),
            ])
        })
        .collect();

    let mut table = Table::try_from_parts(header, rows).map_err(Error::Table)?;
    table.dedup();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Records;

    fn interfaces() -> Records<InterfaceRecord> {
        let table = Table::try_from_parts(
            vec![
                String::from("Structure_feature_id"),
                String::from("Protein_start_position"),
                String::from("Protein_end_position"),
                String::from("Pident"),
                String::from("Protein_position"),
            ],
            vec![
                Row::new(vec![
                    "F1".into(),
                    "100".into(),
                    "110".into(),
                    "90".into(),
                    "100".into(),
                ]),
                Row::new(vec![
                    "F2".into(),
                    "108".into(),
                    "115".into(),
                    "90".into(),
                    "108".into(),
                ]),
                Row::new(vec![
                    "F3".into(),
                    "300".into(),
                    "310".into(),
                    "90".into(),
                    "300".into(),
                ]),
            ],
        )
        .unwrap();

        Records::try_from(table).unwrap()
    }

    fn variants(rows: &[(&str, &str)]) -> Records<VariantRecord> {
        let table = Table::try_from_parts(
            vec![
                String::from("Uploaded_variation"),
                String::from("Feature"),
                String::from("Consequence"),
                String::from("Protein_position"),
            ],
            rows.iter()
                .map(|(id, position)| {
                    Row::new(vec![
                        (*id).into(),
                        "T1".into(),
                        "missense_variant".into(),
                        (*position).into(),
                    ])
                })
                .collect(),
        )
        .unwrap();

        Records::try_from(table).unwrap()
    }

    fn rendered(table: &Table) -> Vec<Vec<String>> {
        table.rows().iter().map(Row::to_strings).collect()
    }

    #[test]
    fn test_inner_join_fans_out_over_overlapping_interfaces() {
        let interfaces = interfaces();
        let variants = variants(&[("V1", "105"), ("V2", "109"), ("V3", "200")]);
        let joiner = Joiner::new(interfaces.records());

        let pairs = joiner
            .inner(variants.records())
            .iter()
            .map(|pair| {
                (
                    pair.variant().uploaded_variation(),
                    pair.interface().structure_feature_id(),
                )
            })
            .collect::<Vec<_>>();

        assert_eq!(pairs, vec![("V1", "F1"), ("V2", "F1"), ("V2", "F2")]);
    }

    #[test]
    fn test_unknown_positions_never_match() {
        let interfaces = interfaces();
        let variants = variants(&[("V1", "-"), ("V2", "?-?")]);
        let joiner = Joiner::new(interfaces.records());

        assert!(joiner.inner(variants.records()).is_empty());
        assert_eq!(joiner.outer(variants.records()).len(), 5);
    }

    #[test]
    fn test_inner_rows_are_contained_in_outer_rows()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let interfaces = interfaces();
        let variants = variants(&[("V1", "105"), ("V2", "109"), ("V3", "200")]);
        let joiner = Joiner::new(interfaces.records());
        let layout = Layout::new(variants.header(), interfaces.header());

        let mapped = layout.mapped(&joiner.inner(variants.records()))?;
        let located = layout.located(&joiner.outer(variants.records()))?;

        assert!(located.len() >= mapped.len());

        let located = rendered(&located);
        for row in rendered(&mapped) {
            assert!(located.contains(&row));
        }

        // V3 is unmatched and F3 holds no variant.
        assert_eq!(
            located[3],
            vec!["V3", "T1", "missense_variant", "200", "", "", "", ""]
        );
        assert_eq!(
            located[4],
            vec!["", "", "", "", "F3", "300", "310", "90"]
        );

        Ok(())
    }

    #[test]
    fn test_layout_drops_shared_columns() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let interfaces = interfaces();
        let variants = variants(&[("V1", "105")]);
        let layout = Layout::new(variants.header(), interfaces.header());

        assert_eq!(
            layout.header(),
            [
                "Uploaded_variation",
                "Feature",
                "Consequence",
                "Protein_position",
                "Structure_feature_id",
                "Protein_start_position",
                "Protein_end_position",
                "Pident",
            ]
        );

        let joiner = Joiner::new(interfaces.records());
        let mapped = layout.mapped(&joiner.inner(variants.records()))?;
        assert_eq!(
            rendered(&mapped),
            vec![vec!["V1", "T1", "missense_variant", "105", "F1", "100", "110", "90"]]
        );

        Ok(())
    }

    #[test]
    fn test_set_ids_are_deduplicated() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let interfaces = interfaces();
        let variants = variants(&[("V1", "101"), ("V1", "102"), ("V2", "109")]);
        let joiner = Joiner::new(interfaces.records());

        let mut table = set_ids(&joiner.inner(variants.records()))?;
        assert_eq!(table.header(), ["Structure_feature_id", "Uploaded_variation"]);
        assert_eq!(
            rendered(&table),
            vec![vec!["F1", "V1"], vec!["F1", "V2"], vec!["F2", "V2"]]
        );

        let once = table.clone();
        table.dedup();
        assert_eq!(table, once);

        Ok(())
    }
}
