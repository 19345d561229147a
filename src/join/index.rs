//! An interval index over interface residue ranges.

use rust_lapper as lapper;

use crate::record::InterfaceRecord;

/// The inner value of the interface lookup data structure.
type Iv = lapper::Interval<u64, usize>;

/// An index answering which interfaces contain a residue.
///
/// Interface ranges are closed (`[start, end]`); they are stored half-open
/// as `[start, end + 1)`. Each interval carries the position of its
/// interface within the slice the index was built from.
#[derive(Debug)]
pub struct Index {
    /// The inner lookup table of residue ranges to interface positions.
    inner: lapper::Lapper<u64, usize>,
}

impl Index {
    /// Builds an index over `interfaces`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::join::Index;
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
    ///     vec![
    ///         Row::new(vec!["F1".into(), "100".into(), "110".into(), "90".into()]),
    ///         Row::new(vec!["F2".into(), "105".into(), "120".into(), "90".into()]),
    ///     ],
    /// )?;
    /// let interfaces = Records::<InterfaceRecord>::try_from(table)?;
    ///
    /// let index = Index::new(interfaces.records());
    /// assert_eq!(index.find(100), vec![0]);
    /// assert_eq!(index.find(110), vec![0, 1]);
    /// assert!(index.find(121).is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(interfaces: &[InterfaceRecord]) -> Self {
        let intervals = interfaces
            .iter()
            .enumerate()
            .map(|(i, interface)| Iv {
                start: interface.start(),
                stop: interface.end().saturating_add(1),
                val: i,
            })
            .collect::<Vec<_>>();

        Self {
            inner: lapper::Lapper::new(intervals),
        }
    }

    /// Gets the positions of every interface containing `position`, in
    /// ascending order.
    pub fn find(&self, position: u64) -> Vec<usize> {
        let mut results = self
            .inner
            .find(position, position.saturating_add(1))
            .map(|iv| iv.val)
            .collect::<Vec<_>>();

        results.sort_unstable();
        results
    }

    /// Gets the number of indexed interfaces.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns whether no interfaces are indexed.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Table;
    use crate::record::Records;
    use crate::table::Row;

    fn interfaces(ranges: &[(u64, u64)]) -> Records<InterfaceRecord> {
        let table = Table::try_from_parts(
            vec![
                String::from("Structure_feature_id"),
                String::from("Protein_start_position"),
                String::from("Protein_end_position"),
                String::from("Pident"),
            ],
            ranges
                .iter()
                .enumerate()
                .map(|(i, (start, end))| {
                    Row::new(vec![
                        format!("F{i}").into(),
                        start.to_string().into(),
                        end.to_string().into(),
                        "100".into(),
                    ])
                })
                .collect(),
        )
        .unwrap();

        Records::try_from(table).unwrap()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let interfaces = interfaces(&[(100, 110)]);
        let index = Index::new(interfaces.records());

        assert!(index.find(99).is_empty());
        assert_eq!(index.find(100), vec![0]);
        assert_eq!(index.find(110), vec![0]);
        assert!(index.find(111).is_empty());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let interfaces = interfaces(&[(9, 10)]);
        let index = Index::new(interfaces.records());

        assert_eq!(index.find(9), vec![0]);
        assert_eq!(index.find(10), vec![0]);
        assert!(index.find(100).is_empty());
    }

    #[test]
    fn test_single_residue_and_overlapping_ranges() {
        let interfaces = interfaces(&[(50, 50), (40, 60), (1, 5)]);
        let index = Index::new(interfaces.records());

        assert_eq!(index.len(), 3);
        assert_eq!(index.find(50), vec![0, 1]);
        assert_eq!(index.find(41), vec![1]);
        assert_eq!(index.find(5), vec![2]);
    }
}
