//! A single cell within a [`Table`](crate::Table).
//!
//! Delimited stores are text, but some columns hold more than one value in a
//! single field. Those fields are written as a bracketed list (`[a, b]` or
//! `['a', 'b']`) and are read back as [`Cell::List`]. Everything else is a
//! [`Cell::Value`].

use nonempty::NonEmpty;

/// The character opening a packed list.
const LIST_OPEN: char = '[';

/// The character closing a packed list.
const LIST_CLOSE: char = ']';

/// The delimiter between the elements of a packed list.
const LIST_DELIMITER: char = ',';

/// A cell within a table row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    /// A single value.
    Value(String),

    /// An ordered, non-empty list of values packed into one cell.
    List(NonEmpty<String>),
}

impl Cell {
    /// Parses a cell from the raw text of a field.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::table::Cell;
    ///
    /// assert_eq!(Cell::parse("ENSP00000263025"), Cell::from("ENSP00000263025"));
    ///
    /// let cell = Cell::parse("['1abc_A', '2xyz_B']");
    /// assert!(cell.is_list());
    /// assert_eq!(cell.values().collect::<Vec<_>>(), vec!["1abc_A", "2xyz_B"]);
    /// ```
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        let inner = match trimmed
            .strip_prefix(LIST_OPEN)
            .and_then(|rest| rest.strip_suffix(LIST_CLOSE))
        {
            Some(inner) => inner,
            None => return Cell::Value(s.to_string()),
        };

        let values = inner
            .split(LIST_DELIMITER)
            .map(unquote)
            .filter(|value| !value.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        match NonEmpty::from_vec(values) {
            Some(values) => Cell::List(values),
            None => Cell::Value(String::new()),
        }
    }

    /// Returns whether the cell holds a packed list.
    pub fn is_list(&self) -> bool {
        matches!(self, Cell::List(_))
    }

    /// Returns the inner value if the cell holds a single value.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::table::Cell;
    ///
    /// assert_eq!(Cell::from("105").as_value(), Some("105"));
    /// assert_eq!(Cell::parse("[1, 2]").as_value(), None);
    /// ```
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Cell::Value(value) => Some(value.as_str()),
            Cell::List(_) => None,
        }
    }

    /// Returns the number of values held by the cell.
    ///
    /// A single value always has a length of one.
    pub fn len(&self) -> usize {
        match self {
            Cell::Value(_) => 1,
            Cell::List(values) => values.len(),
        }
    }

    /// Always returns `false`: a cell holds at least one value.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the values held by the cell.
    pub fn values(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Cell::Value(value) => Box::new(std::iter::once(value.as_str())),
            Cell::List(values) => Box::new(values.iter().map(String::as_str)),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Value(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Value(value)
    }
}

impl From<NonEmpty<String>> for Cell {
    fn from(values: NonEmpty<String>) -> Self {
        Cell::List(values)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Value(value) => write!(f, "{value}"),
            Cell::List(values) => {
                let joined = values.iter().map(String::as_str).collect::<Vec<_>>();
                write!(f, "{LIST_OPEN}{}{LIST_CLOSE}", joined.join(", "))
            }
        }
    }
}

/// Strips surrounding whitespace and a matching pair of quotes.
fn unquote(s: &str) -> &str {
    let s = s.trim();

    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        let cell = Cell::parse("missense_variant");
        assert_eq!(cell, Cell::Value(String::from("missense_variant")));
        assert_eq!(cell.len(), 1);
        assert!(!cell.is_list());
    }

    #[test]
    fn test_parse_list() {
        let cell = Cell::parse("[F1, 'F2', \"F3\"]");
        assert_eq!(cell.len(), 3);
        assert_eq!(cell.values().collect::<Vec<_>>(), vec!["F1", "F2", "F3"]);
        assert_eq!(cell.to_string(), "[F1, F2, F3]");
    }

    #[test]
    fn test_parse_empty_list() {
        assert_eq!(Cell::parse("[]"), Cell::Value(String::new()));
        assert_eq!(Cell::parse("[ , ]"), Cell::Value(String::new()));
    }

    #[test]
    fn test_unbalanced_brackets_are_values() {
        assert_eq!(Cell::parse("[1, 2"), Cell::from("[1, 2"));
        assert_eq!(Cell::parse("1]"), Cell::from("1]"));
    }
}
