//! A line reader over a delimited store file.

use std::io::BufRead;
use std::io::{self};
use std::iter;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// The prefix of a meta-information line (e.g. `##fileformat=VCFv4.2`).
pub const META_PREFIX: &str = "##";

/// The prefix that may precede the column names of a header line (e.g.
/// `#Uploaded_variation`).
pub const HEADER_PREFIX: char = '#';

/// A store file reader.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a store file reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"Feature\tConsequence\nENST01\tmissense_variant\n";
    /// let reader = pdbmapper::store::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"Feature\r\nENST01";
    /// let mut reader = pdbmapper::store::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 9);
    /// assert_eq!(buffer, "Feature");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 6);
    /// assert_eq!(buffer, "ENST01");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(self.inner_mut(), buffer)
    }

    /// Reads the header line, skipping meta-information and blank lines.
    ///
    /// A leading `#` is stripped from the header. Returns [`None`] if the
    /// reader is exhausted before a header is found.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"## VEP output\n#Uploaded_variation\tFeature\nrs1\tENST01\n";
    /// let mut reader = pdbmapper::store::Reader::new(&data[..]);
    ///
    /// let header = reader.read_header()?;
    /// assert_eq!(header.as_deref(), Some("Uploaded_variation\tFeature"));
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_header(&mut self) -> io::Result<Option<String>> {
        let mut buffer = String::new();

        loop {
            if self.read_line_raw(&mut buffer)? == 0 {
                return Ok(None);
            }

            if buffer.is_empty() || buffer.starts_with(META_PREFIX) {
                continue;
            }

            let header = buffer.strip_prefix(HEADER_PREFIX).unwrap_or(&buffer);
            return Ok(Some(header.to_string()));
        }
    }

    /// Returns an iterator over the remaining lines that contain `key`.
    ///
    /// Matching is a plain substring test, so no line is parsed until it is
    /// known to be of interest.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"Gene\tFeature\nENSG01\tENST01\nENSG02\tENST02\nENSG01\tENST03\n";
    /// let mut reader = pdbmapper::store::Reader::new(&data[..]);
    /// reader.read_header()?;
    ///
    /// let lines = reader
    ///     .matching_lines("ENSG01")
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(lines, vec!["ENSG01\tENST01", "ENSG01\tENST03"]);
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn matching_lines<'a>(
        &'a mut self,
        key: &'a str,
    ) -> impl Iterator<Item = io::Result<String>> + 'a {
        let mut buffer = String::new();

        iter::from_fn(move || loop {
            match self.read_line_raw(&mut buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    if buffer.contains(key) {
                        return Some(Ok(buffer.clone()));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        })
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Reads a line from a buffered reader, dropping the line terminator.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}
