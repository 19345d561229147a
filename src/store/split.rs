//! Splitting a combined delimited file into a per-identifier store.
//!
//! Each data line is assigned to the first identifier matching a pattern
//! (e.g. `ENSG\d+` for variant files or `ENSP\d+` for interface files) and
//! written to `<out>/<identifier>.<extension>` beneath a copy of the header.

use std::collections::HashMap;
use std::collections::HashSet;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufWriter;
use std::io::Write as _;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use regex::Regex;

use crate::store::Reader;

/// The number of buffered lines after which groups are flushed to disk.
const FLUSH_THRESHOLD: usize = 100_000;

/// An error related to a [`Splitter`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// The input has no header line.
    MissingHeader,

    /// The output directory already holds files and overwriting was not
    /// requested.
    NotEmpty(PathBuf),

    /// The identifier pattern is not a valid regular expression.
    Pattern(regex::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::MissingHeader => write!(f, "missing header"),
            Error::NotEmpty(path) => write!(
                f,
                "output directory is not empty: {} (use force to overwrite)",
                path.display()
            ),
            Error::Pattern(err) => write!(f, "invalid identifier pattern: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Counts describing a completed split.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// The number of distinct identifiers written.
    pub ids: usize,

    /// The number of data lines written.
    pub lines: usize,

    /// The number of data lines that matched no identifier.
    pub skipped: usize,
}

/// Splits delimited files by identifier.
#[derive(Clone, Debug)]
pub struct Splitter {
    /// The pattern identifying the key of each line.
    pattern: Regex,

    /// The extension given to the files written.
    extension: String,

    /// Whether existing output may be overwritten.
    force: bool,
}

impl Splitter {
    /// Attempts to create a new [`Splitter`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::store::split::Splitter;
    ///
    /// let splitter = Splitter::try_new(r"ENSG\d+", "vep")?;
    /// assert!(Splitter::try_new(r"ENSG(\d+", "vep").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(pattern: &str, extension: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(Error::Pattern)?;

        Ok(Self {
            pattern,
            extension: extension.into(),
            force: false,
        })
    }

    /// Sets whether an output directory that already holds files may be
    /// written to.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Gets the output path for an identifier.
    fn path_for(&self, out_dir: &Path, id: &str) -> PathBuf {
        out_dir.join(format!("{id}.{}", self.extension))
    }

    /// Splits the records of `reader` into `out_dir`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::store::split::Splitter;
    /// use pdbmapper::store::Reader;
    /// use pdbmapper::store::Store;
    ///
    /// let data = b"#Gene\tFeature\nENSG01\tENST01\nENSG02\tENST02\nENSG01\tENST03\n";
    /// let dir = tempdir::TempDir::new("split")?;
    ///
    /// let summary = Splitter::try_new(r"ENSG\d+", "vep")?.split(Reader::new(&data[..]), dir.path())?;
    /// assert_eq!(summary.ids, 2);
    /// assert_eq!(summary.lines, 3);
    ///
    /// let table = Store::new(dir.path()).load("ENSG01")?;
    /// assert_eq!(table.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn split<T>(&self, mut reader: Reader<T>, out_dir: &Path) -> Result<Summary>
    where
        T: BufRead,
    {
        std::fs::create_dir_all(out_dir).map_err(Error::Io)?;

        let occupied = std::fs::read_dir(out_dir)
            .map_err(Error::Io)?
            .next()
            .is_some();
        if occupied && !self.force {
            return Err(Error::NotEmpty(out_dir.to_path_buf()));
        }

        let header = reader
            .read_header()
            .map_err(Error::Io)?
            .ok_or(Error::MissingHeader)?;

        let mut summary = Summary::default();
        let mut written = HashSet::new();
        let mut groups = HashMap::<String, Vec<String>>::new();
        let mut buffered = 0usize;
        let mut buffer = String::new();

        while reader.read_line_raw(&mut buffer).map_err(Error::Io)? > 0 {
            if buffer.is_empty() {
                continue;
            }

            let id = match self.pattern.find(&buffer) {
                Some(m) => m.as_str().to_string(),
                None => {
                    summary.skipped += 1;
                    continue;
                }
            };

            groups.entry(id).or_default().push(buffer.clone());
            buffered += 1;

            if buffered >= FLUSH_THRESHOLD {
                summary.lines += self.flush(&mut groups, &mut written, &header, out_dir)?;
                buffered = 0;
            }
        }

        summary.lines += self.flush(&mut groups, &mut written, &header, out_dir)?;
        summary.ids = written.len();

        Ok(summary)
    }

    /// Writes out and clears the buffered groups, returning the number of
    /// lines written.
    ///
    /// The first time an identifier is flushed its file is truncated and the
    /// header is written; later flushes append.
    fn flush(
        &self,
        groups: &mut HashMap<String, Vec<String>>,
        written: &mut HashSet<String>,
        header: &str,
        out_dir: &Path,
    ) -> Result<usize> {
        let mut count = 0;

        for (id, lines) in groups.drain() {
            let path = self.path_for(out_dir, &id);

            let file = match written.contains(&id) {
                true => OpenOptions::new().append(true).open(&path),
                false => File::create(&path),
            }
            .map_err(Error::Io)?;
            let mut writer = BufWriter::new(file);

            if written.insert(id) {
                writeln!(writer, "{header}").map_err(Error::Io)?;
            }

            for line in &lines {
                writeln!(writer, "{line}").map_err(Error::Io)?;
            }

            writer.flush().map_err(Error::Io)?;
            count += lines.len();
        }

        Ok(count)
    }
}
