//! Flat, delimited stores of interface and variant records.
//!
//! A store is either a single delimited file or a directory of files
//! organized per identifier (e.g. `intDB/ENSP00000263025.txt` or
//! `varDB/ENSG00000141510.vep.gz`). Loading the records for an identifier
//! selects the lines that mention it without parsing the rest of the file,
//! then parses only those lines under the file's header.
//!
//! Files ending in `.gz` are transparently decompressed.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use crate::Table;
use crate::table;
use crate::table::Cell;
use crate::table::Row;

pub mod reader;
pub mod split;

pub use reader::Reader;

/// The extension of gzip-compressed store files.
const GZIP_EXTENSION: &str = "gz";

/// The separator between an identifier and the extensions of a store file.
const EXTENSION_SEPARATOR: char = '.';

/// An error related to a [`Store`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// The selected lines could not be parsed as delimited records.
    Csv(PathBuf, csv::Error),

    /// A table error.
    Table(table::Error),

    /// A store file has no header line.
    MissingHeader(PathBuf),

    /// No records exist for the identifier.
    NotFound {
        /// The identifier that was looked up.
        id: String,

        /// The path of the store.
        path: PathBuf,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Csv(path, err) => write!(f, "parse error in {}: {err}", path.display()),
            Error::Table(err) => write!(f, "table error: {err}"),
            Error::MissingHeader(path) => write!(f, "missing header: {}", path.display()),
            Error::NotFound { id, path } => {
                write!(f, "no records found for {id} in {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The field delimiter of a store file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Delimiter {
    /// Tab-separated fields.
    Tab,

    /// Comma-separated fields.
    Comma,
}

impl Delimiter {
    /// Detects the delimiter from a header line.
    ///
    /// Headers containing a tab are tab-delimited; all others are
    /// comma-delimited.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdbmapper::store::Delimiter;
    ///
    /// assert_eq!(Delimiter::detect("Feature\tConsequence"), Delimiter::Tab);
    /// assert_eq!(Delimiter::detect("Pident,Protein_position"), Delimiter::Comma);
    /// ```
    pub fn detect(header: &str) -> Self {
        match header.contains('\t') {
            true => Delimiter::Tab,
            false => Delimiter::Comma,
        }
    }

    /// Gets the delimiter as a byte.
    pub fn as_byte(&self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// A store of delimited records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Store {
    /// The path to the store file or directory.
    path: PathBuf,
}

impl Store {
    /// Creates a new store rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Gets the path of the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the files that may contain records for `id`.
    ///
    /// If the store is a single file, that file is returned. If the store is
    /// a directory, every file whose name up to the first `.` equals `id` is
    /// returned in lexicographic order.
    pub fn files(&self, id: &str) -> Result<Vec<PathBuf>> {
        if self.path.is_file() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = Vec::new();

        for entry in std::fs::read_dir(&self.path).map_err(Error::Io)? {
            let path = entry.map_err(Error::Io)?.path();

            let stem = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.split(EXTENSION_SEPARATOR).next());

            if path.is_file() && stem == Some(id) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Loads every record of the store that mentions `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Write as _;
    ///
    /// use pdbmapper::store::Store;
    ///
    /// let dir = tempdir::TempDir::new("store")?;
    /// let mut file = std::fs::File::create(dir.path().join("ENSG01.vep"))?;
    /// writeln!(file, "#Uploaded_variation\tGene\tFeature")?;
    /// writeln!(file, "rs1\tENSG01\tENST01")?;
    ///
    /// let table = Store::new(dir.path()).load("ENSG01")?;
    /// assert_eq!(table.header(), ["Uploaded_variation", "Gene", "Feature"]);
    /// assert_eq!(table.len(), 1);
    ///
    /// let err = Store::new(dir.path()).load("ENSG02").unwrap_err();
    /// assert!(err.to_string().starts_with("no records found for ENSG02"));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load(&self, id: &str) -> Result<Table> {
        let mut result: Option<Table> = None;

        for path in self.files(id)? {
            let reader = open(&path).map_err(Error::Io)?;
            let table = select(&path, Reader::new(reader), id)?;

            match result.as_mut() {
                Some(existing) => existing.append(table).map_err(Error::Table)?,
                None => result = Some(table),
            }
        }

        match result {
            Some(table) if !table.is_empty() => Ok(table),
            _ => Err(Error::NotFound {
                id: id.to_string(),
                path: self.path.clone(),
            }),
        }
    }
}

/// Opens a store file for buffered reading, decompressing `.gz` files.
pub fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(GZIP_EXTENSION) => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// Selects the lines of `reader` that mention `id` and parses them under the
/// reader's header.
///
/// `path` is only used to give context to errors.
pub fn select<T>(path: &Path, mut reader: Reader<T>, id: &str) -> Result<Table>
where
    T: BufRead,
{
    let header = reader
        .read_header()
        .map_err(Error::Io)?
        .ok_or_else(|| Error::MissingHeader(path.to_path_buf()))?;
    let delimiter = Delimiter::detect(&header);

    let mut buffer = header;
    buffer.push('\n');

    for line in reader.matching_lines(id) {
        buffer.push_str(&line.map_err(Error::Io)?);
        buffer.push('\n');
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(true)
        .flexible(false)
        .from_reader(buffer.as_bytes());

    let columns = csv_reader
        .headers()
        .map_err(|e| Error::Csv(path.to_path_buf(), e))?
        .iter()
        .map(String::from)
        .collect::<Vec<_>>();

    let mut table = Table::new(columns);

    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv(path.to_path_buf(), e))?;
        let row = Row::new(record.iter().map(Cell::parse).collect());
        table.push(row).map_err(Error::Table)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_select_comma_delimited_with_lists() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let data = b"Protein_accession,Structure_feature_id,Pident\n\
                     ENSP01,\"['1abc_A', '2xyz_B']\",90\n\
                     ENSP02,3def_C,80\n";
        let table = select(Path::new("test"), Reader::new(&data[..]), "ENSP01")?;

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.value(0), Some("ENSP01"));
        assert_eq!(row.get(1).map(Cell::len), Some(2));
        assert_eq!(row.value(2), Some("90"));

        Ok(())
    }

    #[test]
    fn test_select_with_ragged_line() {
        let data = b"a\tb\nENSP01\t1\t2\n";
        let err = select(Path::new("test"), Reader::new(&data[..]), "ENSP01").unwrap_err();
        assert!(err.to_string().starts_with("parse error in test:"));
    }

    #[test]
    fn test_select_without_header() {
        let data = b"";
        let err = select(Path::new("empty"), Reader::new(&data[..]), "ENSP01").unwrap_err();
        assert_eq!(err.to_string(), "missing header: empty");
    }

    #[test]
    fn test_load_from_single_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("store")?;
        let path = dir.path().join("interfaces.txt");
        std::fs::write(&path, "Protein_accession\tPident\nENSP01\t90\nENSP02\t80\nENSP01\t70\n")?;

        let table = Store::new(&path).load("ENSP01")?;
        assert_eq!(table.len(), 2);

        Ok(())
    }

    #[test]
    fn test_load_gzipped_and_plain_files() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("store")?;

        let mut encoder = GzEncoder::new(
            File::create(dir.path().join("ENSG01.vep.gz"))?,
            Compression::default(),
        );
        encoder.write_all(b"## meta\n#Gene\tFeature\nENSG01\tENST01\n")?;
        encoder.finish()?;

        std::fs::write(
            dir.path().join("ENSG01.vep"),
            "#Gene\tFeature\nENSG01\tENST02\n",
        )?;
        std::fs::write(
            dir.path().join("ENSG011.vep"),
            "#Gene\tFeature\nENSG011\tENST03\n",
        )?;

        let store = Store::new(dir.path());
        assert_eq!(store.files("ENSG01")?.len(), 2);

        let table = store.load("ENSG01")?;
        let features = table
            .rows()
            .iter()
            .filter_map(|row| row.value(1))
            .collect::<Vec<_>>();
        assert_eq!(features, vec!["ENST02", "ENST01"]);

        Ok(())
    }

    #[test]
    fn test_load_with_mismatched_headers() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("store")?;
        std::fs::write(dir.path().join("ENSG01.a"), "Gene\nENSG01\n")?;
        std::fs::write(dir.path().join("ENSG01.b"), "Gene\tFeature\nENSG01\tENST01\n")?;

        let err = Store::new(dir.path()).load("ENSG01").unwrap_err();
        assert_eq!(
            err.to_string(),
            "table error: mismatched headers: [Gene] and [Gene, Feature]"
        );

        Ok(())
    }
}
