//! File-backed lookup table mapping (destination port, protocol) to a tag.
//!
//! The table is built once at startup from a CSV file and never mutated
//! afterwards. The first row is a header and is consumed without being
//! validated; every data row must be exactly `dstport,protocol,tag`.

use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
};

use snafu::{ResultExt, Snafu, ensure};

use crate::flow::FlowKey;

#[derive(Debug, Snafu)]
pub enum LoadError {
    #[snafu(display("unable to open lookup table {}: {source}", path.display()))]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("unable to read lookup table {}: {source}", path.display()))]
    Read { path: PathBuf, source: csv::Error },

    #[snafu(display("lookup table {}, row {row}: expected 3 columns, found {found}", path.display()))]
    Columns {
        path: PathBuf,
        row: usize,
        found: usize,
    },

    #[snafu(display("lookup table {}, row {row}: port {value:?} is not a valid port number", path.display()))]
    Port {
        path: PathBuf,
        row: usize,
        value: String,
        source: std::num::ParseIntError,
    },
}

impl LoadError {
    /// Exit code reported to the shell for this failure.
    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            Self::Open { .. } => exitcode::IOERR,
            Self::Read { source, .. } => match source.kind() {
                csv::ErrorKind::Io(_) => exitcode::IOERR,
                _ => exitcode::DATAERR,
            },
            Self::Columns { .. } | Self::Port { .. } => exitcode::DATAERR,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LookupTable {
    entries: HashMap<FlowKey, String>,
}

impl LookupTable {
    pub fn new(entries: HashMap<FlowKey, String>) -> Self {
        Self { entries }
    }

    /// Loads the table from `path`. The protocol column is lowercased into
    /// the key, so matching is case-insensitive by construction; the tag
    /// column is stored verbatim. Later duplicates of a key overwrite
    /// earlier ones.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).context(OpenSnafu { path })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut entries = HashMap::new();
        for (idx, row) in reader.records().enumerate() {
            let row = row.context(ReadSnafu { path })?;
            // 1-based data row number, not counting the header.
            let line = idx + 1;
            ensure!(
                row.len() == 3,
                ColumnsSnafu {
                    path,
                    row: line,
                    found: row.len()
                }
            );

            let port = row[0].parse::<u16>().context(PortSnafu {
                path,
                row: line,
                value: &row[0],
            })?;
            entries.insert(FlowKey::new(port, &row[1]), row[2].to_string());
        }

        Ok(Self::new(entries))
    }

    pub fn find(&self, key: &FlowKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
