//! CSV ingestion into [`RawTable`].

use crate::table::RawTable;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors reading a raw tabular source. These are hard I/O or structural
/// failures; a readable file with unusable content is an
/// [`Absence`](crate::outcome::Absence), not an error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed csv in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Read a CSV file into a column-major table.
pub fn read_csv(path: &Path) -> Result<RawTable, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Open {
        path: path.display().to_string(),
        source: e,
    })?;
    read_csv_from(file, &path.display().to_string())
}

/// Read CSV from any reader; `origin` labels errors.
///
/// Headers are taken verbatim (no trimming: one known value-column convention
/// carries a leading space). Ragged records are tolerated; row padding
/// happens in [`RawTable::push_row`].
pub fn read_csv_from<R: Read>(reader: R, origin: &str) -> Result<RawTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| LoadError::Csv {
            path: origin.to_string(),
            source: e,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(headers);
    for record in rdr.records() {
        let record = record.map_err(|e| LoadError::Csv {
            path: origin.to_string(),
            source: e,
        })?;
        table.push_row(record.iter());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_rows() {
        let data = "Step,Value\n0,1.5\n1,2.5\n";
        let table = read_csv_from(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.headers(), &["Step", "Value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("Value").unwrap(), &["1.5", "2.5"]);
    }

    #[test]
    fn preserves_leading_space_in_headers() {
        let data = "Step, - episode_return\n0,1.0\n";
        let table = read_csv_from(data.as_bytes(), "inline").unwrap();
        assert_eq!(table.headers()[1], " - episode_return");
    }

    #[test]
    fn tolerates_ragged_rows() {
        let data = "a,b,c\n1,2\n4,5,6,7\n";
        let table = read_csv_from(data.as_bytes(), "inline").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("c").unwrap(), &["", "6"]);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = read_csv_from("".as_bytes(), "inline").unwrap();
        assert_eq!(table.column_count(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_csv(Path::new("/nonexistent/run.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Open { .. }));
    }
}
