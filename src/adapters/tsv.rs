//! Shared tab-separated file plumbing for the file adapters.
//!
//! Every data file is headerless, tab-delimited and unquoted. Writes go to a
//! temporary file in the target directory and are renamed into place, so a
//! failed write never leaves a truncated file behind.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tempfile::NamedTempFile;

use crate::domain::error::TastError;

pub fn reader<R: Read>(inner: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(inner)
}

pub fn writer<W: Write>(inner: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(inner)
}

pub fn csv_error(source: &str, line: usize, err: csv::Error) -> TastError {
    if err.is_io_error() {
        TastError::Io(err.into())
    } else {
        TastError::format(source, line, err.to_string())
    }
}

/// Open `path` and return `(line, record)` pairs, 1-based.
///
/// A missing file surfaces as `io::ErrorKind::NotFound` so callers can map it.
pub fn read_records(path: &Path) -> Result<Vec<(usize, StringRecord)>, TastError> {
    let source = path.display().to_string();
    let file = File::open(path)?;
    let mut rdr = reader(file);
    let mut records = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error(&source, i + 1, e))?;
        let line = record
            .position()
            .map_or(i + 1, |pos| pos.line() as usize);
        records.push((line, record));
    }

    Ok(records)
}

pub fn expect_fields(
    source: &str,
    line: usize,
    record: &StringRecord,
    expected: usize,
) -> Result<(), TastError> {
    if record.len() != expected {
        return Err(TastError::format(
            source,
            line,
            format!("expected {expected} fields, found {}", record.len()),
        ));
    }
    Ok(())
}

pub fn parse_field<T>(source: &str, line: usize, name: &str, value: &str) -> Result<T, TastError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| TastError::format(source, line, format!("invalid {name} {value:?}: {e}")))
}

/// Parse a price-like field, rejecting `NaN` and infinities.
pub fn parse_finite(source: &str, line: usize, name: &str, value: &str) -> Result<f64, TastError> {
    let parsed: f64 = parse_field(source, line, name, value)?;
    if !parsed.is_finite() {
        return Err(TastError::format(source, line, format!("non-finite {name} {value:?}")));
    }
    Ok(parsed)
}

/// Write `path` via a sibling temporary file, renamed into place only after
/// `fill` and the flush succeed.
pub fn write_atomically<F>(path: &Path, fill: F) -> Result<(), TastError>
where
    F: FnOnce(&mut csv::Writer<&mut NamedTempFile>) -> Result<(), TastError>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut wtr = writer(&mut tmp);
        fill(&mut wtr)?;
        wtr.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| TastError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_keeps_empty_trailing_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("rows.txt");

        write_atomically(&path, |wtr| {
            wtr.write_record(["a", "1.000000", ""])
                .map_err(|e| csv_error("rows", 1, e))?;
            wtr.write_record(["b", "2.500000", "a"])
                .map_err(|e| csv_error("rows", 2, e))?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a\t1.000000\t\nb\t2.500000\ta\n");

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 1);
        assert_eq!(records[0].1.len(), 3);
        assert_eq!(&records[0].1[2], "");
        assert_eq!(records[1].0, 2);
    }

    #[test]
    fn failed_fill_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rows.txt");

        let result = write_atomically(&path, |wtr| {
            wtr.write_record(["partial"]).map_err(|e| csv_error("rows", 1, e))?;
            Err(TastError::format("rows", 2, "simulated failure"))
        });

        assert!(result.is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        match read_records(&dir.path().join("absent.txt")) {
            Err(TastError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn parse_finite_rejects_nan_and_infinity() {
        assert_eq!(parse_finite("x", 1, "high", "10.5").unwrap(), 10.5);
        for value in ["NaN", "nan", "inf", "-inf", "infinity"] {
            match parse_finite("x", 7, "high", value) {
                Err(TastError::Format { line, reason, .. }) => {
                    assert_eq!(line, 7);
                    assert!(reason.contains("non-finite high"));
                }
                other => panic!("expected format error for {value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn expect_fields_counts() {
        let record = StringRecord::from(vec!["1", "2"]);
        assert!(expect_fields("x", 4, &record, 2).is_ok());
        assert!(matches!(
            expect_fields("x", 4, &record, 3),
            Err(TastError::Format { line: 4, .. })
        ));
    }
}
