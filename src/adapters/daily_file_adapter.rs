//! Canonical daily history files, one per instrument.
//!
//! Layout: `<data_dir>/<CODE>/Daily.txt`, one line per trading day,
//! `date open close high low volume previousDate`, ascending by date.

use std::path::{Path, PathBuf};

use crate::adapters::tsv;
use crate::domain::daily::{DailyRecord, format_date, parse_date};
use crate::domain::error::TastError;
use crate::domain::normalize::RawDailyRow;
use crate::ports::history_port::HistoryPort;

pub const DAILY_FILE_NAME: &str = "Daily.txt";

const DAILY_FIELDS: usize = 7;
const RAW_FIELDS: usize = 6;

pub struct DailyFileAdapter {
    data_dir: PathBuf,
}

impl DailyFileAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn history_path(&self, code: &str) -> PathBuf {
        self.data_dir.join(code).join(DAILY_FILE_NAME)
    }

    pub fn has_history(&self, code: &str) -> bool {
        self.history_path(code).exists()
    }

    pub fn write_history(&self, code: &str, records: &[DailyRecord]) -> Result<(), TastError> {
        let path = self.history_path(code);
        let source = path.display().to_string();

        tsv::write_atomically(&path, |wtr| {
            for (i, r) in records.iter().enumerate() {
                wtr.write_record([
                    format_date(r.date),
                    format!("{:.6}", r.open),
                    format!("{:.6}", r.close),
                    format!("{:.6}", r.high),
                    format!("{:.6}", r.low),
                    r.volume.to_string(),
                    r.previous_date.map(format_date).unwrap_or_default(),
                ])
                .map_err(|e| tsv::csv_error(&source, i + 1, e))?;
            }
            Ok(())
        })?;

        tracing::debug!(code, days = records.len(), path = %path.display(), "daily history written");
        Ok(())
    }
}

impl HistoryPort for DailyFileAdapter {
    fn daily_history(&self, code: &str) -> Result<Vec<DailyRecord>, TastError> {
        let path = self.history_path(code);
        let source = path.display().to_string();

        let rows = match tsv::read_records(&path) {
            Ok(rows) => rows,
            Err(TastError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TastError::NoData { code: code.into() });
            }
            Err(e) => return Err(e),
        };

        let mut records: Vec<(usize, DailyRecord)> = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            tsv::expect_fields(&source, line, &row, DAILY_FIELDS)?;

            let date = parse_date(&row[0]).ok_or_else(|| {
                TastError::format(&source, line, format!("invalid date {:?}", &row[0]))
            })?;
            let previous_date = match &row[6] {
                "" => None,
                value => Some(parse_date(value).ok_or_else(|| {
                    TastError::format(&source, line, format!("invalid previous date {value:?}"))
                })?),
            };

            records.push((line, DailyRecord {
                code: code.to_uppercase(),
                date,
                previous_date,
                open: tsv::parse_finite(&source, line, "open", &row[1])?,
                close: tsv::parse_finite(&source, line, "close", &row[2])?,
                high: tsv::parse_finite(&source, line, "high", &row[3])?,
                low: tsv::parse_finite(&source, line, "low", &row[4])?,
                volume: tsv::parse_field(&source, line, "volume", &row[5])?,
            }));
        }

        records.sort_by_key(|(_, r)| r.date);
        check_linkage(&source, &records)?;
        Ok(records.into_iter().map(|(_, r)| r).collect())
    }
}

/// Dates strictly ascending, each `previous_date` naming the record before it.
fn check_linkage(source: &str, records: &[(usize, DailyRecord)]) -> Result<(), TastError> {
    if let Some((line, _)) = records.first().filter(|(_, r)| r.previous_date.is_some()) {
        return Err(TastError::format(source, *line, "earliest record has a previous date"));
    }
    for pair in records.windows(2) {
        let (_, prev) = &pair[0];
        let (line, record) = &pair[1];
        if record.date == prev.date {
            return Err(TastError::format(
                source,
                *line,
                format!("duplicate date {}", format_date(record.date)),
            ));
        }
        if record.previous_date != Some(prev.date) {
            return Err(TastError::format(
                source,
                *line,
                format!("previous date does not match {}", format_date(prev.date)),
            ));
        }
    }
    Ok(())
}

/// Read a scraped export: `date open high low close volume`, newest first.
pub fn read_raw_export(path: &Path) -> Result<Vec<RawDailyRow>, TastError> {
    let source = path.display().to_string();
    tsv::read_records(path)?
        .into_iter()
        .map(|(line, row)| -> Result<RawDailyRow, TastError> {
            tsv::expect_fields(&source, line, &row, RAW_FIELDS)?;
            Ok(RawDailyRow {
                date: row[0].to_string(),
                open: row[1].to_string(),
                high: row[2].to_string(),
                low: row[3].to_string(),
                close: row[4].to_string(),
                volume: row[5].to_string(),
            })
        })
        .collect()
}
