//! History normalization: raw scraped rows to a canonical ascending sequence.
//!
//! The scraping collaborator hands over rows newest first. Each row's
//! `previous_date` is linked from the row that follows it in that received
//! order, and only then is the sequence sorted ascending by date.

use crate::domain::daily::{DailyRecord, parse_date};
use crate::domain::error::TastError;
use chrono::NaiveDate;

/// Layout of dates in scraped exports.
pub const SCRAPED_DATE_FORMAT: &str = "%m/%d/%Y";

/// One undecoded row as delivered by the raw-history collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDailyRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

fn decode_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    parse_date(value).or_else(|| NaiveDate::parse_from_str(value, SCRAPED_DATE_FORMAT).ok())
}

fn decode_price(field: &str, value: &str, line: usize, source: &str) -> Result<f64, TastError> {
    let price = value
        .trim()
        .parse::<f64>()
        .map_err(|e| TastError::format(source, line, format!("invalid {field} value {value:?}: {e}")))?;
    if !price.is_finite() {
        return Err(TastError::format(source, line, format!("non-finite {field} value {value:?}")));
    }
    Ok(price)
}

/// Decode a single raw row. `line` is 1-based and only used for error context.
pub fn decode_row(
    code: &str,
    row: &RawDailyRow,
    line: usize,
    source: &str,
) -> Result<DailyRecord, TastError> {
    let date = decode_date(&row.date).ok_or_else(|| {
        TastError::format(source, line, format!("invalid date {:?}", row.date))
    })?;
    let open = decode_price("open", &row.open, line, source)?;
    let high = decode_price("high", &row.high, line, source)?;
    let low = decode_price("low", &row.low, line, source)?;
    let close = decode_price("close", &row.close, line, source)?;
    let volume: i64 = row
        .volume
        .trim()
        .replace(',', "")
        .parse()
        .map_err(|e| {
            TastError::format(source, line, format!("invalid volume value {:?}: {e}", row.volume))
        })?;
    if volume < 0 {
        return Err(TastError::format(source, line, "negative volume"));
    }

    Ok(DailyRecord {
        code: code.to_uppercase(),
        date,
        previous_date: None,
        open,
        close,
        high,
        low,
        volume,
    })
}

/// Link and reorder records received newest first.
pub fn link_and_sort(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    let len = records.len();
    for i in 0..len {
        records[i].previous_date = if i + 1 == len {
            None
        } else {
            Some(records[i + 1].date)
        };
    }

    // sort_by_key is stable
    records.sort_by_key(|r| r.date);
    records
}

/// Decode raw rows (newest first) into the canonical ascending sequence.
pub fn normalize(code: &str, rows: &[RawDailyRow], source: &str) -> Result<Vec<DailyRecord>, TastError> {
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| decode_row(code, row, i + 1, source))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(link_and_sort(records))
}
