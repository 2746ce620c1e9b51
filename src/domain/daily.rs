//! Daily price record for one instrument.

use chrono::NaiveDate;

/// Canonical on-disk date layout (`YYYYMMDD`).
pub const DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub code: String,
    pub date: NaiveDate,
    /// Prior trading day, `None` for the earliest record of the instrument.
    pub previous_date: Option<NaiveDate>,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
}

impl DailyRecord {
    /// max(high - low, high - prev_close, prev_close - low)
    ///
    /// Signed differences, not absolute values: with `prev_close = 0` the
    /// middle term is simply `high`.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = self.high - prev_close;
        let cl = prev_close - self.low;
        hl.max(hc).max(cl)
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
