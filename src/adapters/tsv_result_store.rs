//! Tab-separated result store, one file per instrument and indicator family.
//!
//! Lines are `period date a b`, grouped by ascending period then date, with
//! `a b` = `max min` for extrema and `averageTrueRange trueRange` for
//! volatility. Floats carry six decimals.

use std::path::PathBuf;

use crate::adapters::tsv;
use crate::domain::daily::{format_date, parse_date};
use crate::domain::error::TastError;
use crate::domain::fanout::PeriodResultSet;
use crate::domain::indicator::{IndicatorFamily, IndicatorPoint, IndicatorValue, PeriodRange};
use crate::ports::result_store_port::ResultStore;

const RESULT_FIELDS: usize = 4;

pub struct TsvResultStore {
    data_dir: PathBuf,
    family: IndicatorFamily,
    range: PeriodRange,
}

impl TsvResultStore {
    pub fn new(data_dir: PathBuf, family: IndicatorFamily) -> Self {
        Self {
            data_dir,
            family,
            range: PeriodRange::SUPPORTED,
        }
    }

    pub fn family(&self) -> IndicatorFamily {
        self.family
    }

    pub fn result_path(&self, code: &str) -> PathBuf {
        self.data_dir.join(code).join(self.family.file_name())
    }

    /// The two value columns in file order.
    fn columns(&self, value: &IndicatorValue) -> Option<(f64, f64)> {
        match (self.family, value) {
            (IndicatorFamily::Extrema, IndicatorValue::Extrema { min, max }) => Some((*max, *min)),
            (
                IndicatorFamily::Volatility,
                IndicatorValue::Volatility {
                    true_range,
                    average_true_range,
                },
            ) => Some((*average_true_range, *true_range)),
            _ => None,
        }
    }

    fn value_from_columns(&self, a: f64, b: f64) -> IndicatorValue {
        match self.family {
            IndicatorFamily::Extrema => IndicatorValue::Extrema { min: b, max: a },
            IndicatorFamily::Volatility => IndicatorValue::Volatility {
                true_range: b,
                average_true_range: a,
            },
        }
    }
}

impl ResultStore for TsvResultStore {
    fn exists(&self, code: &str) -> bool {
        self.result_path(code).exists()
    }

    fn save(&self, code: &str, results: &PeriodResultSet) -> Result<(), TastError> {
        results.ensure_complete(self.range)?;

        let path = self.result_path(code);
        let source = path.display().to_string();

        tsv::write_atomically(&path, |wtr| {
            let mut line = 0;
            for period in self.range.iter() {
                let points = results.get(period).unwrap_or_default();
                for point in points {
                    line += 1;
                    let (a, b) = self.columns(&point.value).ok_or_else(|| {
                        TastError::format(
                            &source,
                            line,
                            format!("{} value in {} result set", kind_of(&point.value), self.family),
                        )
                    })?;
                    wtr.write_record([
                        period.to_string(),
                        format_date(point.date),
                        format!("{a:.6}"),
                        format!("{b:.6}"),
                    ])
                    .map_err(|e| tsv::csv_error(&source, line, e))?;
                }
            }
            Ok(())
        })?;

        tracing::debug!(code, family = %self.family, path = %path.display(), "result set saved");
        Ok(())
    }

    fn load(&self, code: &str) -> Result<PeriodResultSet, TastError> {
        let path = self.result_path(code);
        let source = path.display().to_string();
        let mut set = PeriodResultSet::new(code);

        for (line, row) in tsv::read_records(&path)? {
            tsv::expect_fields(&source, line, &row, RESULT_FIELDS)?;

            let period: usize = tsv::parse_field(&source, line, "period", &row[0])?;
            if !self.range.contains(period) {
                return Err(TastError::format(
                    &source,
                    line,
                    format!("period {period} outside {}..={}", self.range.min, self.range.max),
                ));
            }
            let date = parse_date(&row[1]).ok_or_else(|| {
                TastError::format(&source, line, format!("invalid date {:?}", &row[1]))
            })?;
            let a = tsv::parse_finite(&source, line, "value", &row[2])?;
            let b = tsv::parse_finite(&source, line, "value", &row[3])?;

            set.series.entry(period).or_default().push(IndicatorPoint {
                code: code.to_string(),
                period,
                date,
                value: self.value_from_columns(a, b),
            });
        }

        Ok(set)
    }
}

fn kind_of(value: &IndicatorValue) -> &'static str {
    match value {
        IndicatorValue::Extrema { .. } => "extrema",
        IndicatorValue::Volatility { .. } => "volatility",
    }
}
