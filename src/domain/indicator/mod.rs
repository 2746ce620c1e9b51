//! Period-parameterized indicator families.
//!
//! This module provides types for representing indicator output:
//! - `IndicatorPoint`: one value of one family for one instrument, period and day
//! - `IndicatorValue`: the family-specific payload
//! - `IndicatorFamily`: the closed set of families, with dispatch and file naming
//! - `PeriodRange`: the inclusive range of period lengths computed per instrument

pub mod extrema;
pub mod volatility;

use crate::domain::daily::DailyRecord;
use crate::domain::error::TastError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub code: String,
    pub period: usize,
    pub date: NaiveDate,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Extrema { min: f64, max: f64 },
    Volatility { true_range: f64, average_true_range: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorFamily {
    Extrema,
    Volatility,
}

impl IndicatorFamily {
    pub const ALL: [IndicatorFamily; 2] = [IndicatorFamily::Volatility, IndicatorFamily::Extrema];

    /// Per-instrument result file name.
    pub fn file_name(self) -> &'static str {
        match self {
            // deployed data directories use this spelling
            IndicatorFamily::Extrema => "PeroidExterma.txt",
            IndicatorFamily::Volatility => "Turtle.txt",
        }
    }

    pub fn compute(
        self,
        history: &[DailyRecord],
        period: usize,
    ) -> Result<Vec<IndicatorPoint>, TastError> {
        match self {
            IndicatorFamily::Extrema => extrema::calculate_extrema(history, period),
            IndicatorFamily::Volatility => volatility::calculate_volatility(history, period),
        }
    }
}

impl fmt::Display for IndicatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorFamily::Extrema => write!(f, "extrema"),
            IndicatorFamily::Volatility => write!(f, "volatility"),
        }
    }
}

impl FromStr for IndicatorFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extrema" => Ok(IndicatorFamily::Extrema),
            "volatility" | "turtle" => Ok(IndicatorFamily::Volatility),
            other => Err(format!("unknown indicator family: {other}")),
        }
    }
}

/// Inclusive range of period lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    pub min: usize,
    pub max: usize,
}

impl PeriodRange {
    pub const SUPPORTED: PeriodRange = PeriodRange { min: 2, max: 50 };

    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            self.max - self.min + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, period: usize) -> bool {
        (self.min..=self.max).contains(&period)
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.min..=self.max
    }

    /// Slot index of `period` in a pre-sized per-period array.
    pub fn index_of(&self, period: usize) -> Option<usize> {
        self.contains(period).then(|| period - self.min)
    }
}
