//! Rolling extrema indicator.
//!
//! For each day, min(low) and max(high) over the trailing window of
//! min(i+1, period) records ending at that day. Monotonic deques keep the
//! update O(1) amortized while matching the brute-force definition exactly.

use std::collections::VecDeque;

use crate::domain::daily::DailyRecord;
use crate::domain::error::TastError;
use crate::domain::indicator::{IndicatorPoint, IndicatorValue};

/// Min/max tracker over a trailing window of fixed capacity.
struct RollingExtrema {
    highs: VecDeque<(usize, f64)>,
    lows: VecDeque<(usize, f64)>,
    cap: usize,
    idx: usize,
}

impl RollingExtrema {
    fn new(cap: usize) -> Self {
        Self {
            highs: VecDeque::with_capacity(cap),
            lows: VecDeque::with_capacity(cap),
            cap,
            idx: 0,
        }
    }

    fn push(&mut self, high: f64, low: f64) {
        while self.highs.front().is_some_and(|&(i, _)| i + self.cap <= self.idx) {
            self.highs.pop_front();
        }
        while self.lows.front().is_some_and(|&(i, _)| i + self.cap <= self.idx) {
            self.lows.pop_front();
        }
        while self.highs.back().is_some_and(|&(_, h)| h <= high) {
            self.highs.pop_back();
        }
        while self.lows.back().is_some_and(|&(_, l)| l >= low) {
            self.lows.pop_back();
        }
        self.highs.push_back((self.idx, high));
        self.lows.push_back((self.idx, low));
        self.idx += 1;
    }

    fn max(&self) -> f64 {
        self.highs.front().map_or(f64::NAN, |&(_, h)| h)
    }

    fn min(&self) -> f64 {
        self.lows.front().map_or(f64::NAN, |&(_, l)| l)
    }
}

pub fn calculate_extrema(
    history: &[DailyRecord],
    period: usize,
) -> Result<Vec<IndicatorPoint>, TastError> {
    if period == 0 {
        return Err(TastError::InvalidPeriod(period));
    }

    let mut window = RollingExtrema::new(period);
    let mut points = Vec::with_capacity(history.len());

    for record in history {
        window.push(record.high, record.low);
        points.push(IndicatorPoint {
            code: record.code.clone(),
            period,
            date: record.date,
            value: IndicatorValue::Extrema {
                min: window.min(),
                max: window.max(),
            },
        });
    }

    Ok(points)
}
