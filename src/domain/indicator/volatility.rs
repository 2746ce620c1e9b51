//! Volatility indicator: true range and its smoothed average.
//!
//! TR[i] = max(H - L, H - PC, PC - L) with PC = 0 on the first day.
//! ATR[0] = TR[0] / n, ATR[i] = ((n - 1) * ATR[i-1] + TR[i]) / n.
//! No warmup: every day yields a value, seeded independently per period.

use crate::domain::daily::DailyRecord;
use crate::domain::error::TastError;
use crate::domain::indicator::{IndicatorPoint, IndicatorValue};

pub fn calculate_volatility(
    history: &[DailyRecord],
    period: usize,
) -> Result<Vec<IndicatorPoint>, TastError> {
    if period == 0 {
        return Err(TastError::InvalidPeriod(period));
    }

    let n = period as f64;
    let mut points = Vec::with_capacity(history.len());
    let mut atr = 0.0;

    for (i, record) in history.iter().enumerate() {
        let prev_close = if i == 0 { 0.0 } else { history[i - 1].close };
        let tr = record.true_range(prev_close);

        atr = if i == 0 { tr / n } else { ((n - 1.0) * atr + tr) / n };

        points.push(IndicatorPoint {
            code: record.code.clone(),
            period,
            date: record.date,
            value: IndicatorValue::Volatility {
                true_range: tr,
                average_true_range: atr,
            },
        });
    }

    Ok(points)
}
