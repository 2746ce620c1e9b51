//! Concurrent fan-out of one indicator across every period of a range.
//!
//! Each period owns one slot of a pre-sized array. The array is split into
//! disjoint chunks handed to a bounded set of scoped worker threads, so no
//! slot ever has more than one writer and no lock is taken. The first failing
//! period raises a shared cancellation flag; workers stop picking up new
//! periods once it is set.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::domain::daily::DailyRecord;
use crate::domain::error::TastError;
use crate::domain::indicator::{IndicatorPoint, PeriodRange};

/// Complete mapping from period to the ordered indicator series of one instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeriodResultSet {
    pub code: String,
    pub series: BTreeMap<usize, Vec<IndicatorPoint>>,
}

impl PeriodResultSet {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            series: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, period: usize, points: Vec<IndicatorPoint>) {
        self.series.insert(period, points);
    }

    pub fn get(&self, period: usize) -> Option<&[IndicatorPoint]> {
        self.series.get(&period).map(Vec::as_slice)
    }

    pub fn periods(&self) -> impl Iterator<Item = usize> + '_ {
        self.series.keys().copied()
    }

    pub fn missing_periods(&self, range: PeriodRange) -> Vec<usize> {
        range.iter().filter(|p| !self.series.contains_key(p)).collect()
    }

    /// Fails with `IncompleteResult` naming the first period of `range` that is absent.
    pub fn ensure_complete(&self, range: PeriodRange) -> Result<(), TastError> {
        match self.missing_periods(range).first() {
            Some(&period) => Err(TastError::IncompleteResult {
                code: self.code.clone(),
                period,
                reason: "period missing from result set".into(),
            }),
            None => Ok(()),
        }
    }
}

/// Worker count used when none is configured.
pub fn default_workers() -> usize {
    thread::available_parallelism().map_or(4, |n| n.get())
}

type Slot = Option<Result<Vec<IndicatorPoint>, TastError>>;

/// Run `indicator_fn` once per period of `range` on up to `workers` threads.
///
/// Returns only when every worker has joined. Any failed, cancelled or
/// panicked period turns the whole call into `IncompleteResult`.
pub fn compute_all<F>(
    code: &str,
    history: &[DailyRecord],
    range: PeriodRange,
    workers: usize,
    indicator_fn: F,
) -> Result<PeriodResultSet, TastError>
where
    F: Fn(&[DailyRecord], usize) -> Result<Vec<IndicatorPoint>, TastError> + Sync,
{
    let periods: Vec<usize> = range.iter().collect();
    if periods.is_empty() {
        return Ok(PeriodResultSet::new(code));
    }

    let workers = workers.clamp(1, periods.len());
    let chunk_len = periods.len().div_ceil(workers);
    let mut slots: Vec<Slot> = (0..periods.len()).map(|_| None).collect();
    let cancelled = AtomicBool::new(false);

    tracing::debug!(code, periods = periods.len(), workers, "fanning out periods");

    thread::scope(|s| {
        let handles: Vec<_> = slots
            .chunks_mut(chunk_len)
            .zip(periods.chunks(chunk_len))
            .map(|(slot_chunk, period_chunk)| {
                let cancelled = &cancelled;
                let indicator_fn = &indicator_fn;
                let first = period_chunk[0];
                let handle = s.spawn(move || {
                    for (slot, &period) in slot_chunk.iter_mut().zip(period_chunk) {
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        let result = indicator_fn(history, period);
                        if result.is_err() {
                            cancelled.store(true, Ordering::Release);
                        }
                        *slot = Some(result);
                    }
                });
                (first, handle)
            })
            .collect();

        for (first, handle) in handles {
            if handle.join().is_err() {
                cancelled.store(true, Ordering::Release);
                tracing::error!(code, first_period = first, "indicator worker panicked");
            }
        }
    });

    collect_slots(code, &periods, slots)
}

fn collect_slots(
    code: &str,
    periods: &[usize],
    slots: Vec<Slot>,
) -> Result<PeriodResultSet, TastError> {
    // A real failure takes precedence over the periods it cancelled.
    if let Some((period, err)) = periods.iter().zip(&slots).find_map(|(p, slot)| match slot {
        Some(Err(e)) => Some((*p, e)),
        _ => None,
    }) {
        return Err(TastError::IncompleteResult {
            code: code.to_string(),
            period,
            reason: err.to_string(),
        });
    }

    let mut set = PeriodResultSet::new(code);
    for (&period, slot) in periods.iter().zip(slots) {
        match slot {
            Some(Ok(points)) => set.insert(period, points),
            _ => {
                return Err(TastError::IncompleteResult {
                    code: code.to_string(),
                    period,
                    reason: "computation did not complete".into(),
                });
            }
        }
    }

    tracing::debug!(code, periods = set.series.len(), "fan-out complete");
    Ok(set)
}
