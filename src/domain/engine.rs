//! Engine driver: per-instrument cache check, fan-out and persistence.
//!
//! Per instrument the driver walks
//! `Pending -> HistoryFetched -> (CacheHit -> Skipped) | (CacheMiss -> Computing -> Persisted)`.
//! The first error aborts the whole run; instruments persisted before it stay
//! on disk untouched.

use std::fmt;

use crate::domain::error::TastError;
use crate::domain::fanout::compute_all;
use crate::domain::indicator::{IndicatorFamily, PeriodRange};
use crate::ports::history_port::HistoryPort;
use crate::ports::registry_port::RegistryPort;
use crate::ports::result_store_port::ResultStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentState {
    Pending,
    HistoryFetched,
    CacheHit,
    CacheMiss,
    Computing,
    Skipped,
    Persisted,
    Failed,
}

impl InstrumentState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InstrumentState::Skipped | InstrumentState::Persisted | InstrumentState::Failed
        )
    }
}

impl fmt::Display for InstrumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstrumentState::Pending => "pending",
            InstrumentState::HistoryFetched => "history-fetched",
            InstrumentState::CacheHit => "cache-hit",
            InstrumentState::CacheMiss => "cache-miss",
            InstrumentState::Computing => "computing",
            InstrumentState::Skipped => "skipped",
            InstrumentState::Persisted => "persisted",
            InstrumentState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub persisted: Vec<String>,
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.persisted.len() + self.skipped.len()
    }
}

pub struct Engine<'a> {
    history: &'a dyn HistoryPort,
    store: &'a dyn ResultStore,
    family: IndicatorFamily,
    range: PeriodRange,
    workers: usize,
}

impl<'a> Engine<'a> {
    pub fn new(
        history: &'a dyn HistoryPort,
        store: &'a dyn ResultStore,
        family: IndicatorFamily,
        workers: usize,
    ) -> Self {
        Self {
            history,
            store,
            family,
            range: PeriodRange::SUPPORTED,
            workers,
        }
    }

    pub fn family(&self) -> IndicatorFamily {
        self.family
    }

    fn transition(&self, code: &str, state: &mut InstrumentState, next: InstrumentState) {
        tracing::debug!(code, family = %self.family, from = %state, to = %next, "instrument state");
        *state = next;
    }

    /// Drive one instrument to a terminal state.
    pub fn process_instrument(&self, code: &str) -> Result<InstrumentState, TastError> {
        let mut state = InstrumentState::Pending;
        match self.advance(code, &mut state) {
            Ok(()) => Ok(state),
            Err(e) => {
                self.transition(code, &mut state, InstrumentState::Failed);
                tracing::error!(code, family = %self.family, error = %e, "instrument failed");
                Err(e)
            }
        }
    }

    fn advance(&self, code: &str, state: &mut InstrumentState) -> Result<(), TastError> {
        let history = self.history.daily_history(code)?;
        self.transition(code, state, InstrumentState::HistoryFetched);

        if self.store.exists(code) {
            self.transition(code, state, InstrumentState::CacheHit);
            self.transition(code, state, InstrumentState::Skipped);
            return Ok(());
        }
        self.transition(code, state, InstrumentState::CacheMiss);

        self.transition(code, state, InstrumentState::Computing);
        let family = self.family;
        let results = compute_all(code, &history, self.range, self.workers, |h, p| {
            family.compute(h, p)
        })?;

        self.store.save(code, &results)?;
        self.transition(code, state, InstrumentState::Persisted);
        tracing::info!(code, family = %self.family, days = history.len(), "indicators persisted");
        Ok(())
    }

    /// Process every registered instrument in order, stopping at the first error.
    pub fn run_all(&self, registry: &dyn RegistryPort) -> Result<RunSummary, TastError> {
        let instruments = registry.instruments()?;
        tracing::info!(family = %self.family, instruments = instruments.len(), "indicator update started");

        let mut summary = RunSummary::default();
        for instrument in &instruments {
            match self.process_instrument(&instrument.code)? {
                InstrumentState::Skipped => summary.skipped.push(instrument.code.clone()),
                _ => summary.persisted.push(instrument.code.clone()),
            }
        }

        tracing::info!(
            family = %self.family,
            persisted = summary.persisted.len(),
            skipped = summary.skipped.len(),
            "indicator update finished"
        );
        Ok(summary)
    }
}
