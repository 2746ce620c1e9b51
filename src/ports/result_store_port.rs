//! Indicator result persistence port trait.

use crate::domain::error::TastError;
use crate::domain::fanout::PeriodResultSet;

/// Cache of complete per-instrument result sets.
///
/// `exists` is the only cache-hit test the engine performs. A stricter store
/// (checksums, staleness) can implement the same trait.
pub trait ResultStore {
    fn exists(&self, code: &str) -> bool;

    fn save(&self, code: &str, results: &PeriodResultSet) -> Result<(), TastError>;

    fn load(&self, code: &str) -> Result<PeriodResultSet, TastError>;
}
