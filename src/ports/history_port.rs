//! Daily history access port trait.

use crate::domain::daily::DailyRecord;
use crate::domain::error::TastError;

pub trait HistoryPort {
    /// Normalized history for `code`, ascending by date with previous-day linkage.
    fn daily_history(&self, code: &str) -> Result<Vec<DailyRecord>, TastError>;
}
