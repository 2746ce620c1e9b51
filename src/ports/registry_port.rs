//! Instrument registry port trait.

use crate::domain::error::TastError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub code: String,
    pub display_name: String,
}

pub trait RegistryPort {
    fn instruments(&self) -> Result<Vec<Instrument>, TastError>;
}
