//! Configuration access port trait.

use crate::domain::error::TastError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    fn require_string(&self, section: &str, key: &str) -> Result<String, TastError> {
        self.get_string(section, key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TastError::ConfigMissing {
                section: section.into(),
                key: key.into(),
            })
    }
}
