//! Port traits implemented by [`crate::adapters`].

pub mod config_port;
pub mod history_port;
pub mod registry_port;
pub mod result_store_port;
