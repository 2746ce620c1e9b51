//! File-backed adapter implementations for ports.

pub mod tsv;
pub mod daily_file_adapter;
pub mod registry_file_adapter;
pub mod tsv_result_store;
pub mod file_config_adapter;
