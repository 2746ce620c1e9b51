//! tast: period-parameterized technical indicators over daily price history.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! file-backed implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
