//! Core domain types and logic.

pub mod daily;
pub mod normalize;
pub mod indicator;
pub mod fanout;
pub mod engine;
pub mod error;
