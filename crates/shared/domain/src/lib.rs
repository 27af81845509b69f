//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `strum`).
//! No I/O here, only data and small helpers.

pub mod category;
pub mod config;
pub mod constants;
pub mod policy;
