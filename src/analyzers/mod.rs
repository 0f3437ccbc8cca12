//! Join coverage and quality diagnostics.
//!
//! This module re-counts lamps from the raw fixture inventory, scans the
//! scored segment collection, and reports which identifiers appear in only one
//! dataset, which segments score zero, and how lamps are distributed per segment.
//! It never writes to the pipeline files.

pub mod analyzer;
pub mod coverage;
pub mod histogram;
pub mod samples;
pub mod types;
