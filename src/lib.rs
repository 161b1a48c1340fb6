//! Worker Registry - spreadsheet import/export for an Indonesian worker registry
//!
//! This library turns uploaded spreadsheets into validated worker records,
//! submits them to the registry backend, and exports record sets back to
//! spreadsheets and printable reports.
//!
//! # Features
//!
//! - Day-first (`dd/mm/yyyy`) date normalization for every shape a
//!   spreadsheet produces: serial numbers, ISO text, `-`/`.`/`/` separators
//! - Per-field cleanup on import (NIK digits, `RT_RW` split, localized numbers)
//! - Row-level validation errors that block submission until fixed
//! - Excel export with text-typed dates, PDF report, import template
//! - JSON-over-HTTP backend client
//!
//! # Example
//!
//! ```no_run
//! use worker_registry::excel::ExcelImporter;
//!
//! # async fn run() -> worker_registry::RegistryResult<()> {
//! let batch = ExcelImporter::read("workers.xlsx").await?.import()?;
//!
//! println!("Rows: {}", batch.rows.len());
//! for error in &batch.errors {
//!     println!("{}", error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod excel;
pub mod pdf;
pub mod types;

// Re-export commonly used types
pub use error::{RegistryError, RegistryResult};
pub use types::{CellValue, ImportBatch, RecordKey, ValidationError, WorkerRecord};
