//! CLI command handlers

pub mod commands;
mod logging;

pub use commands::{
    add, check_date, delete, edit, export, import, list, search, template, ExportOptions, ListKind,
};
pub use logging::init_logging;
