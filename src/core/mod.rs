//! Core record logic: dates, field rules, list helpers and form checks

pub mod dates;
pub mod fields;
pub mod form;
pub mod records;

pub use dates::{is_valid_date, normalize_date, normalize_date_str};
pub use fields::{ExportCell, FieldKind, FieldSpec};
pub use form::{prepare_form, validate_form, FieldIssue};
pub use records::{filter_records, SearchCriteria};
