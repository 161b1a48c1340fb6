//! Create/edit form rules for a single worker

use serde::Serialize;
use std::fmt;

use crate::core::dates::{is_valid_date, normalize_date};
use crate::core::fields::{digits_only, NAMA, NIK, TTL};
use crate::types::{CellValue, WorkerRecord};

const REQUIRED: &[(&str, &str)] = &[
    ("NAMA", "Name is required"),
    ("NIK", "NIK is required"),
    ("TEMPAT_LAHIR", "Place of birth is required"),
    ("TTL", "Date of birth is required"),
    ("ALAMAT", "Address is required"),
    ("SEKOLAH", "School is required"),
];

/// One rule violation on a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn issue(field: &str, message: impl Into<String>) -> FieldIssue {
    FieldIssue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Prepare a record for create/update: upper-case the place of birth and
/// bring `TTL` (possibly in date-input `yyyy-mm-dd` shape) to `dd/mm/yyyy`.
pub fn prepare_form(record: &WorkerRecord) -> WorkerRecord {
    let mut prepared = record.clone();

    let place = record.get("TEMPAT_LAHIR");
    if let CellValue::Text(s) = place {
        prepared.set("TEMPAT_LAHIR", s.to_uppercase());
    }

    let ttl = record.get(TTL);
    if !ttl.is_blank() {
        prepared.set(TTL, normalize_date(ttl));
    }

    prepared
}

/// Check a prepared record against the form rules, returning every issue.
pub fn validate_form(record: &WorkerRecord) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    for (field, message) in REQUIRED {
        if record.get(field).is_blank() {
            issues.push(issue(field, *message));
        }
    }

    let name = record.text(NAMA);
    if !name.trim().is_empty() && name.trim().chars().count() < 2 {
        issues.push(issue(NAMA, "Name must be at least 2 characters"));
    }

    let nik = record.text(NIK);
    if !nik.trim().is_empty() && (nik.len() != 16 || digits_only(&nik) != nik) {
        issues.push(issue(NIK, "NIK must be exactly 16 digits"));
    }

    let ttl = record.text(TTL);
    if !ttl.trim().is_empty() && !is_valid_date(&ttl) {
        issues.push(issue(
            TTL,
            format!("Invalid date '{}', use dd/mm/yyyy", ttl),
        ));
    }

    issues
}
