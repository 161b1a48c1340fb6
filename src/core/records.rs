//! Record list helpers: local filtering, backend search criteria, file names

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::WorkerRecord;

/// Case-insensitive substring filter on one field. An empty query keeps
/// every record.
pub fn filter_records<'a>(
    records: &'a [WorkerRecord],
    field: &str,
    query: &str,
) -> Vec<&'a WorkerRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || r.text(field).to_lowercase().contains(&needle))
        .collect()
}

/// Field → value criteria sent to the backend search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchCriteria(BTreeMap<String, String>);

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Parse `KEY=VALUE` pairs as given on the command line.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, String> {
        let mut criteria = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Expected KEY=VALUE, got '{}'", pair))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("Missing field name in '{}'", pair));
            }
            criteria.0.insert(key.to_uppercase(), value.trim().to_string());
        }
        Ok(criteria)
    }

    /// True when every value is empty: such a search is never sent.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Download name for an export: `DataPekerja_15-08-2025.xlsx`, with the
/// report title inserted when given.
pub fn default_file_name(title: Option<&str>, extension: &str, today: &str) -> String {
    let stamp = today.replace('/', "-");
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => format!("DataPekerja_{}_{}.{}", t.replace(' ', "_"), stamp, extension),
        None => format!("DataPekerja_{}.{}", stamp, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WorkerRecord> {
        vec![
            WorkerRecord::new().with("NAMA", "Budi Santoso").with("NIK", "3171000000000001"),
            WorkerRecord::new().with("NAMA", "Siti Aminah").with("NIK", "3171000000000002"),
            WorkerRecord::new().with("NIK", "3272000000000003"),
        ]
    }

    #[test]
    fn test_filter_case_insensitive() {
        let records = sample();
        let hits = filter_records(&records, "NAMA", "budi");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text("NAMA"), "Budi Santoso");
    }

    #[test]
    fn test_filter_missing_field_never_matches() {
        let records = sample();
        assert_eq!(filter_records(&records, "NAMA", "a").len(), 2);
        assert_eq!(filter_records(&records, "NIK", "3171").len(), 2);
    }

    #[test]
    fn test_filter_empty_query_keeps_all() {
        let records = sample();
        assert_eq!(filter_records(&records, "NAMA", "  ").len(), 3);
    }

    #[test]
    fn test_criteria_from_pairs() {
        let criteria = SearchCriteria::from_pairs(&["nama=Budi", "NIK = 3171"]).unwrap();
        let pairs: Vec<_> = criteria.iter().collect();
        assert_eq!(pairs.len(), 2);
        assert!(!criteria.is_blank());
        assert!(SearchCriteria::from_pairs(&["NAMA"]).is_err());
        assert!(SearchCriteria::from_pairs(&["=x"]).is_err());
    }

    #[test]
    fn test_criteria_blank() {
        assert!(SearchCriteria::new().is_blank());
        assert!(SearchCriteria::new().with("NAMA", " ").is_blank());
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            default_file_name(None, "xlsx", "15/08/2025"),
            "DataPekerja_15-08-2025.xlsx"
        );
        assert_eq!(
            default_file_name(Some("ANKAPIN III"), "pdf", "15/08/2025"),
            "DataPekerja_ANKAPIN_III_15-08-2025.pdf"
        );
    }
}
