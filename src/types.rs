use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Cell values
//==============================================================================

/// A single scalar as it appears in a spreadsheet cell or a backend record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Absent, or text containing only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Empty,
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Largest integer an f64 holds exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(CellValue::from)
    }
}

//==============================================================================
// Worker records
//==============================================================================

/// How a record is identified in listings and previews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Nik(String),
    Position(usize),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Nik(nik) => write!(f, "{}", nik),
            RecordKey::Position(idx) => write!(f, "#{}", idx + 1),
        }
    }
}

/// One worker: field key (`NAMA`, `NIK`, `TTL`, ...) to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerRecord {
    fields: BTreeMap<String, CellValue>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl WorkerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Missing keys read as [`CellValue::Empty`].
    pub fn get(&self, key: &str) -> &CellValue {
        self.fields.get(key).unwrap_or(&EMPTY_CELL)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<CellValue> {
        self.fields.remove(key)
    }

    /// Display text of a field, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).to_string()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Backend row id, when the record came from the backend.
    pub fn id(&self) -> Option<String> {
        match self.get("id") {
            CellValue::Empty => None,
            value => Some(value.to_string()),
        }
    }

    /// NIK when present, otherwise the record's position in its list.
    pub fn identity(&self, index: usize) -> RecordKey {
        let nik = self.text("NIK");
        if nik.trim().is_empty() {
            RecordKey::Position(index)
        } else {
            RecordKey::Nik(nik)
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for WorkerRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

//==============================================================================
// Import batches
//==============================================================================

/// A date problem found while processing an uploaded sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Sheet row, 1-based; the header is row 1.
    pub row: usize,
    pub field: String,
    /// Cell content before normalization.
    pub value: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every row parsed from one uploaded file plus the date errors found in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    /// Header row, in sheet order.
    pub headers: Vec<String>,
    pub rows: Vec<WorkerRecord>,
    pub errors: Vec<ValidationError>,
}

impl ImportBatch {
    /// Submittable iff no validation errors remain.
    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::text("Jakarta").to_string(), "Jakarta");
        assert_eq!(CellValue::Number(170.0).to_string(), "170");
        assert_eq!(CellValue::Number(65.5).to_string(), "65.5");
    }

    #[test]
    fn test_cell_value_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::text("x").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_cell_value_from_json() {
        assert_eq!(CellValue::from(serde_json::json!(null)), CellValue::Empty);
        assert_eq!(CellValue::from(serde_json::json!(12)), CellValue::Number(12.0));
        assert_eq!(CellValue::from(serde_json::json!("a")), CellValue::text("a"));
        assert_eq!(CellValue::from(serde_json::json!(true)), CellValue::text("true"));
    }

    #[test]
    fn test_record_json_shape() {
        let record = WorkerRecord::new()
            .with("NAMA", "Budi")
            .with("TINGGI_BADAN", 170.0)
            .with("BERAT_BADAN", 65.5)
            .with("KTP", CellValue::Empty);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"NAMA": "Budi", "TINGGI_BADAN": 170, "BERAT_BADAN": 65.5, "KTP": null})
        );

        let back: WorkerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_identity() {
        let with_nik = WorkerRecord::new().with("NIK", "3171234567890001");
        assert_eq!(
            with_nik.identity(4),
            RecordKey::Nik("3171234567890001".to_string())
        );

        let without = WorkerRecord::new().with("NAMA", "Siti");
        assert_eq!(without.identity(4), RecordKey::Position(4));
        assert_eq!(without.identity(4).to_string(), "#5");
    }

    #[test]
    fn test_record_id() {
        let record = WorkerRecord::new().with("id", 7.0);
        assert_eq!(record.id(), Some("7".to_string()));
        assert_eq!(WorkerRecord::new().id(), None);
    }

    #[test]
    fn test_batch_submittable() {
        let mut batch = ImportBatch::default();
        assert!(batch.is_submittable());
        batch.errors.push(ValidationError {
            row: 2,
            field: "TTL".to_string(),
            value: "31/02/2020".to_string(),
            message: "bad".to_string(),
        });
        assert!(!batch.is_submittable());
    }
}
