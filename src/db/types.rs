//! SQLite value to JSON mapping.
//!
//! SQLite is dynamically typed: the declared column type is only an affinity
//! hint and any cell may hold any storage class. Decoding therefore uses a
//! two-phase approach:
//! 1. `categorize_type` classifies the *declared* type (BOOLEAN and JSON
//!    columns get special treatment)
//! 2. the *runtime* storage class of each value (NULL, INTEGER, REAL, TEXT,
//!    BLOB) decides how the bytes are read

use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Boolean,
    Text,
    Binary,
    Json,
    Unknown,
}

/// Classify a declared SQLite type name into a logical category.
///
/// Follows SQLite's affinity rules (substring based) with BOOLEAN and JSON
/// split out.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    if lower.is_empty() {
        return TypeCategory::Unknown;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower.contains("int") {
        return TypeCategory::Integer;
    }

    if lower.contains("char") || lower.contains("clob") || lower.contains("text") {
        return TypeCategory::Text;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    if lower.contains("real")
        || lower.contains("floa")
        || lower.contains("doub")
        || lower.contains("numeric")
        || lower.contains("decimal")
    {
        return TypeCategory::Float;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to JSON value.
///
/// If `decode_binary` is true, attempts to decode as UTF-8 text first.
/// Falls back to base64 encoding if not valid UTF-8 or if `decode_binary` is false.
pub fn decode_binary_value(bytes: &[u8], decode_binary: bool) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    if decode_binary {
        match std::str::from_utf8(bytes) {
            Ok(s) => JsonValue::String(s.to_string()),
            Err(_) => JsonValue::String(STANDARD.encode(bytes)),
        }
    } else {
        JsonValue::String(STANDARD.encode(bytes))
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
    fn to_json_map_with_options(&self, decode_binary: bool) -> serde_json::Map<String, JsonValue>;
    /// Values in column order, one per column even when names repeat.
    fn to_json_values_with_options(&self, decode_binary: bool) -> Vec<JsonValue>;
    fn get_column_names(&self) -> Vec<String>;
}

impl RowToJson for SqliteRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        self.to_json_map_with_options(true)
    }

    fn to_json_map_with_options(&self, decode_binary: bool) -> serde_json::Map<String, JsonValue> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .zip(self.to_json_values_with_options(decode_binary))
            .collect()
    }

    fn to_json_values_with_options(&self, decode_binary: bool) -> Vec<JsonValue> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                decode_column(self, idx, category, decode_binary)
            })
            .collect()
    }

    fn get_column_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }
}

// =============================================================================
// Value Decoders
// =============================================================================

/// Runtime storage class of a single value.
fn storage_class(row: &SqliteRow, idx: usize) -> Option<String> {
    let raw = row.try_get_raw(idx).ok()?;
    if raw.is_null() {
        return None;
    }
    Some(raw.type_info().name().to_uppercase())
}

fn decode_column(
    row: &SqliteRow,
    idx: usize,
    category: TypeCategory,
    decode_binary: bool,
) -> JsonValue {
    let Some(storage) = storage_class(row, idx) else {
        return JsonValue::Null;
    };

    match storage.as_str() {
        "INTEGER" | "BOOLEAN" if category == TypeCategory::Boolean => decode_boolean(row, idx),
        "INTEGER" | "BOOLEAN" => decode_integer(row, idx),
        "REAL" => decode_float(row, idx),
        "BLOB" => decode_binary_col(row, idx, decode_binary),
        _ => decode_text(row, idx, category),
    }
}

fn decode_integer(row: &SqliteRow, idx: usize) -> JsonValue {
    row.try_get_unchecked::<i64, _>(idx)
        .map(|v| JsonValue::Number(v.into()))
        .unwrap_or(JsonValue::Null)
}

fn decode_boolean(row: &SqliteRow, idx: usize) -> JsonValue {
    row.try_get_unchecked::<i64, _>(idx)
        .map(|v| JsonValue::Bool(v != 0))
        .unwrap_or(JsonValue::Null)
}

fn decode_float(row: &SqliteRow, idx: usize) -> JsonValue {
    match row.try_get_unchecked::<f64, _>(idx) {
        Ok(v) => serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string())),
        Err(_) => JsonValue::Null,
    }
}

fn decode_binary_col(row: &SqliteRow, idx: usize, decode_binary: bool) -> JsonValue {
    row.try_get_unchecked::<Vec<u8>, _>(idx)
        .map(|v| decode_binary_value(&v, decode_binary))
        .unwrap_or(JsonValue::Null)
}

fn decode_text(row: &SqliteRow, idx: usize, category: TypeCategory) -> JsonValue {
    match row.try_get_unchecked::<String, _>(idx) {
        Ok(v) => {
            if category == TypeCategory::Json {
                if let Ok(json) = serde_json::from_str::<JsonValue>(&v) {
                    return json;
                }
            }
            JsonValue::String(v)
        }
        Err(e) => {
            tracing::error!(column = idx, error = %e, "Failed to decode TEXT value");
            JsonValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INTEGER"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("unsigned big int"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_type_text() {
        assert_eq!(categorize_type("VARCHAR(255)"), TypeCategory::Text);
        assert_eq!(categorize_type("TEXT"), TypeCategory::Text);
        assert_eq!(categorize_type("CLOB"), TypeCategory::Text);
    }

    #[test]
    fn test_categorize_type_float() {
        assert_eq!(categorize_type("REAL"), TypeCategory::Float);
        assert_eq!(categorize_type("DOUBLE PRECISION"), TypeCategory::Float);
        assert_eq!(categorize_type("DECIMAL(10,2)"), TypeCategory::Float);
    }

    #[test]
    fn test_categorize_type_special() {
        assert_eq!(categorize_type("BOOLEAN"), TypeCategory::Boolean);
        assert_eq!(categorize_type("json"), TypeCategory::Json);
        assert_eq!(categorize_type("BLOB"), TypeCategory::Binary);
        assert_eq!(categorize_type(""), TypeCategory::Unknown);
        assert_eq!(categorize_type("DATETIME"), TypeCategory::Unknown);
    }

    #[test]
    fn test_decode_binary_value_with_valid_utf8() {
        let bytes = b"hello world";
        let result = decode_binary_value(bytes, true);
        assert_eq!(result, JsonValue::String("hello world".to_string()));

        let result = decode_binary_value(bytes, false);
        assert_eq!(result, JsonValue::String("aGVsbG8gd29ybGQ=".to_string()));
    }

    #[test]
    fn test_decode_binary_value_with_invalid_utf8() {
        let bytes: &[u8] = &[0xFF, 0xFE, 0x00, 0x01];
        let result = decode_binary_value(bytes, true);
        assert_eq!(result, JsonValue::String("//4AAQ==".to_string()));
    }

    #[test]
    fn test_decode_binary_value_empty() {
        let result = decode_binary_value(&[], true);
        assert_eq!(result, JsonValue::String(String::new()));
    }
}
