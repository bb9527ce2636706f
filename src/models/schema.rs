//! Schema-related data models.
//!
//! This module defines types for table introspection and statistics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexInfo>,
}

impl TableSchema {
    /// Create a new table schema.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Add a column definition.
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDefinition {
    pub name: String,
    /// Declared type as written in CREATE TABLE (may be empty in SQLite)
    pub data_type: String,
    pub nullable: bool,
    /// Default value with appropriate JSON type based on column data type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    pub is_primary_key: bool,
}

impl ColumnDefinition {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
            is_primary_key: false,
        }
    }

    /// Set whether this is a primary key column.
    pub fn with_primary_key(mut self, is_pk: bool) -> Self {
        self.is_primary_key = is_pk;
        self
    }

    /// Set the default value from the raw `dflt_value` text, converting to an
    /// appropriate JSON type based on the column's data_type.
    pub fn with_default_str(mut self, default_str: &str) -> Self {
        self.default_value = Some(parse_default_value(default_str, &self.data_type));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    /// None when the reference targets the parent's primary key implicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
    pub on_delete: ForeignKeyAction,
    pub on_update: ForeignKeyAction,
}

impl ForeignKey {
    /// Create a new foreign key.
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: Option<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column,
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// Set the on delete action.
    pub fn with_on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the on update action.
    pub fn with_on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = action;
        self
    }
}

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ForeignKeyAction {
    /// Parse from the action text reported by `pragma_foreign_key_list`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            "RESTRICT" => Self::Restrict,
            _ => Self::NoAction,
        }
    }
}

impl std::fmt::Display for ForeignKeyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAction => write!(f, "NO ACTION"),
            Self::Restrict => write!(f, "RESTRICT"),
            Self::Cascade => write!(f, "CASCADE"),
            Self::SetNull => write!(f, "SET NULL"),
            Self::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
}

impl IndexInfo {
    /// Create a new index info.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique: false,
            is_primary: false,
        }
    }

    /// Set whether the index is unique.
    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    /// Set whether the index backs the primary key.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Statistics snapshot for one table, computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableStats {
    pub table_name: String,
    pub row_count: u64,
    pub column_count: usize,
    pub columns: Vec<ColumnStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnStats {
    pub name: String,
    pub data_type: String,
    pub null_count: u64,
    pub distinct_count: u64,
    /// Omitted for BLOB columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
}

/// Remove one level of SQL single quotes, unescaping doubled quotes.
///
/// SQLite reports string defaults verbatim, e.g. `'active'` or `'it''s'`.
fn unquote_sql_literal(s: &str) -> Option<String> {
    let inner = s.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

/// Convert a raw default expression into a typed JSON value.
pub fn parse_default_value(default_str: &str, data_type: &str) -> JsonValue {
    if let Some(text) = unquote_sql_literal(default_str) {
        return JsonValue::String(text);
    }

    if default_str.eq_ignore_ascii_case("NULL") {
        return JsonValue::Null;
    }

    let dt_lower = data_type.to_lowercase();

    if dt_lower.contains("int") {
        if let Ok(n) = default_str.parse::<i64>() {
            return JsonValue::Number(n.into());
        }
    }

    if dt_lower.contains("real")
        || dt_lower.contains("floa")
        || dt_lower.contains("doub")
        || dt_lower.contains("numeric")
        || dt_lower.contains("decimal")
    {
        if let Ok(n) = default_str.parse::<f64>() {
            if let Some(num) = serde_json::Number::from_f64(n) {
                return JsonValue::Number(num);
            }
        }
    }

    if dt_lower.contains("bool") {
        match default_str.to_lowercase().as_str() {
            "true" | "1" => return JsonValue::Bool(true),
            "false" | "0" => return JsonValue::Bool(false),
            _ => {}
        }
    }

    // Expressions such as CURRENT_TIMESTAMP or (datetime('now')) stay verbatim
    JsonValue::String(default_str.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_default_quoted_string() {
        assert_eq!(parse_default_value("'active'", "TEXT"), json!("active"));
        assert_eq!(parse_default_value("'it''s'", "TEXT"), json!("it's"));
    }

    #[test]
    fn test_parse_default_integer() {
        assert_eq!(parse_default_value("0", "INTEGER"), json!(0));
        assert_eq!(parse_default_value("-42", "BIGINT"), json!(-42));
    }

    #[test]
    fn test_parse_default_real() {
        assert_eq!(parse_default_value("1.5", "REAL"), json!(1.5));
    }

    #[test]
    fn test_parse_default_boolean() {
        assert_eq!(parse_default_value("1", "BOOLEAN"), json!(true));
        assert_eq!(parse_default_value("FALSE", "BOOLEAN"), json!(false));
    }

    #[test]
    fn test_parse_default_expression_verbatim() {
        assert_eq!(
            parse_default_value("CURRENT_TIMESTAMP", "DATETIME"),
            json!("CURRENT_TIMESTAMP")
        );
    }

    #[test]
    fn test_parse_default_null() {
        assert_eq!(parse_default_value("NULL", "TEXT"), JsonValue::Null);
    }

    #[test]
    fn test_foreign_key_action_parse() {
        assert_eq!(ForeignKeyAction::parse("CASCADE"), ForeignKeyAction::Cascade);
        assert_eq!(ForeignKeyAction::parse("set null"), ForeignKeyAction::SetNull);
        assert_eq!(ForeignKeyAction::parse("NO ACTION"), ForeignKeyAction::NoAction);
        assert_eq!(ForeignKeyAction::Restrict.to_string(), "RESTRICT");
    }

    #[test]
    fn test_table_schema_column_lookup() {
        let schema = TableSchema::new("users")
            .with_column(ColumnDefinition::new("id", "INTEGER", false).with_primary_key(true));
        assert!(schema.column("id").unwrap().is_primary_key);
        assert!(schema.column("missing").is_none());
    }
}
