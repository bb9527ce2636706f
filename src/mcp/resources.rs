//! Table resources.
//!
//! Three URI templates expose read-only views of each table:
//! - `schema://tables/{table_name}`: columns, keys and indexes
//! - `data://tables/{table_name}?limit=N&offset=M`: a page of rows
//! - `stats://tables/{table_name}`: row count and per-column statistics
//!
//! Table names are percent-decoded from the URI path.

use crate::error::{DbError, DbResult};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use rmcp::model::{AnnotateAble, RawResource, RawResourceTemplate, Resource, ResourceTemplate};
use url::Url;

pub const JSON_MIME_TYPE: &str = "application/json";

/// Characters escaped when a table name is placed in a URI path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Which view of a table a resource URI asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Schema,
    Data,
    Stats,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Schema, Self::Data, Self::Stats];

    pub fn scheme(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Data => "data",
            Self::Stats => "stats",
        }
    }

    fn from_scheme(scheme: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.scheme() == scheme)
    }

    /// Concrete URI for `table_name`.
    pub fn uri_for(self, table_name: &str) -> String {
        format!(
            "{}://tables/{}",
            self.scheme(),
            utf8_percent_encode(table_name, PATH_SEGMENT)
        )
    }

    fn label(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Data => "sample rows",
            Self::Stats => "statistics",
        }
    }
}

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub kind: ResourceKind,
    pub table_name: String,
    /// Requested page size; only meaningful for `data://`
    pub limit: u32,
    pub offset: u64,
}

/// Parse a resource URI.
///
/// `default_limit` applies when a `data://` URI has no `limit` parameter.
/// Clamping is left to the reader.
pub fn parse_resource_uri(uri: &str, default_limit: u32) -> DbResult<ResourceRequest> {
    let url = Url::parse(uri)
        .map_err(|e| DbError::invalid_input(format!("Invalid resource URI '{}': {}", uri, e)))?;

    let kind = ResourceKind::from_scheme(url.scheme()).ok_or_else(|| {
        DbError::invalid_input(format!(
            "Unknown resource scheme '{}'. Expected schema://, data:// or stats://",
            url.scheme()
        ))
    })?;

    if url.host_str() != Some("tables") {
        return Err(DbError::invalid_input(format!(
            "Invalid resource URI '{}'. Expected {}://tables/{{table_name}}",
            uri,
            kind.scheme()
        )));
    }

    let raw_name = url.path().strip_prefix('/').unwrap_or(url.path());
    if raw_name.is_empty() || raw_name.contains('/') {
        return Err(DbError::invalid_input(format!(
            "Invalid resource URI '{}'. Expected {}://tables/{{table_name}}",
            uri,
            kind.scheme()
        )));
    }
    let table_name = percent_decode_str(raw_name)
        .decode_utf8()
        .map_err(|_| DbError::invalid_input("Table name is not valid UTF-8"))?
        .into_owned();

    let mut limit = default_limit;
    let mut offset = 0u64;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "limit" => {
                limit = value.parse().map_err(|_| {
                    DbError::invalid_input(format!(
                        "limit must be a non-negative integer, got '{}'",
                        value
                    ))
                })?;
            }
            "offset" => {
                offset = value.parse().map_err(|_| {
                    DbError::invalid_input(format!(
                        "offset must be a non-negative integer, got '{}'",
                        value
                    ))
                })?;
            }
            _ => {}
        }
    }

    Ok(ResourceRequest {
        kind,
        table_name,
        limit,
        offset,
    })
}

/// The three URI templates advertised by the server.
pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![
        template(
            "schema://tables/{table_name}",
            "table_schema",
            "Column definitions, primary key, foreign keys and indexes of a table",
        ),
        template(
            "data://tables/{table_name}{?limit,offset}",
            "table_data",
            "Rows of a table. limit defaults to 10 (max 1000), offset to 0",
        ),
        template(
            "stats://tables/{table_name}",
            "table_stats",
            "Row count plus null count, distinct count, min and max per column",
        ),
    ]
}

fn template(uri_template: &str, name: &str, description: &str) -> ResourceTemplate {
    RawResourceTemplate {
        uri_template: uri_template.to_string(),
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        mime_type: Some(JSON_MIME_TYPE.to_string()),
    }
    .no_annotation()
}

/// Concrete resources for every table.
pub fn table_resources(tables: &[String]) -> Vec<Resource> {
    tables
        .iter()
        .flat_map(|table| {
            ResourceKind::ALL.into_iter().map(move |kind| {
                let mut raw = RawResource::new(kind.uri_for(table), format!("{} {}", table, kind.label()));
                raw.mime_type = Some(JSON_MIME_TYPE.to_string());
                raw.no_annotation()
            })
        })
        .collect()
}
