//! Declarative entity definitions: typed fields, constraints, filter allow-lists.

use serde::Serialize;

/// Column type for DDL rendering and request validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    BigInt,
    VarChar(u32),
    Text,
    /// JSON array stored as jsonb; serialized to clients as a JSON array.
    JsonList,
}

impl FieldType {
    /// PostgreSQL type name for DDL and bind casts.
    pub fn pg_type(&self) -> String {
        match self {
            FieldType::Bool => "boolean".into(),
            FieldType::BigInt => "bigint".into(),
            FieldType::VarChar(n) => format!("varchar({})", n),
            FieldType::Text => "text".into(),
            FieldType::JsonList => "jsonb".into(),
        }
    }

    /// Cast suffix for bind placeholders (e.g. "$1::jsonb"). None binds as-is.
    pub fn bind_cast(&self) -> Option<&'static str> {
        match self {
            FieldType::JsonList => Some("jsonb"),
            _ => None,
        }
    }
}

/// Extra value-format check applied on top of the type check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldFormat {
    Url,
}

/// One declared column. Audit columns are not declared here; the registry
/// composes them onto every entity.
#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Must be present and non-null on create. Mutually exclusive with `default`.
    pub required: bool,
    pub unique: bool,
    /// SQL default literal (e.g. "0", "''", "'[]'::jsonb").
    pub default: Option<&'static str>,
    pub format: Option<FieldFormat>,
}

impl FieldDef {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        FieldDef {
            name,
            field_type,
            required: false,
            unique: false,
            default: None,
            format: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_sql(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    pub fn format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// How a query parameter matches its column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Contains,
    Boolean,
}

/// One entry of the per-entity filter allow-list. Each field maps one-to-one
/// to a real column; parameters outside the list are ignored.
#[derive(Clone, Debug)]
pub struct FilterDef {
    pub field: &'static str,
    pub mode: MatchMode,
}

impl FilterDef {
    pub fn exact(field: &'static str) -> Self {
        FilterDef { field, mode: MatchMode::Exact }
    }

    pub fn contains(field: &'static str) -> Self {
        FilterDef { field, mode: MatchMode::Contains }
    }

    pub fn boolean(field: &'static str) -> Self {
        FilterDef { field, mode: MatchMode::Boolean }
    }
}

/// Create semantics for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateMode {
    /// Plain insert; duplicate unique key surfaces as a conflict.
    Insert,
    /// Look up by the provided fields first; insert on miss. Concurrent
    /// identical creates are resolved by the storage unique constraints.
    GetOrCreate,
}

/// A registered entity: schema, filters, and orchestrator knobs.
#[derive(Clone, Debug)]
pub struct EntityDef {
    /// URL path segment, e.g. "plugin-tags".
    pub path_segment: &'static str,
    pub table_name: &'static str,
    /// Human-readable name for docs and error messages.
    pub display_name: &'static str,
    pub fields: Vec<FieldDef>,
    pub filters: Vec<FilterDef>,
    pub create_mode: CreateMode,
    /// When true, list queries are scoped to a business unit by default.
    pub biz_scoped: bool,
}

impl EntityDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn filter(&self, field: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.field == field)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.unique)
    }
}

/// Audit columns composed onto every entity (base-record convention).
/// `is_deleted` backs soft delete and is stripped from responses.
pub const AUDIT_FIELDS: &[(&str, &str)] = &[
    ("created_by", "varchar(128) NOT NULL DEFAULT ''"),
    ("created_at", "timestamptz NOT NULL DEFAULT NOW()"),
    ("updated_by", "varchar(128) NOT NULL DEFAULT ''"),
    ("updated_at", "timestamptz NOT NULL DEFAULT NOW()"),
    ("is_deleted", "boolean NOT NULL DEFAULT FALSE"),
];

/// Audit column names in response order (without the soft-delete flag).
pub const AUDIT_RESPONSE_FIELDS: &[&str] = &["created_by", "created_at", "updated_by", "updated_at"];

/// Soft-delete flag column.
pub const SOFT_DELETE_FIELD: &str = "is_deleted";
