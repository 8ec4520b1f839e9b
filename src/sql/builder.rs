//! Builds parameterized INSERT, SELECT, UPDATE from an entity definition.
//! Identifiers come only from compiled-in definitions; all values are bound.

use crate::schema::{EntityDef, MatchMode, AUDIT_RESPONSE_FIELDS, SOFT_DELETE_FIELD};
use serde_json::Value;
use std::collections::HashMap;

/// One resolved filter: column, match mode, already-typed value.
#[derive(Clone, Debug)]
pub struct Predicate {
    pub column: String,
    pub mode: MatchMode,
    pub value: Value,
}

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT / RETURNING column list: id, declared fields, audit fields.
/// The soft-delete flag is never selected.
fn select_column_list(entity: &EntityDef) -> String {
    let mut cols = vec![quoted("id")];
    cols.extend(entity.fields.iter().map(|f| quoted(f.name)));
    cols.extend(AUDIT_RESPONSE_FIELDS.iter().map(|c| quoted(c)));
    cols.join(", ")
}

/// Bind placeholder with an optional type cast from the field definition.
fn placeholder(entity: &EntityDef, column: &str, n: usize) -> String {
    entity
        .field(column)
        .and_then(|f| f.field_type.bind_cast())
        .map(|cast| format!("${}::{}", n, cast))
        .unwrap_or_else(|| format!("${}", n))
}

/// WHERE fragment for the predicate set plus the soft-delete guard.
/// Predicates AND together; Contains binds a %value% LIKE pattern.
fn where_clause(entity: &EntityDef, q: &mut QueryBuf, predicates: &[Predicate]) -> String {
    let mut parts = Vec::with_capacity(predicates.len() + 1);
    for p in predicates {
        let part = match p.mode {
            MatchMode::Exact | MatchMode::Boolean => {
                let n = q.push_param(p.value.clone());
                format!("{} = {}", quoted(&p.column), placeholder(entity, &p.column, n))
            }
            MatchMode::Contains => {
                let pattern = match &p.value {
                    Value::String(s) => format!("%{}%", s),
                    other => format!("%{}%", other),
                };
                let n = q.push_param(Value::String(pattern));
                format!("{} LIKE ${}", quoted(&p.column), n)
            }
        };
        parts.push(part);
    }
    parts.push(format!("{} = FALSE", quoted(SOFT_DELETE_FIELD)));
    format!(" WHERE {}", parts.join(" AND "))
}

/// SELECT list with filters, ORDER BY id, LIMIT/OFFSET.
pub fn select_list(
    entity: &EntityDef,
    predicates: &[Predicate],
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(entity, &mut q, predicates);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(entity),
        quoted(entity.table_name),
        where_sql,
        quoted("id"),
        limit,
        offset
    );
    q
}

/// COUNT(*) with the same filters as select_list.
pub fn select_count(entity: &EntityDef, predicates: &[Predicate]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(entity, &mut q, predicates);
    q.sql = format!(
        "SELECT COUNT(*) FROM {}{}",
        quoted(entity.table_name),
        where_sql
    );
    q
}

/// SELECT one live row matching every provided field exactly (get-or-create lookup).
pub fn select_by_fields(entity: &EntityDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut parts = Vec::new();
    for f in &entity.fields {
        let Some(v) = body.get(f.name) else { continue };
        let n = q.push_param(v.clone());
        parts.push(format!("{} = {}", quoted(f.name), placeholder(entity, f.name, n)));
    }
    parts.push(format!("{} = FALSE", quoted(SOFT_DELETE_FIELD)));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT 1",
        select_column_list(entity),
        quoted(entity.table_name),
        parts.join(" AND "),
        quoted("id")
    );
    q
}

/// INSERT the declared fields present in body; omitted columns take their DB
/// defaults. RETURNING the full response column list.
pub fn insert(entity: &EntityDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in &entity.fields {
        let Some(v) = body.get(f.name) else { continue };
        let n = q.push_param(v.clone());
        cols.push(quoted(f.name));
        placeholders.push(placeholder(entity, f.name, n));
    }
    if let Some(Value::String(actor)) = body.get("created_by") {
        let n = q.push_param(Value::String(actor.clone()));
        cols.push(quoted("created_by"));
        placeholders.push(format!("${}", n));
    }
    // Every column defaulted: an empty column list is invalid SQL.
    q.sql = if cols.is_empty() {
        format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            quoted(entity.table_name),
            select_column_list(entity)
        )
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            quoted(entity.table_name),
            cols.join(", "),
            placeholders.join(", "),
            select_column_list(entity)
        )
    };
    q
}

/// Partial UPDATE by id: SET only declared fields present in body, bump
/// updated_at. A missing or deleted id matches zero rows.
pub fn update(entity: &EntityDef, id: i64, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in &entity.fields {
        let Some(v) = body.get(f.name) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!("{} = {}", quoted(f.name), placeholder(entity, f.name, n)));
    }
    if let Some(Value::String(actor)) = body.get("updated_by") {
        let n = q.push_param(Value::String(actor.clone()));
        sets.push(format!("{} = ${}", quoted("updated_by"), n));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(Value::Number(id.into()));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} AND {} = FALSE RETURNING {}",
        quoted(entity.table_name),
        sets.join(", "),
        quoted("id"),
        id_param,
        quoted(SOFT_DELETE_FIELD),
        select_column_list(entity)
    );
    q
}

/// Soft delete by id. Matching zero rows (absent or already deleted) is fine.
pub fn soft_delete(entity: &EntityDef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_param = q.push_param(Value::Number(id.into()));
    q.sql = format!(
        "UPDATE {} SET {} = TRUE, {} = NOW() WHERE {} = ${} AND {} = FALSE RETURNING {}",
        quoted(entity.table_name),
        quoted(SOFT_DELETE_FIELD),
        quoted("updated_at"),
        quoted("id"),
        id_param,
        quoted(SOFT_DELETE_FIELD),
        quoted("id")
    );
    q
}

/// Grouped count over one column (e.g. im platforms), live rows only.
pub fn grouped_count(entity: &EntityDef, column: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let col = quoted(column);
    q.sql = format!(
        "SELECT {col}, COUNT(*) AS {count} FROM {table} WHERE {deleted} = FALSE GROUP BY {col} ORDER BY {col}",
        col = col,
        count = quoted("count"),
        table = quoted(entity.table_name),
        deleted = quoted(SOFT_DELETE_FIELD),
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityRegistry;
    use serde_json::json;

    fn entity(path: &str) -> EntityDef {
        EntityRegistry::builtin().entity_by_path(path).unwrap().clone()
    }

    #[test]
    fn select_list_combines_filters_with_and() {
        let faq = entity("faqs");
        let predicates = vec![
            Predicate {
                column: "biz_id".into(),
                mode: MatchMode::Exact,
                value: json!(2),
            },
            Predicate {
                column: "member".into(),
                mode: MatchMode::Contains,
                value: json!("alice"),
            },
        ];
        let q = select_list(&faq, &predicates, 100, 0);
        assert!(q.sql.contains("\"biz_id\" = $1"));
        assert!(q.sql.contains("\"member\" LIKE $2"));
        assert!(q.sql.contains(" AND \"is_deleted\" = FALSE"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 100 OFFSET 0"));
        assert_eq!(q.params[1], json!("%alice%"));
    }

    #[test]
    fn select_list_without_filters_still_guards_soft_delete() {
        let versions = entity("versions");
        let q = select_list(&versions, &[], 50, 10);
        assert!(q.sql.contains("WHERE \"is_deleted\" = FALSE"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_omits_absent_columns_and_returns_row() {
        let versions = entity("versions");
        let body: HashMap<String, serde_json::Value> = [
            ("version".to_string(), json!("1.2.0")),
            ("title".to_string(), json!("release")),
            ("is_show".to_string(), json!(true)),
            ("author".to_string(), json!("ops")),
        ]
        .into();
        let q = insert(&versions, &body);
        // context omitted: DB default applies
        assert!(!q.sql.contains("\"context\""));
        assert!(q.sql.starts_with("INSERT INTO \"tab_version\""));
        assert!(q.sql.contains("RETURNING \"id\", \"is_show\""));
        assert_eq!(q.params.len(), 4);
    }

    #[test]
    fn insert_with_all_defaults_uses_default_values() {
        // Valid for faqs: every field has a default and none is required.
        let faq = entity("faqs");
        let q = insert(&faq, &HashMap::new());
        assert!(q.sql.starts_with("INSERT INTO \"tab_faq\" DEFAULT VALUES RETURNING \"id\""));
        assert!(!q.sql.contains("() VALUES ()"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_casts_json_list_fields() {
        let im = entity("im-types");
        let body: HashMap<String, serde_json::Value> =
            [("define".to_string(), json!(["a", "b"]))].into();
        let q = insert(&im, &body);
        assert!(q.sql.contains("$1::jsonb"));
    }

    #[test]
    fn update_sets_only_supplied_fields() {
        let faq = entity("faqs");
        let body: HashMap<String, serde_json::Value> =
            [("faq_name".to_string(), json!("X"))].into();
        let q = update(&faq, 7, &body);
        assert!(q.sql.contains("SET \"faq_name\" = $1, \"updated_at\" = NOW()"));
        assert!(q.sql.contains("WHERE \"id\" = $2 AND \"is_deleted\" = FALSE"));
        assert_eq!(q.params[1], json!(7));
    }

    #[test]
    fn update_ignores_undeclared_fields() {
        let tags = entity("plugin-tags");
        let body: HashMap<String, serde_json::Value> = [
            ("name".to_string(), json!("renamed")),
            ("id".to_string(), json!(99)),
            ("is_deleted".to_string(), json!(true)),
        ]
        .into();
        let q = update(&tags, 3, &body);
        assert!(q.sql.contains("\"name\" = $1"));
        assert!(!q.sql.contains("\"is_deleted\" = $"));
        assert!(!q.sql.contains("\"id\" = $1"));
    }

    #[test]
    fn soft_delete_is_guarded_and_returns_id() {
        let triggers = entity("triggers");
        let q = soft_delete(&triggers, 12);
        assert!(q.sql.starts_with("UPDATE \"tab_trigger\" SET \"is_deleted\" = TRUE"));
        assert!(q.sql.contains("AND \"is_deleted\" = FALSE"));
        assert!(q.sql.ends_with("RETURNING \"id\""));
    }

    #[test]
    fn get_or_create_lookup_matches_all_provided_fields() {
        let faq = entity("faqs");
        let body: HashMap<String, serde_json::Value> = [
            ("biz_id".to_string(), json!(1)),
            ("faq_name".to_string(), json!("X")),
        ]
        .into();
        let q = select_by_fields(&faq, &body);
        assert!(q.sql.contains("\"biz_id\" = $1"));
        assert!(q.sql.contains("\"faq_name\" = $2"));
        assert!(q.sql.ends_with("LIMIT 1"));
    }

    #[test]
    fn grouped_count_over_platform() {
        let im = entity("im-types");
        let q = grouped_count(&im, "platform");
        assert_eq!(
            q.sql,
            "SELECT \"platform\", COUNT(*) AS \"count\" FROM \"tab_im_type\" \
             WHERE \"is_deleted\" = FALSE GROUP BY \"platform\" ORDER BY \"platform\""
        );
    }
}
