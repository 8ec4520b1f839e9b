//! Generic CRUD execution against PostgreSQL.

use crate::error::AppError;
use crate::schema::{CreateMode, EntityDef};
use crate::sql::{
    grouped_count, insert, select_by_fields, select_count, select_list, soft_delete, update,
    PgBindValue, Predicate, QueryBuf,
};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

/// SQLSTATE for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

pub struct CrudService;

impl CrudService {
    /// List live rows matching the predicates, plus the total match count
    /// (ignoring pagination).
    pub async fn list(
        pool: &PgPool,
        entity: &EntityDef,
        predicates: &[Predicate],
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Value>, u64), AppError> {
        let q = select_list(entity, predicates, limit, offset);
        let rows = Self::query_many(pool, &q).await?;
        let qc = select_count(entity, predicates);
        let total = Self::query_count(pool, &qc).await?;
        Ok((rows, total))
    }

    /// Create per the entity's mode. Insert surfaces duplicate unique keys as
    /// a conflict; GetOrCreate returns the existing row for an identical
    /// lookup, with storage unique constraints resolving concurrent creates.
    pub async fn create(
        pool: &PgPool,
        entity: &EntityDef,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        match entity.create_mode {
            CreateMode::Insert => Self::insert_row(pool, entity, body).await,
            CreateMode::GetOrCreate => {
                let lookup = select_by_fields(entity, body);
                if let Some(row) = Self::query_one(pool, &lookup).await? {
                    return Ok(row);
                }
                match Self::insert_row(pool, entity, body).await {
                    Ok(row) => Ok(row),
                    // Lost an insert race; the winner's row is the result.
                    Err(AppError::Conflict(msg)) => {
                        let lookup = select_by_fields(entity, body);
                        Self::query_one(pool, &lookup)
                            .await?
                            .ok_or(AppError::Conflict(msg))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Partial update by primary key. None when the id matches no live row;
    /// callers decide whether that is an error (per contract it is not).
    pub async fn update(
        pool: &PgPool,
        entity: &EntityDef,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = update(entity, id, body);
        match Self::query_one(pool, &q).await {
            Ok(row) => Ok(row),
            Err(e) => Err(Self::map_unique_violation(entity, e)),
        }
    }

    /// Soft delete by primary key. Idempotent: returns whether a row was
    /// actually marked this time.
    pub async fn destroy(pool: &PgPool, entity: &EntityDef, id: i64) -> Result<bool, AppError> {
        let q = soft_delete(entity, id);
        Ok(Self::query_one(pool, &q).await?.is_some())
    }

    /// Grouped count of live rows over one column.
    pub async fn grouped_counts(
        pool: &PgPool,
        entity: &EntityDef,
        column: &str,
    ) -> Result<Vec<Value>, AppError> {
        let q = grouped_count(entity, column);
        Self::query_many(pool, &q).await
    }

    async fn insert_row(
        pool: &PgPool,
        entity: &EntityDef,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = insert(entity, body);
        match Self::query_one(pool, &q).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(AppError::Db(sqlx::Error::RowNotFound)),
            Err(e) => Err(Self::map_unique_violation(entity, e)),
        }
    }

    /// Unique-constraint violations are a client-visible conflict, not a 500.
    fn map_unique_violation(entity: &EntityDef, err: AppError) -> AppError {
        if let AppError::Db(sqlx::Error::Database(ref db)) = err {
            if is_unique_violation(db.code().as_deref()) {
                return AppError::Conflict(format!(
                    "{} with the same unique field already exists",
                    entity.display_name
                ));
            }
        }
        err
    }

    async fn query_one(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn query_count(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let n = query.fetch_one(pool).await?;
        Ok(n.max(0) as u64)
    }
}

fn is_unique_violation(code: Option<&str>) -> bool {
    code == Some(UNIQUE_VIOLATION)
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_sqlstate_is_recognized() {
        assert!(is_unique_violation(Some("23505")));
    }

    #[test]
    fn other_sqlstates_are_not_conflicts() {
        // Foreign-key violation and a missing code stay as database errors.
        assert!(!is_unique_violation(Some("23503")));
        assert!(!is_unique_violation(None));
    }
}
