//! DDL from entity definitions. Uniqueness lives in the database, not only
//! in request validation.

use crate::error::AppError;
use crate::schema::{EntityDef, EntityRegistry, AUDIT_FIELDS};
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// CREATE TABLE IF NOT EXISTS for one entity: implicit bigserial id, declared
/// columns, per-field UNIQUE constraints, composed audit columns.
pub fn create_table_sql(entity: &EntityDef) -> String {
    let mut defs: Vec<String> = vec![format!("{} BIGSERIAL PRIMARY KEY", quote("id"))];
    for f in &entity.fields {
        let mut def = format!("{} {} NOT NULL", quote(f.name), f.field_type.pg_type());
        if let Some(literal) = f.default {
            def.push_str(" DEFAULT ");
            def.push_str(literal);
        }
        defs.push(def);
    }
    for (name, def_suffix) in AUDIT_FIELDS {
        defs.push(format!("{} {}", quote(name), def_suffix));
    }
    for f in entity.unique_fields() {
        defs.push(format!("UNIQUE ({})", quote(f.name)));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quote(entity.table_name),
        defs.join(",\n  ")
    )
}

/// Create every registered entity's table. Idempotent.
pub async fn apply_migrations(pool: &PgPool, registry: &EntityRegistry) -> Result<(), AppError> {
    for entity in registry.entities() {
        let sql = create_table_sql(entity);
        tracing::debug!(table = entity.table_name, "migrate");
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_table_ddl_enforces_uniqueness_and_audit() {
        let registry = EntityRegistry::builtin();
        let sql = create_table_sql(registry.entity_by_path("versions").unwrap());
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"tab_version\""));
        assert!(sql.contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert!(sql.contains("\"version\" varchar(255) NOT NULL"));
        assert!(sql.contains("UNIQUE (\"version\")"));
        assert!(sql.contains("\"context\" jsonb NOT NULL DEFAULT '[]'::jsonb"));
        assert!(sql.contains("\"is_deleted\" boolean NOT NULL DEFAULT FALSE"));
        assert!(sql.contains("\"created_by\" varchar(128) NOT NULL DEFAULT ''"));
    }

    #[test]
    fn plugin_tag_ddl_has_two_unique_constraints() {
        let registry = EntityRegistry::builtin();
        let sql = create_table_sql(registry.entity_by_path("plugin-tags").unwrap());
        assert!(sql.contains("UNIQUE (\"key\")"));
        assert!(sql.contains("UNIQUE (\"name\")"));
    }

    #[test]
    fn faq_ddl_defaults_biz_id_to_zero() {
        let registry = EntityRegistry::builtin();
        let sql = create_table_sql(registry.entity_by_path("faqs").unwrap());
        assert!(sql.contains("\"biz_id\" bigint NOT NULL DEFAULT 0"));
        assert!(!sql.contains("UNIQUE"), "faq declares no unique fields");
    }
}
