//! Translate query parameters into storage predicates via the per-entity
//! filter allow-list. Unknown parameters and unparsable values are ignored.

use crate::schema::{EntityDef, FieldType, MatchMode};
use crate::sql::Predicate;
use serde_json::Value;
use std::collections::HashMap;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

/// Parsed list-query: AND-combined predicates plus pagination.
#[derive(Clone, Debug)]
pub struct FilterSet {
    pub predicates: Vec<Predicate>,
    pub limit: u32,
    pub offset: u32,
}

impl FilterSet {
    /// Build from raw query parameters. `limit`/`offset` are reserved
    /// pagination keys; everything else goes through the allow-list.
    pub fn from_query(entity: &EntityDef, params: &HashMap<String, String>) -> Self {
        let mut set = FilterSet {
            predicates: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        };
        for (key, raw) in params {
            match key.as_str() {
                "limit" => {
                    if let Ok(n) = raw.parse::<u32>() {
                        set.limit = n.min(MAX_LIMIT);
                    }
                }
                "offset" => {
                    if let Ok(n) = raw.parse::<u32>() {
                        set.offset = n;
                    }
                }
                _ => {
                    let Some(filter) = entity.filter(key) else { continue };
                    if let Some(value) = coerce(entity, key, filter.mode, raw) {
                        set.predicates.push(Predicate {
                            column: key.clone(),
                            mode: filter.mode,
                            value,
                        });
                    }
                }
            }
        }
        set
    }

    pub fn has_filter(&self, column: &str) -> bool {
        self.predicates.iter().any(|p| p.column == column)
    }

    /// Tenant scoping: pin `biz_id` unless the caller already filtered by it.
    pub fn scope_to_biz(&mut self, biz_id: i64) {
        if !self.has_filter("biz_id") {
            self.predicates.push(Predicate {
                column: "biz_id".into(),
                mode: MatchMode::Exact,
                value: Value::Number(biz_id.into()),
            });
        }
    }
}

/// Coerce a raw query value to the column's type. None drops the filter.
fn coerce(entity: &EntityDef, column: &str, mode: MatchMode, raw: &str) -> Option<Value> {
    match mode {
        MatchMode::Boolean => parse_bool(raw).map(Value::Bool),
        MatchMode::Contains => Some(Value::String(raw.to_string())),
        MatchMode::Exact => match entity.field(column).map(|f| &f.field_type) {
            Some(FieldType::BigInt) => raw.parse::<i64>().ok().map(|n| Value::Number(n.into())),
            Some(FieldType::Bool) => parse_bool(raw).map(Value::Bool),
            // VarChar/Text declared fields and audit columns (e.g. created_by)
            _ => Some(Value::String(raw.to_string())),
        },
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityRegistry;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let registry = EntityRegistry::builtin();
        let versions = registry.entity_by_path("versions").unwrap();
        let set = FilterSet::from_query(versions, &query(&[("bogus", "x"), ("title", "rel")]));
        assert_eq!(set.predicates.len(), 1);
        assert_eq!(set.predicates[0].column, "title");
        assert_eq!(set.predicates[0].mode, MatchMode::Contains);
    }

    #[test]
    fn boolean_filter_accepts_true_false_and_digits() {
        let registry = EntityRegistry::builtin();
        let versions = registry.entity_by_path("versions").unwrap();
        for (raw, expected) in [("true", true), ("FALSE", false), ("1", true), ("0", false)] {
            let set = FilterSet::from_query(versions, &query(&[("is_show", raw)]));
            assert_eq!(set.predicates[0].value, json!(expected), "raw={}", raw);
        }
        let set = FilterSet::from_query(versions, &query(&[("is_show", "maybe")]));
        assert!(set.predicates.is_empty());
    }

    #[test]
    fn exact_bigint_filter_coerces_or_drops() {
        let registry = EntityRegistry::builtin();
        let faqs = registry.entity_by_path("faqs").unwrap();
        let set = FilterSet::from_query(faqs, &query(&[("biz_id", "42")]));
        assert_eq!(set.predicates[0].value, json!(42));
        let set = FilterSet::from_query(faqs, &query(&[("biz_id", "not-a-number")]));
        assert!(set.predicates.is_empty());
    }

    #[test]
    fn pagination_defaults_and_cap() {
        let registry = EntityRegistry::builtin();
        let faqs = registry.entity_by_path("faqs").unwrap();
        let set = FilterSet::from_query(faqs, &query(&[]));
        assert_eq!((set.limit, set.offset), (100, 0));
        let set = FilterSet::from_query(faqs, &query(&[("limit", "5000"), ("offset", "30")]));
        assert_eq!((set.limit, set.offset), (1000, 30));
    }

    #[test]
    fn scope_to_biz_respects_explicit_filter() {
        let registry = EntityRegistry::builtin();
        let faqs = registry.entity_by_path("faqs").unwrap();
        let mut set = FilterSet::from_query(faqs, &query(&[("biz_id", "7")]));
        set.scope_to_biz(99);
        let biz: Vec<_> = set.predicates.iter().filter(|p| p.column == "biz_id").collect();
        assert_eq!(biz.len(), 1);
        assert_eq!(biz[0].value, json!(7));

        let mut set = FilterSet::from_query(faqs, &query(&[]));
        set.scope_to_biz(99);
        assert_eq!(set.predicates[0].value, json!(99));
    }

    #[test]
    fn audit_column_filter_binds_as_text() {
        let registry = EntityRegistry::builtin();
        let faqs = registry.entity_by_path("faqs").unwrap();
        let set = FilterSet::from_query(faqs, &query(&[("created_by", "admin")]));
        assert_eq!(set.predicates[0].value, json!("admin"));
        assert_eq!(set.predicates[0].mode, MatchMode::Exact);
    }
}
