//! Request/response serialization: inbound shape validation against the
//! entity definition, outbound canonical field ordering and type coercion.

use crate::error::{AppError, FieldErrors};
use crate::schema::{EntityDef, FieldDef, FieldFormat, FieldType, AUDIT_RESPONSE_FIELDS};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::OnceLock;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s]+$").expect("url regex"))
}

pub struct RequestSerializer;

impl RequestSerializer {
    /// Validate a create payload: object body, no unknown fields, required
    /// fields present, per-field type/length/format checks. Errors accumulate
    /// per field; nothing is written when any check fails.
    pub fn validate_create(
        entity: &EntityDef,
        body: Value,
    ) -> Result<HashMap<String, Value>, AppError> {
        let body = object_body(body)?;
        let mut errors = FieldErrors::new();
        reject_unknown(entity, &body, &mut errors);
        for field in &entity.fields {
            match body.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    errors.push(field.name, "is required");
                }
                None => {}
                Some(Value::Null) => errors.push(field.name, "may not be null"),
                Some(v) => check_field(field, v, &mut errors),
            }
        }
        if errors.is_empty() {
            Ok(body)
        } else {
            Err(AppError::Validation(errors))
        }
    }

    /// Validate a partial-update payload: only supplied fields are checked,
    /// required-ness is not enforced for absent fields.
    pub fn validate_partial(
        entity: &EntityDef,
        body: Value,
    ) -> Result<HashMap<String, Value>, AppError> {
        let body = object_body(body)?;
        let mut errors = FieldErrors::new();
        reject_unknown(entity, &body, &mut errors);
        for (name, v) in &body {
            let Some(field) = entity.field(name) else { continue };
            if v.is_null() {
                errors.push(name, "may not be null");
            } else {
                check_field(field, v, &mut errors);
            }
        }
        if errors.is_empty() {
            Ok(body)
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

fn object_body(body: Value) -> Result<HashMap<String, Value>, AppError> {
    match body {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

fn reject_unknown(entity: &EntityDef, body: &HashMap<String, Value>, errors: &mut FieldErrors) {
    for key in body.keys() {
        if entity.field(key).is_none() {
            errors.push(key, "unknown field");
        }
    }
}

fn check_field(field: &FieldDef, v: &Value, errors: &mut FieldErrors) {
    match &field.field_type {
        FieldType::Bool => {
            if !v.is_boolean() {
                errors.push(field.name, "must be a boolean");
            }
        }
        FieldType::BigInt => {
            if v.as_i64().is_none() {
                errors.push(field.name, "must be an integer");
            }
        }
        FieldType::VarChar(max) => match v.as_str() {
            Some(s) => {
                if s.chars().count() > *max as usize {
                    errors.push(field.name, format!("must be at most {} characters", max));
                } else {
                    check_format(field, s, errors);
                }
            }
            None => errors.push(field.name, "must be a string"),
        },
        FieldType::Text => {
            if v.as_str().is_none() {
                errors.push(field.name, "must be a string");
            }
        }
        FieldType::JsonList => {
            if !v.is_array() {
                errors.push(field.name, "must be a JSON array");
            }
        }
    }
}

fn check_format(field: &FieldDef, s: &str, errors: &mut FieldErrors) {
    match field.format {
        Some(FieldFormat::Url) => {
            // Empty string is the declared default, not a format violation.
            if !s.is_empty() && !url_regex().is_match(s) {
                errors.push(field.name, "must be a valid URL");
            }
        }
        None => {}
    }
}

pub struct ResponseSerializer;

impl ResponseSerializer {
    /// Canonical response shape: id first, declared fields in definition
    /// order, audit fields last. JsonList columns always come out as JSON
    /// arrays (legacy string-encoded values are re-parsed, null becomes []).
    pub fn shape(entity: &EntityDef, row: &Value) -> Value {
        let empty = Map::new();
        let src = row.as_object().unwrap_or(&empty);
        let mut out = Map::new();
        if let Some(id) = src.get("id") {
            out.insert("id".into(), id.clone());
        }
        for field in &entity.fields {
            let v = src.get(field.name).cloned().unwrap_or(Value::Null);
            let v = match field.field_type {
                FieldType::JsonList => coerce_json_list(v),
                _ => v,
            };
            out.insert(field.name.to_string(), v);
        }
        for name in AUDIT_RESPONSE_FIELDS {
            if let Some(v) = src.get(*name) {
                out.insert((*name).to_string(), v.clone());
            }
        }
        Value::Object(out)
    }

    pub fn shape_many(entity: &EntityDef, rows: &[Value]) -> Vec<Value> {
        rows.iter().map(|r| Self::shape(entity, r)).collect()
    }
}

fn coerce_json_list(v: Value) -> Value {
    match v {
        Value::Array(_) => v,
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(Value::Array(items)) => Value::Array(items),
            _ => Value::Array(Vec::new()),
        },
        _ => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityRegistry;
    use serde_json::json;

    fn entity(path: &str) -> EntityDef {
        EntityRegistry::builtin().entity_by_path(path).unwrap().clone()
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_requires_declared_fields() {
        let versions = entity("versions");
        let err = RequestSerializer::validate_create(&versions, json!({"title": "r1"}))
            .unwrap_err();
        let errors = field_errors(err);
        assert!(errors.0.contains_key("version"));
        assert!(errors.0.contains_key("is_show"));
        assert!(errors.0.contains_key("author"));
        assert!(!errors.0.contains_key("context"));
    }

    #[test]
    fn create_rejects_unknown_and_audit_fields() {
        let tags = entity("plugin-tags");
        let err = RequestSerializer::validate_create(
            &tags,
            json!({"key": "k", "name": "n", "color": "red", "created_by": "me"}),
        )
        .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.0["color"], vec!["unknown field"]);
        assert_eq!(errors.0["created_by"], vec!["unknown field"]);
    }

    #[test]
    fn create_checks_types_and_lengths() {
        let tags = entity("plugin-tags");
        let long_key = "k".repeat(65);
        let err = RequestSerializer::validate_create(
            &tags,
            json!({"key": long_key, "name": 5}),
        )
        .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.0["key"], vec!["must be at most 64 characters"]);
        assert_eq!(errors.0["name"], vec!["must be a string"]);
    }

    #[test]
    fn create_validates_url_format_but_allows_empty() {
        let faqs = entity("faqs");
        assert!(RequestSerializer::validate_create(&faqs, json!({"remote_url": ""})).is_ok());
        assert!(
            RequestSerializer::validate_create(&faqs, json!({"remote_url": "https://x.example/d"}))
                .is_ok()
        );
        let err =
            RequestSerializer::validate_create(&faqs, json!({"remote_url": "ftp://x"})).unwrap_err();
        assert!(field_errors(err).0.contains_key("remote_url"));
    }

    #[test]
    fn partial_update_skips_absent_required_fields() {
        let versions = entity("versions");
        let body = RequestSerializer::validate_partial(&versions, json!({"title": "new"})).unwrap();
        assert_eq!(body["title"], json!("new"));
        let err = RequestSerializer::validate_partial(&versions, json!({"title": null})).unwrap_err();
        assert_eq!(field_errors(err).0["title"], vec!["may not be null"]);
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        let versions = entity("versions");
        let err = RequestSerializer::validate_create(&versions, json!([1, 2])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn response_shape_orders_fields_and_strips_soft_delete() {
        let versions = entity("versions");
        let row = json!({
            "author": "ops",
            "id": 3,
            "is_deleted": false,
            "is_show": true,
            "version": "1.0.0",
            "title": "first",
            "context": ["a"],
            "created_by": "admin",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_by": "",
            "updated_at": "2024-01-01T00:00:00Z"
        });
        let shaped = ResponseSerializer::shape(&versions, &row);
        let keys: Vec<&str> = shaped.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "id", "is_show", "version", "title", "context", "author",
                "created_by", "created_at", "updated_by", "updated_at"
            ]
        );
        assert!(shaped.get("is_deleted").is_none());
    }

    #[test]
    fn response_shape_coerces_json_list_fields() {
        let im = entity("im-types");
        let row = json!({"id": 1, "platform": "slack", "define": "[\"x\"]"});
        let shaped = ResponseSerializer::shape(&im, &row);
        assert_eq!(shaped["define"], json!(["x"]));

        let row = json!({"id": 2, "platform": "slack", "define": null});
        let shaped = ResponseSerializer::shape(&im, &row);
        assert_eq!(shaped["define"], json!([]));

        let row = json!({"id": 3, "platform": "slack", "define": "not json"});
        let shaped = ResponseSerializer::shape(&im, &row);
        assert_eq!(shaped["define"], json!([]));
    }

    #[test]
    fn round_trip_preserves_significant_fields() {
        let faqs = entity("faqs");
        let body = json!({
            "biz_id": 5,
            "faq_name": "kb",
            "member": "alice,bob",
            "remote_url": "https://kb.example/x"
        });
        let validated = RequestSerializer::validate_create(&faqs, body.clone()).unwrap();
        let mut row = serde_json::Map::new();
        row.insert("id".into(), json!(1));
        for (k, v) in &validated {
            row.insert(k.clone(), v.clone());
        }
        let shaped = ResponseSerializer::shape(&faqs, &Value::Object(row));
        for (k, v) in body.as_object().unwrap() {
            assert_eq!(&shaped[k], v, "field {}", k);
        }
    }
}
