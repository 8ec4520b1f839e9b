//! Built-in entity set for the console, resolved by path segment.

use crate::schema::types::{
    CreateMode, EntityDef, FieldDef, FieldFormat, FieldType, FilterDef,
};
use std::collections::HashMap;

/// Owns all registered entities; shared read-only behind Arc in AppState.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    entities: Vec<EntityDef>,
    by_path: HashMap<&'static str, usize>,
}

impl EntityRegistry {
    pub fn new(entities: Vec<EntityDef>) -> Self {
        let by_path = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.path_segment, i))
            .collect();
        EntityRegistry { entities, by_path }
    }

    /// The console's built-in entities.
    pub fn builtin() -> Self {
        EntityRegistry::new(vec![
            version_entity(),
            plugin_tag_entity(),
            faq_entity(),
            im_type_entity(),
            trigger_entity(),
        ])
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&EntityDef> {
        self.by_path.get(path).map(|&i| &self.entities[i])
    }

    pub fn entities(&self) -> &[EntityDef] {
        &self.entities
    }
}

/// Release notes shown in the console.
fn version_entity() -> EntityDef {
    EntityDef {
        path_segment: "versions",
        table_name: "tab_version",
        display_name: "version",
        fields: vec![
            FieldDef::new("is_show", FieldType::Bool).required(),
            FieldDef::new("version", FieldType::VarChar(255)).required().unique(),
            FieldDef::new("title", FieldType::VarChar(255)).required(),
            FieldDef::new("context", FieldType::JsonList).default_sql("'[]'::jsonb"),
            FieldDef::new("author", FieldType::VarChar(128)).required(),
        ],
        filters: vec![
            FilterDef::boolean("is_show"),
            FilterDef::contains("version"),
            FilterDef::contains("title"),
            FilterDef::contains("author"),
        ],
        create_mode: CreateMode::Insert,
        biz_scoped: false,
    }
}

fn plugin_tag_entity() -> EntityDef {
    EntityDef {
        path_segment: "plugin-tags",
        table_name: "tab_plugin_tag",
        display_name: "plugin tag",
        fields: vec![
            FieldDef::new("key", FieldType::VarChar(64)).required().unique(),
            FieldDef::new("name", FieldType::VarChar(128)).required().unique(),
        ],
        filters: vec![FilterDef::contains("key"), FilterDef::contains("name")],
        create_mode: CreateMode::Insert,
        biz_scoped: false,
    }
}

/// Knowledge bases, scoped to a business unit. Creation is get-or-create so
/// re-registering an existing FAQ source does not duplicate it.
fn faq_entity() -> EntityDef {
    EntityDef {
        path_segment: "faqs",
        table_name: "tab_faq",
        display_name: "faq",
        fields: vec![
            FieldDef::new("biz_id", FieldType::BigInt).default_sql("0"),
            FieldDef::new("biz_name", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("faq_name", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("faq_db", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("faq_collection", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("num", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("member", FieldType::Text).default_sql("''"),
            FieldDef::new("remote_url", FieldType::VarChar(1024))
                .default_sql("''")
                .format(FieldFormat::Url),
        ],
        filters: vec![
            FilterDef::exact("biz_id"),
            FilterDef::exact("faq_name"),
            FilterDef::exact("faq_db"),
            FilterDef::exact("num"),
            FilterDef::contains("member"),
            FilterDef::exact("created_by"),
        ],
        create_mode: CreateMode::GetOrCreate,
        biz_scoped: true,
    }
}

fn im_type_entity() -> EntityDef {
    EntityDef {
        path_segment: "im-types",
        table_name: "tab_im_type",
        display_name: "im type",
        fields: vec![
            FieldDef::new("platform", FieldType::VarChar(256)).required(),
            // Stable id handed to IM integrations; im_type is the label shown to users.
            FieldDef::new("im_type_id", FieldType::VarChar(56)).required(),
            FieldDef::new("im_type", FieldType::VarChar(256)).required(),
            FieldDef::new("alias", FieldType::VarChar(256)).required(),
            FieldDef::new("define", FieldType::JsonList).default_sql("'[]'::jsonb"),
        ],
        filters: vec![FilterDef::contains("platform"), FilterDef::contains("im_type")],
        create_mode: CreateMode::Insert,
        biz_scoped: false,
    }
}

fn trigger_entity() -> EntityDef {
    EntityDef {
        path_segment: "triggers",
        table_name: "tab_trigger",
        display_name: "trigger",
        fields: vec![
            FieldDef::new("biz_id", FieldType::BigInt).default_sql("0"),
            FieldDef::new("name", FieldType::VarChar(128)).required(),
            FieldDef::new("trigger_key", FieldType::VarChar(64)).required().unique(),
            FieldDef::new("im_type_id", FieldType::VarChar(56)).default_sql("''"),
            FieldDef::new("operator", FieldType::VarChar(128)).default_sql("''"),
            FieldDef::new("info", FieldType::JsonList).default_sql("'[]'::jsonb"),
        ],
        filters: vec![
            FilterDef::exact("biz_id"),
            FilterDef::contains("name"),
            FilterDef::exact("trigger_key"),
            FilterDef::exact("im_type_id"),
        ],
        create_mode: CreateMode::Insert,
        biz_scoped: true,
    }
}
