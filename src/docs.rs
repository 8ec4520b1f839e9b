//! Operation documentation as a lookup table, decoupled from the handlers
//! that implement the operations.

use crate::schema::EntityRegistry;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct OperationDoc {
    pub entity: String,
    pub action: &'static str,
    pub method: &'static str,
    pub path: String,
    pub summary: String,
}

/// Docs for every registered CRUD operation plus the standalone endpoints.
pub fn operation_docs(registry: &EntityRegistry) -> Vec<OperationDoc> {
    let mut docs = Vec::new();
    for entity in registry.entities() {
        let base = format!("/api/v1/{}", entity.path_segment);
        let crud: [(&'static str, &'static str, String, String); 4] = [
            (
                "list",
                "GET",
                base.clone(),
                format!("List {} records, filtered and paginated", entity.display_name),
            ),
            (
                "create",
                "POST",
                base.clone(),
                format!("Create a {} record", entity.display_name),
            ),
            (
                "update",
                "PATCH",
                format!("{}/{{id}}", base),
                format!("Partially update a {} record", entity.display_name),
            ),
            (
                "destroy",
                "DELETE",
                format!("{}/{{id}}", base),
                format!("Delete a {} record", entity.display_name),
            ),
        ];
        for (action, method, path, summary) in crud {
            docs.push(OperationDoc {
                entity: entity.path_segment.to_string(),
                action,
                method,
                path,
                summary,
            });
        }
    }
    docs.push(OperationDoc {
        entity: "im-types".into(),
        action: "platforms",
        method: "GET",
        path: "/api/v1/im-types/platforms".into(),
        summary: "Count im type records grouped by platform".into(),
    });
    docs.push(OperationDoc {
        entity: "utils".into(),
        action: "translate",
        method: "POST",
        path: "/api/v1/utils/translate".into(),
        summary: "Translate text via the cloud provider (falls back to the input)".into(),
    });
    docs.push(OperationDoc {
        entity: "utils".into(),
        action: "chat",
        method: "POST",
        path: "/api/v1/utils/chat".into(),
        summary: "Small-talk chat via the cloud provider".into(),
    });
    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entity_documents_all_four_operations() {
        let registry = EntityRegistry::builtin();
        let docs = operation_docs(&registry);
        for entity in registry.entities() {
            for action in ["list", "create", "update", "destroy"] {
                assert!(
                    docs.iter()
                        .any(|d| d.entity == entity.path_segment && d.action == action),
                    "{} missing {}",
                    entity.path_segment,
                    action
                );
            }
        }
    }

    #[test]
    fn standalone_endpoints_are_documented() {
        let docs = operation_docs(&EntityRegistry::builtin());
        assert!(docs.iter().any(|d| d.action == "platforms"));
        assert!(docs.iter().any(|d| d.action == "translate"));
        assert!(docs.iter().any(|d| d.action == "chat"));
    }
}
