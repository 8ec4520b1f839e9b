//! Bot console: declarative-entity CRUD backend for a chat-ops admin console.

pub mod cloud;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod response;
pub mod routes;
pub mod schema;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;

pub use cloud::{CloudClient, CloudSettings};
pub use error::{AppError, FieldErrors};
pub use migration::apply_migrations;
pub use response::{success_many, success_one};
pub use routes::{common_routes, entity_routes};
pub use schema::{EntityDef, EntityRegistry};
pub use service::{CrudService, FilterSet, RequestSerializer, ResponseSerializer};
pub use settings::Settings;
pub use state::AppState;
