//! HTTP handlers for entity CRUD, cloud utilities, and docs.

pub mod cloud;
pub mod docs;
pub mod entity;
