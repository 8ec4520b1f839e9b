//! CrudService, filter translation, and request/response serializers.

mod crud;
mod filter;
mod serializer;
pub use crud::CrudService;
pub use filter::FilterSet;
pub use serializer::{RequestSerializer, ResponseSerializer};
