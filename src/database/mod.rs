pub mod manager;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod query_builder;
pub mod repository;
pub mod store;
pub mod tenant_guard;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use repository::{changes_of, Entity, Repository};
pub use store::{Collection, DocumentStore};
pub use tenant_guard::Scoped;
