//! Domain types shared across the engine: the entity registry, audit log
//! entries, and soft-deletion markers.

mod audit_log;
mod deleted_record;
mod entity;

pub use audit_log::*;
pub use deleted_record::*;
pub use entity::*;
