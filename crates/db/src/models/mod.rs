//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) where the entity is
//!   patchable
//!
//! Wire-facing serialization is camelCase throughout.

pub mod invitation;
pub mod request;
pub mod request_log;
pub mod save_offer;
pub mod tenant;
pub mod user;
