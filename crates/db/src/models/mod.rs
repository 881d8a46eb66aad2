//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod audio;
pub mod cliente;
pub mod dashboard;
pub mod diary;
pub mod group;
pub mod pricing_plan;
pub mod session;
pub mod user;
