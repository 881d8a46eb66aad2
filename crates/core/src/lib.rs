//! Domain logic for the Serene wellness backend.
//!
//! Everything in this crate is pure (no I/O) so it can be shared by the
//! repository layer, the HTTP layer and tests.

pub mod audio;
pub mod billing;
pub mod diary;
pub mod error;
pub mod hashing;
pub mod media;
pub mod pagination;
pub mod plans;
pub mod profile;
pub mod roles;
pub mod types;
