//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the
//! database row plus the request/response DTOs for its handlers.

pub mod flyer;
pub mod idea;
pub mod project;
pub mod status;
