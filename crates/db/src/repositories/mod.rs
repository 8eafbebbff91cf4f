//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every status transition is a
//! guarded compare-and-set UPDATE, so concurrent tasks lose races cleanly
//! instead of clobbering each other.

pub mod flyer_repo;
pub mod idea_repo;
pub mod project_repo;

pub use flyer_repo::FlyerRepo;
pub use idea_repo::IdeaRepo;
pub use project_repo::ProjectRepo;
