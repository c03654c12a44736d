//! Enrollment (student ↔ course) entities.

pub mod model;

pub use model::Enrollment;
