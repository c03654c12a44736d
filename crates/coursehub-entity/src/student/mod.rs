//! Student domain entities.

pub mod model;

pub use model::{CreateStudent, Student, UpdateStudent};
