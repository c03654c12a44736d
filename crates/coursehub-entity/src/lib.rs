//! # coursehub-entity
//!
//! Domain entity models for CourseHub. Every struct in this crate
//! represents a database table row or an input payload for one. Row
//! entities derive `sqlx::FromRow`.

pub mod course;
pub mod enrollment;
pub mod student;
