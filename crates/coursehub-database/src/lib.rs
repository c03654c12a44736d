//! # coursehub-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! consumes, and their Postgres repository implementations. The `memory`
//! feature adds an in-process implementation used by tests.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
#[cfg(feature = "memory")]
pub use memory::MemoryDatabase;
pub use repositories::{CourseRepository, EnrollmentRepository, StudentRepository};
pub use store::{CourseStore, CourseUpdate, EnrollWrite, EnrollmentStore, StudentStore};
