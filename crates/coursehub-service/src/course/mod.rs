//! Course administration.

pub mod service;

pub use service::CourseService;
