//! Student administration.

pub mod service;

pub use service::StudentService;
