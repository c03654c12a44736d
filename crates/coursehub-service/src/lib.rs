//! # coursehub-service
//!
//! Business logic service layer for CourseHub. [`SelectionService`] runs
//! the select / cancel state machine over the course lock, the stock
//! counter and the durable store. The remaining services cover course,
//! student and stock administration.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references or cheap clones.

pub mod course;
pub mod selection;
pub mod stock;
pub mod student;

pub use course::CourseService;
pub use selection::{
    Operation, RejectionCategory, SelectionRejection, SelectionReply, SelectionService,
    SelectionSuccess, Stage,
};
pub use stock::StockService;
pub use student::StudentService;
