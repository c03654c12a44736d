//! Course selection: the per-course locked select / cancel flow.

pub mod outcome;
pub mod service;

pub use outcome::{
    Operation, RejectionCategory, SelectionRejection, SelectionReply, SelectionSuccess, Stage,
};
pub use service::SelectionService;
