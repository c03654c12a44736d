//! Stock counter maintenance.

pub mod service;

pub use service::StockService;
