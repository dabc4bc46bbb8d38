pub mod config;
pub mod error;
pub mod service;
pub mod storage;

pub use service::CatalogService;
