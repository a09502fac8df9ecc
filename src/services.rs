pub mod pt_service;
pub use pt_service::PtService;
