pub mod pt_repo;
pub use pt_repo::PtRepository;
