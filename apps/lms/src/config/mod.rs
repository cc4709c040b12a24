pub mod competition;

pub use db_infra::config::db;
