pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod leads;
pub mod models;
pub mod store;
pub mod workflow;

pub use db::Database;
pub use error::{LeadError, Result};
pub use store::{LeadStore, MemoryStore};
