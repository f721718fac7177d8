pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod models;
pub mod repository;
pub mod schema;
pub mod slug;
pub mod upload;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
