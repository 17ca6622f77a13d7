#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod models;
pub mod queries;
pub mod report;
pub mod sqlite;
pub mod utils;

pub use cli::app::Cli;
