pub mod config;
pub mod error;
pub mod reader;
pub mod search;
