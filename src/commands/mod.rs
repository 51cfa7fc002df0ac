pub mod config;
pub mod read;
pub mod search;
pub mod serve;
