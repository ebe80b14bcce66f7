pub mod config;
pub mod info;
pub mod recognize;
