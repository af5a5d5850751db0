pub mod cache;
pub mod config;
pub mod context;
pub mod geometry;
pub mod mode;
