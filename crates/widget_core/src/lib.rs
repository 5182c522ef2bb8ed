pub mod config;
pub mod error;
pub mod model;
pub mod refresh;
pub mod render;
pub mod storage;
pub mod summary;
