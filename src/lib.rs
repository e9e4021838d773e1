pub mod common;
pub mod config;
pub mod definition;
pub mod error;
pub mod export;
pub mod graphics;
pub mod manager;
pub mod persist;
pub mod properties;
pub mod resources;
pub mod tile;

pub use error::{Result, SpecialError};
pub use manager::{LoadSource, SpecialManager};
