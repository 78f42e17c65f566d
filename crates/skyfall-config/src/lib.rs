//! Configuration schema and storage for SkyFall.
//!
//! The schema lives in [`schema`]; [`ConfigStore`] owns the file on disk
//! and hands out a [`ConfigHandle`] that features read their predicates
//! from.

pub mod error;
pub mod handle;
pub mod path;
pub mod schema;
pub mod store;

pub use error::ConfigError;
pub use handle::ConfigHandle;
pub use schema::{DevConfig, HudConfig, HudElementConfig, InventoryConfig, PetMenuConfig, SkyfallConfig};
pub use store::{config_dir, ConfigStore};
