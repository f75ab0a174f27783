//! Data models for dexpreopt configuration.
//!
//! - [`GlobalConfig`]: the product's global dexpreopt config, the read-only input to every derivation
//! - [`Target`]: a build target (OS, architecture, native bridge flag) from the build settings
//! - [`BootImageConfig`]: one derived boot image variant, immutable once built
//!
//! # Architecture Note
//!
//! Input models derive `Serialize`/`Deserialize` so they can be read from YAML or JSON files.
//! Derived models are only constructed by [`crate::services`] and are handed out behind `Arc`.

pub mod boot_image;
pub mod global_config;
pub mod target;

pub use boot_image::{BootImageConfig, STEM_OVERRIDES, stem_of};
pub use global_config::GlobalConfig;
pub use target::{ArchType, NativeBridge, OsType, Target};
