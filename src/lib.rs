// dexpreopt-config - boot image and classpath configuration for dexpreopting a device
//
// This is the library crate containing the derivation logic and data structures.
// The binary crate (main.rs) provides the command line entry point.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use crate::config::{BuildSettings, FileGlobalConfigLoader, GlobalConfigLoader};
pub use context::BuildContext;
pub use error::{DexpreoptError, Result};
pub use models::{ArchType, BootImageConfig, GlobalConfig, NativeBridge, OsType, Target};
pub use services::BootImageVariant;
pub use state::{OnceCache, OnceKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
