//! Services module - derivation of dexpreopt configuration for a build context.
//!
//! Every derivation takes a [`BuildContext`](crate::context::BuildContext) and caches its
//! result in the context, so all consumers of one build observe the same values.
//!
//! # Components
//!
//! - [`global_config`]: resolves the global dexpreopt config (file, test injection or default)
//! - [`apex_jar`]: parses `<apex>:<jar>` values
//! - [`targets`]: filters the build targets down to those that are dexpreopted
//! - [`boot_image`]: derives the boot image variants (`default`, `apex`, `art`)
//! - [`classpath`]: system server classpath and device boot classpath
//! - [`make_vars`]: flattens the classpaths into make variables
//!
//! # Resolution Order
//!
//! ```text
//! make_vars ─┬─> classpath::default_bootclasspath ─┬─> boot_image ─┬─> global_config
//!            │                                     │               └─> targets
//!            │                                     └─> global_config
//!            └─> classpath::system_server_classpath ─> global_config + apex_jar
//! ```
//!
//! A failure anywhere propagates to the caller unchanged. There is no partial result.

pub mod apex_jar;
pub mod boot_image;
pub mod classpath;
pub mod global_config;
pub mod lists;
pub mod make_vars;
pub mod targets;

pub use apex_jar::split_apex_jar_pair;
pub use boot_image::{
    BootImageProfile, BootImageVariant, apex_boot_image_config, art_boot_image_config,
    boot_image_config, default_boot_image_config, get_boot_image_config,
};
pub use classpath::{default_bootclasspath, system_server_classpath};
pub use global_config::{
    GlobalConfigSource, ResolvedGlobalConfig, dexpreopt_global_config,
    select_global_config_source, set_dexpreopt_test_global_config,
};
pub use lists::remove_list_from_list;
pub use make_vars::{MakeVarsContext, collect_make_vars, dexpreopt_config_make_vars};
pub use targets::dexpreopt_targets;
