use crate::error::{DexpreoptError, Result};
use crate::services::apex_jar::split_apex_jar_pair;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Global dexpreopt configuration written by the product build.
///
/// Module lists are kept in declaration order; that order defines classpath order on device.
/// Keys match the file the build system writes (`ArtApexJars`, `BootJars`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GlobalConfig {
    /// Disable dexpreopt entirely
    pub disable_preopt: bool,

    /// Disable boot image profile generation
    pub disable_generate_profile: bool,

    /// Jars shipped in the ART apex
    pub art_apex_jars: Vec<String>,

    /// Full boot classpath module list, including ART modules
    pub boot_jars: Vec<String>,

    /// Boot jars updatable by the product, excluded from the boot image
    pub product_updatable_boot_modules: Vec<String>,

    /// On-device locations of the product updatable boot jars
    pub product_updatable_boot_locations: Vec<String>,

    /// System server jars installed in /system/framework
    pub system_server_jars: Vec<String>,

    /// System server jars shipped in apexes, as `<apex>:<jar>`
    pub updatable_system_server_jars: Vec<String>,
}

impl GlobalConfig {
    /// Config used when no global config file is configured: preopting and profile
    /// generation are both disabled.
    pub fn disabled() -> Self {
        Self {
            disable_preopt: true,
            disable_generate_profile: true,
            ..Self::default()
        }
    }

    /// Check that every updatable system server entry is a well-formed apex:jar pair and that
    /// no boot image input lists a module twice.
    pub fn validate(&self) -> Result<()> {
        for value in &self.updatable_system_server_jars {
            split_apex_jar_pair(value)
                .map_err(|e| DexpreoptError::InvalidGlobalConfig(Box::new(e)))?;
        }

        check_unique("ArtApexJars", &self.art_apex_jars)?;
        check_unique("BootJars", &self.boot_jars)?;
        Ok(())
    }
}

fn check_unique(list: &'static str, modules: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    match modules.iter().find(|m| !seen.insert(m.as_str())) {
        Some(module) => Err(DexpreoptError::InvalidGlobalConfig(Box::new(
            DexpreoptError::DuplicateModule {
                list,
                module: module.clone(),
            },
        ))),
        None => Ok(()),
    }
}
