//! Resolution of the global dexpreopt config for a build context.
//!
//! The config is resolved once per context from one of three sources, chosen by
//! [`select_global_config_source`]:
//!
//! 1. The file named by the build settings, if any
//! 2. A config injected with [`set_dexpreopt_test_global_config`]
//! 3. A default config with preopting and profile generation disabled
//!
//! Injection only works before the first resolution. Once the default has been synthesized
//! the injection slot is filled and later injection fails.

use crate::context::BuildContext;
use crate::error::{DexpreoptError, Result};
use crate::models::GlobalConfig;
use crate::state::OnceKey;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

/// Where a resolved global config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalConfigSource {
    File(Utf8PathBuf),
    TestInjected,
    Default,
}

/// Global config together with the raw file bytes it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGlobalConfig {
    pub config: GlobalConfig,
    pub raw: Option<Vec<u8>>,
    pub source: GlobalConfigSource,
}

impl std::ops::Deref for ResolvedGlobalConfig {
    type Target = GlobalConfig;

    fn deref(&self) -> &GlobalConfig {
        &self.config
    }
}

const GLOBAL_CONFIG_KEY: OnceKey<ResolvedGlobalConfig> = OnceKey::new("DexpreoptGlobalConfig");
const TEST_GLOBAL_CONFIG_KEY: OnceKey<ResolvedGlobalConfig> =
    OnceKey::new("TestDexpreoptGlobalConfig");

/// Choose the global config source.
pub fn select_global_config_source(file: Option<&Utf8Path>, injected: bool) -> GlobalConfigSource {
    match file {
        Some(path) => GlobalConfigSource::File(path.to_path_buf()),
        None if injected => GlobalConfigSource::TestInjected,
        None => GlobalConfigSource::Default,
    }
}

/// Return the global dexpreopt config for `ctx`, resolving it on first use.
///
/// # Errors
/// Fails if the configured file cannot be read, parsed or validated. Nothing is cached on
/// failure.
pub fn dexpreopt_global_config(ctx: &BuildContext) -> Result<Arc<ResolvedGlobalConfig>> {
    ctx.try_once(GLOBAL_CONFIG_KEY, || {
        let injected = ctx.cache().contains(TEST_GLOBAL_CONFIG_KEY);
        let resolved = match select_global_config_source(ctx.global_config_path(), injected) {
            GlobalConfigSource::File(path) => {
                ctx.add_input_dependency(path.clone());
                let (config, raw) = ctx.loader().load(&path)?;
                config.validate()?;
                ResolvedGlobalConfig {
                    config,
                    raw: Some(raw),
                    source: GlobalConfigSource::File(path),
                }
            }
            GlobalConfigSource::TestInjected | GlobalConfigSource::Default => {
                let fallback = ctx.once(TEST_GLOBAL_CONFIG_KEY, || {
                    tracing::warn!("No dexpreopt global config set, dexpreopt is disabled");
                    ResolvedGlobalConfig {
                        config: GlobalConfig::disabled(),
                        raw: None,
                        source: GlobalConfigSource::Default,
                    }
                });
                ResolvedGlobalConfig::clone(&fallback)
            }
        };

        ctx.metrics().record_global_config_resolved();
        tracing::info!(
            "Resolved dexpreopt global config from {:?}: {} boot jars, {} ART jars, preopt {}",
            resolved.source,
            resolved.boot_jars.len(),
            resolved.art_apex_jars.len(),
            if resolved.disable_preopt { "disabled" } else { "enabled" }
        );
        Ok(resolved)
    })
}

/// Inject the global config `ctx` will resolve to when no config file is set.
///
/// # Errors
/// - [`DexpreoptError::TestConfigAfterResolution`] if the global config was already resolved
///   or a config was already injected
/// - [`DexpreoptError::InvalidGlobalConfig`] if `config` fails validation
pub fn set_dexpreopt_test_global_config(ctx: &BuildContext, config: GlobalConfig) -> Result<()> {
    if ctx.cache().contains(GLOBAL_CONFIG_KEY) {
        return Err(DexpreoptError::TestConfigAfterResolution);
    }
    config.validate()?;

    let resolved = ResolvedGlobalConfig {
        config,
        raw: None,
        source: GlobalConfigSource::TestInjected,
    };
    ctx.cache()
        .try_insert(TEST_GLOBAL_CONFIG_KEY, resolved)
        .map(|_| ())
        .map_err(|_| DexpreoptError::TestConfigAfterResolution)
}
