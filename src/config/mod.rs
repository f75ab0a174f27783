use crate::error::{DexpreoptError, Result};
use crate::models::{GlobalConfig, Target};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// Environment variable prefix for build settings overrides.
///
/// The prefix and its separator are stripped, so `DEXPREOPT_DEVICE_NAME`, `DEXPREOPT_OUT_DIR` and
/// `DEXPREOPT_GLOBAL_CONFIG` set `device_name`, `out_dir` and `global_config`.
pub const ENV_PREFIX: &str = "DEXPREOPT";

/// Inputs describing one build configuration.
///
/// Loaded in three layers, later layers winning:
/// - Built-in defaults (`device_name = "generic"`, `out_dir = "out"`)
/// - An optional YAML settings file
/// - `DEXPREOPT_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildSettings {
    /// Product device name, the first segment of every output path
    pub device_name: String,

    /// Root of the build output tree
    pub out_dir: Utf8PathBuf,

    /// Path of the global dexpreopt config file, if the product provides one
    #[serde(default)]
    pub global_config: Option<Utf8PathBuf>,

    /// Configured build targets
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl BuildSettings {
    pub fn new(device_name: impl Into<String>, out_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            device_name: device_name.into(),
            out_dir: out_dir.into(),
            global_config: None,
            targets: Vec::new(),
        }
    }

    pub fn with_global_config(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.global_config = Some(path.into());
        self
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    /// Load build settings from defaults, an optional settings file and the environment.
    ///
    /// # Errors
    /// Returns an error if the settings file is missing or malformed, or if the merged
    /// settings do not deserialize.
    pub fn load(settings_file: Option<&Utf8Path>) -> Result<Self> {
        Self::load_with_env(settings_file, None)
    }

    /// Load build settings reading `DEXPREOPT_*` variables from `env` instead of the process
    /// environment when it is given.
    fn load_with_env(
        settings_file: Option<&Utf8Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("device_name", "generic")?
            .set_default("out_dir", "out")?;

        if let Some(path) = settings_file {
            tracing::info!("Loading build settings from {}", path);
            builder = builder
                .add_source(config::File::new(path.as_str(), config::FileFormat::Yaml).required(true));
        }

        let settings: BuildSettings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
            .build()?
            .try_deserialize()?;

        tracing::debug!(
            "Build settings: device={}, out_dir={}, targets={}",
            settings.device_name,
            settings.out_dir,
            settings.targets.len()
        );
        Ok(settings)
    }
}

/// Loads the global dexpreopt config file.
///
/// Returns the parsed config together with the raw file bytes.
#[cfg_attr(test, mockall::automock)]
pub trait GlobalConfigLoader: Send + Sync {
    fn load(&self, path: &Utf8Path) -> Result<(GlobalConfig, Vec<u8>)>;
}

/// Reads the global config from the filesystem.
///
/// The build system writes the file as JSON; it is parsed as YAML, which accepts it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileGlobalConfigLoader;

impl GlobalConfigLoader for FileGlobalConfigLoader {
    fn load(&self, path: &Utf8Path) -> Result<(GlobalConfig, Vec<u8>)> {
        let data = fs::read(path).map_err(|source| DexpreoptError::GlobalConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: GlobalConfig =
            serde_yaml_ng::from_slice(&data).map_err(|source| DexpreoptError::GlobalConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::info!("Loaded dexpreopt global config from {}", path);
        Ok((config, data))
    }
}
