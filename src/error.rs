use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while resolving dexpreopt configuration.
///
/// Every variant describes bad static input or caller misuse. None of them is
/// transient, so callers propagate them to the top of the build rather than
/// retrying.
#[derive(Error, Debug)]
pub enum DexpreoptError {
    #[error("malformed apexJarValue: {0:?}, expected format: <apex>:<jar>")]
    MalformedApexJarPair(String),

    #[error("Failed to read dexpreopt global config {path}: {source}")]
    GlobalConfigRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dexpreopt global config {path}: {source}")]
    GlobalConfigParse {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("module {module:?} is listed more than once in {list}")]
    DuplicateModule { list: &'static str, module: String },

    #[error("Invalid dexpreopt global config: {0}")]
    InvalidGlobalConfig(Box<DexpreoptError>),

    #[error("test global config must be set before the global config is first resolved")]
    TestConfigAfterResolution,

    #[error("once slot {0} already holds a value")]
    AlreadyResolved(&'static str),

    #[error("Build settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, DexpreoptError>;
