use crate::config::{BuildSettings, FileGlobalConfigLoader, GlobalConfigLoader};
use crate::metrics::Metrics;
use crate::models::Target;
use crate::state::{OnceCache, OnceKey};
use camino::{Utf8Path, Utf8PathBuf};
use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};

/// One build configuration and everything derived from it.
///
/// The context owns the [`OnceCache`] that stores derived values, so their lifetime is the
/// context's lifetime. Share it across threads behind an `Arc`.
pub struct BuildContext {
    settings: BuildSettings,
    loader: Arc<dyn GlobalConfigLoader>,
    cache: OnceCache,
    input_dependencies: Mutex<Vec<Utf8PathBuf>>,
    metrics: Arc<Metrics>,
}

impl BuildContext {
    /// Create a context that reads the global config from the filesystem
    pub fn new(settings: BuildSettings) -> Self {
        Self::with_loader(settings, Arc::new(FileGlobalConfigLoader))
    }

    pub fn with_loader(settings: BuildSettings, loader: Arc<dyn GlobalConfigLoader>) -> Self {
        let metrics = Arc::new(Metrics::new());
        Self {
            settings,
            loader,
            cache: OnceCache::new(Arc::clone(&metrics)),
            input_dependencies: Mutex::new(Vec::new()),
            metrics,
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn device_name(&self) -> &str {
        &self.settings.device_name
    }

    /// All configured targets, unfiltered
    pub fn targets(&self) -> &[Target] {
        &self.settings.targets
    }

    pub fn global_config_path(&self) -> Option<&Utf8Path> {
        self.settings.global_config.as_deref()
    }

    pub fn loader(&self) -> &dyn GlobalConfigLoader {
        self.loader.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn cache(&self) -> &OnceCache {
        &self.cache
    }

    /// Path under the output directory built from `segments`
    pub fn path_for_output<I, S>(&self, segments: I) -> Utf8PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = self.settings.out_dir.clone();
        for segment in segments {
            path.push(segment.as_ref());
        }
        path
    }

    /// Compute a value at most once for this context
    pub fn once<T, F>(&self, key: OnceKey<T>, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.cache.once(key, factory)
    }

    /// Fallible variant of [`once`](Self::once); a failed computation is not cached
    pub fn try_once<T, E, F>(&self, key: OnceKey<T>, factory: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, E>,
    {
        self.cache.try_once(key, factory)
    }

    /// Record a file the derived configuration depends on
    pub fn add_input_dependency(&self, path: impl Into<Utf8PathBuf>) {
        let path = path.into();
        let mut deps = self
            .input_dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !deps.contains(&path) {
            deps.push(path);
        }
    }

    pub fn input_dependencies(&self) -> Vec<Utf8PathBuf> {
        self.input_dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("settings", &self.settings)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_output() {
        let ctx = BuildContext::new(BuildSettings::new("walleye", "/out"));
        let path = ctx.path_for_output([ctx.device_name(), "dex_bootjars", "boot.zip"]);
        assert_eq!(path, "/out/walleye/dex_bootjars/boot.zip");
    }

    #[test]
    fn test_input_dependencies_deduplicated() {
        let ctx = BuildContext::new(BuildSettings::new("walleye", "/out"));
        ctx.add_input_dependency("/out/dexpreopt.config");
        ctx.add_input_dependency("/out/dexpreopt.config");

        assert_eq!(ctx.input_dependencies(), vec![Utf8PathBuf::from("/out/dexpreopt.config")]);
    }
}
