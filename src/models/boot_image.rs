use crate::models::target::{ArchType, Target};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Serialize;

/// Modules whose installed jar is named differently from the module.
///
/// The stem cannot be queried from the module itself before the module graph is built,
/// so the exceptions are listed here.
pub const STEM_OVERRIDES: &[(&str, &str)] = &[("framework-minus-apex", "framework")];

/// Installed file stem of a boot jar module
pub fn stem_of(module: &str) -> &str {
    STEM_OVERRIDES
        .iter()
        .find(|(name, _)| *name == module)
        .map_or(module, |(_, stem)| stem)
}

/// One compiled boot image variant.
///
/// Built once per build context and variant, then shared read-only through an `Arc`.
/// `modules`, `dex_locations` and `dex_paths` are positionally aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootImageConfig {
    pub(crate) name: String,
    pub(crate) stem: String,
    pub(crate) modules: Vec<String>,
    pub(crate) dex_locations: Vec<String>,
    pub(crate) dex_paths: Vec<Utf8PathBuf>,
    pub(crate) dir: Utf8PathBuf,
    pub(crate) symbols_dir: Utf8PathBuf,
    pub(crate) targets: Vec<Target>,
    pub(crate) images: IndexMap<ArchType, Utf8PathBuf>,
    pub(crate) images_deps: IndexMap<ArchType, Vec<Utf8PathBuf>>,
    pub(crate) zip: Option<Utf8PathBuf>,
}

impl BootImageConfig {
    /// Profile name, unique per variant and used in output directory names
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Basename of the image files
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Modules in boot classpath order, ART modules first
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// On-device jar locations, aligned with [`modules`](Self::modules)
    pub fn dex_locations(&self) -> &[String] {
        &self.dex_locations
    }

    /// Intermediate dex jar paths in the build output, aligned with [`modules`](Self::modules)
    pub fn dex_paths(&self) -> &[Utf8PathBuf] {
        &self.dex_paths
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    pub fn symbols_dir(&self) -> &Utf8Path {
        &self.symbols_dir
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Primary image (`<stem>.art`) per architecture
    pub fn images(&self) -> &IndexMap<ArchType, Utf8PathBuf> {
        &self.images
    }

    /// Image plus companion files per architecture
    pub fn images_deps(&self) -> &IndexMap<ArchType, Vec<Utf8PathBuf>> {
        &self.images_deps
    }

    pub fn zip(&self) -> Option<&Utf8Path> {
        self.zip.as_deref()
    }

    /// Output files for every module of the image, one per extension.
    ///
    /// The first module's files are named `<stem><ext>`, later modules
    /// `<stem>-<module stem><ext>`.
    pub fn module_files(&self, dir: &Utf8Path, exts: &[&str]) -> Vec<Utf8PathBuf> {
        let mut files = Vec::with_capacity(self.modules.len() * exts.len());
        for (i, module) in self.modules.iter().enumerate() {
            let name = if i == 0 {
                self.stem.clone()
            } else {
                format!("{}-{}", self.stem, stem_of(module))
            };
            for ext in exts {
                files.push(dir.join(format!("{name}{ext}")));
            }
        }
        files
    }
}
