//! Boot image variant derivation.
//!
//! A boot image variant is described by a [`BootImageProfile`]: the variants differ in their
//! input jars (ART only, or ART plus framework), in the naming of their output files, and in
//! whether a zip archive is produced. [`get_boot_image_config`] derives the full
//! [`BootImageConfig`] for a profile once per build context.
//!
//! # Output layout
//!
//! For a profile named `<name>` with stem `<stem>` on device `<device>`:
//!
//! ```text
//! <out>/<device>/dex_<name>jars_input/<module>.jar        intermediate dex jars
//! <out>/<device>/dex_<name>jars/<stem>.zip                zip (if needed)
//! <out>/<device>/dex_<name>jars/system/framework/<arch>/  per-arch image files
//! <out>/<device>/dex_<name>jars_unstripped/               symbols
//! ```

use crate::context::BuildContext;
use crate::error::Result;
use crate::models::{BootImageConfig, stem_of};
use crate::services::global_config::dexpreopt_global_config;
use crate::services::lists::remove_list_from_list;
use crate::services::targets::dexpreopt_targets;
use crate::state::OnceKey;
use camino::Utf8Path;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// On-device directory of jars shipped in the ART apex
pub const ART_APEX_JAVALIB_DIR: &str = "/apex/com.android.art/javalib";

/// On-device directory of framework jars in the system image
pub const SYSTEM_FRAMEWORK_DIR: &str = "/system/framework";

/// Extensions of the files produced per module in a boot image
pub const IMAGE_EXTENSIONS: [&str; 3] = [".art", ".oat", ".vdex"];

/// Inputs that distinguish one boot image variant from another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootImageProfile {
    /// Unique per profile; used in directory names
    pub name: &'static str,
    /// Basename of the image files
    pub stem: &'static str,
    pub needs_zip: bool,
    /// Include only the ART apex jars
    pub art_only: bool,
}

/// The fixed set of boot image variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootImageVariant {
    /// The image that goes in the system image; ART and framework jars
    Default,
    /// JIT-zygote experiment; ART and framework jars, only the ART jars are AOT-compiled
    Apex,
    /// The image in the ART apex; ART jars only
    Art,
}

const DEFAULT_BOOT_IMAGE_CONFIG_KEY: OnceKey<BootImageConfig> =
    OnceKey::new("defaultBootImageConfig");
const APEX_BOOT_IMAGE_CONFIG_KEY: OnceKey<BootImageConfig> = OnceKey::new("apexBootImageConfig");
const ART_BOOT_IMAGE_CONFIG_KEY: OnceKey<BootImageConfig> = OnceKey::new("artBootImageConfig");

impl BootImageVariant {
    pub const ALL: [BootImageVariant; 3] = [
        BootImageVariant::Default,
        BootImageVariant::Apex,
        BootImageVariant::Art,
    ];

    pub fn profile(self) -> BootImageProfile {
        match self {
            BootImageVariant::Default => BootImageProfile {
                name: "boot",
                stem: "boot",
                needs_zip: true,
                art_only: false,
            },
            BootImageVariant::Apex => BootImageProfile {
                name: "apex",
                stem: "apex",
                needs_zip: false,
                art_only: false,
            },
            BootImageVariant::Art => BootImageProfile {
                name: "art",
                stem: "boot",
                needs_zip: false,
                art_only: true,
            },
        }
    }

    fn once_key(self) -> OnceKey<BootImageConfig> {
        match self {
            BootImageVariant::Default => DEFAULT_BOOT_IMAGE_CONFIG_KEY,
            BootImageVariant::Apex => APEX_BOOT_IMAGE_CONFIG_KEY,
            BootImageVariant::Art => ART_BOOT_IMAGE_CONFIG_KEY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BootImageVariant::Default => "default",
            BootImageVariant::Apex => "apex",
            BootImageVariant::Art => "art",
        }
    }
}

impl fmt::Display for BootImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootImageVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BootImageVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| format!("unknown boot image variant: {s} (expected default, apex or art)"))
    }
}

/// Derive the boot image config for `profile`, cached in `ctx` under `key`.
///
/// # Errors
/// Propagates global config resolution failures. Nothing is cached on failure.
pub fn get_boot_image_config(
    ctx: &BuildContext,
    key: OnceKey<BootImageConfig>,
    profile: BootImageProfile,
) -> Result<Arc<BootImageConfig>> {
    ctx.try_once(key, || {
        let global = dexpreopt_global_config(ctx)?;
        let BootImageProfile {
            name,
            stem,
            needs_zip,
            art_only,
        } = profile;

        let art_modules = &global.art_apex_jars;
        let mut image_modules = art_modules.clone();

        let mut dex_locations: Vec<String> = art_modules
            .iter()
            .map(|m| device_jar_location(ART_APEX_JAVALIB_DIR, m))
            .collect();

        if !art_only {
            let mut non_framework_modules = art_modules.clone();
            non_framework_modules.extend(global.product_updatable_boot_modules.iter().cloned());
            let framework_modules = remove_list_from_list(&global.boot_jars, &non_framework_modules);

            dex_locations.extend(
                framework_modules
                    .iter()
                    .map(|m| device_jar_location(SYSTEM_FRAMEWORK_DIR, m)),
            );
            image_modules.extend(framework_modules);
        }

        // Dex jars are copied to known paths so they can be referenced before the boot jar
        // modules are built.
        let device = ctx.device_name();
        let input_dir = format!("dex_{name}jars_input");
        let dex_paths = image_modules
            .iter()
            .map(|m| ctx.path_for_output([device, input_dir.as_str(), format!("{m}.jar").as_str()]))
            .collect();

        let dir = ctx.path_for_output([device, format!("dex_{name}jars").as_str()]);
        let symbols_dir = ctx.path_for_output([device, format!("dex_{name}jars_unstripped").as_str()]);
        let zip = needs_zip.then(|| dir.join(format!("{stem}.zip")));

        let targets = dexpreopt_targets(ctx);

        let mut image_config = BootImageConfig {
            name: name.to_string(),
            stem: stem.to_string(),
            modules: image_modules,
            dex_locations,
            dex_paths,
            dir,
            symbols_dir,
            targets,
            images: IndexMap::new(),
            images_deps: IndexMap::new(),
            zip,
        };

        for target in &image_config.targets {
            let arch = target.arch;
            let image_dir = image_config
                .dir
                .join("system/framework")
                .join(arch.as_str());
            let deps = image_config.module_files(&image_dir, &IMAGE_EXTENSIONS);
            image_config
                .images
                .insert(arch, image_dir.join(format!("{stem}.art")));
            image_config.images_deps.insert(arch, deps);
        }

        ctx.metrics().record_boot_image_built();
        tracing::debug!(
            "Derived boot image config {}: {} modules, {} targets, zip={}",
            name,
            image_config.modules.len(),
            image_config.targets.len(),
            image_config.zip.is_some()
        );
        Ok(image_config)
    })
}

fn device_jar_location(dir: &str, module: &str) -> String {
    Utf8Path::new(dir)
        .join(format!("{}.jar", stem_of(module)))
        .into_string()
}

/// Config of the boot image variant `variant`
pub fn boot_image_config(ctx: &BuildContext, variant: BootImageVariant) -> Result<Arc<BootImageConfig>> {
    get_boot_image_config(ctx, variant.once_key(), variant.profile())
}

/// The image that goes in the system image. It includes both libcore and framework.
pub fn default_boot_image_config(ctx: &BuildContext) -> Result<Arc<BootImageConfig>> {
    boot_image_config(ctx, BootImageVariant::Default)
}

/// Used for the JIT-zygote experiment. It includes both libcore and framework, but only
/// libcore is AOT-compiled.
pub fn apex_boot_image_config(ctx: &BuildContext) -> Result<Arc<BootImageConfig>> {
    boot_image_config(ctx, BootImageVariant::Apex)
}

/// The image in the ART apex. It includes only libcore.
pub fn art_boot_image_config(ctx: &BuildContext) -> Result<Arc<BootImageConfig>> {
    boot_image_config(ctx, BootImageVariant::Art)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildSettings;
    use crate::models::{ArchType, GlobalConfig, Target};
    use crate::services::global_config::set_dexpreopt_test_global_config;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_context() -> BuildContext {
        let settings = BuildSettings::new("test_device", "out").with_targets(vec![
            Target::android(ArchType::Arm64),
            Target::android(ArchType::Arm),
        ]);
        let ctx = BuildContext::new(settings);
        set_dexpreopt_test_global_config(
            &ctx,
            GlobalConfig {
                art_apex_jars: strings(&["core-oj", "core-libart"]),
                boot_jars: strings(&["core-oj", "core-libart", "framework-minus-apex", "updatable"]),
                product_updatable_boot_modules: strings(&["updatable"]),
                ..GlobalConfig::default()
            },
        )
        .unwrap();
        ctx
    }

    #[test]
    fn test_variant_profiles() {
        assert_eq!(BootImageVariant::Default.profile().name, "boot");
        assert!(BootImageVariant::Default.profile().needs_zip);
        assert_eq!(BootImageVariant::Apex.profile().stem, "apex");
        assert!(!BootImageVariant::Apex.profile().art_only);
        assert_eq!(BootImageVariant::Art.profile().stem, "boot");
        assert!(BootImageVariant::Art.profile().art_only);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("art".parse::<BootImageVariant>(), Ok(BootImageVariant::Art));
        assert!("bogus".parse::<BootImageVariant>().is_err());
    }

    #[test]
    fn test_default_image_modules_and_locations() {
        let ctx = create_test_context();
        let image = default_boot_image_config(&ctx).unwrap();

        assert_eq!(
            image.modules(),
            strings(&["core-oj", "core-libart", "framework-minus-apex"])
        );
        assert_eq!(
            image.dex_locations(),
            strings(&[
                "/apex/com.android.art/javalib/core-oj.jar",
                "/apex/com.android.art/javalib/core-libart.jar",
                "/system/framework/framework.jar",
            ])
        );
        assert_eq!(
            image.dex_paths()[2],
            "out/test_device/dex_bootjars_input/framework-minus-apex.jar"
        );
        assert_eq!(
            image.zip(),
            Some(Utf8Path::new("out/test_device/dex_bootjars/boot.zip"))
        );
    }

    #[test]
    fn test_per_arch_images() {
        let ctx = create_test_context();
        let image = default_boot_image_config(&ctx).unwrap();

        assert_eq!(
            image.images().keys().copied().collect::<Vec<_>>(),
            vec![ArchType::Arm64, ArchType::Arm]
        );
        assert_eq!(
            image.images()[&ArchType::Arm64],
            "out/test_device/dex_bootjars/system/framework/arm64/boot.art"
        );

        let deps = &image.images_deps()[&ArchType::Arm];
        assert_eq!(deps.len(), 9);
        assert_eq!(deps[0], "out/test_device/dex_bootjars/system/framework/arm/boot.art");
        assert_eq!(
            deps[8],
            "out/test_device/dex_bootjars/system/framework/arm/boot-framework.vdex"
        );
    }

    #[test]
    fn test_art_image_excludes_framework() {
        let ctx = create_test_context();
        let image = art_boot_image_config(&ctx).unwrap();

        assert_eq!(image.name(), "art");
        assert_eq!(image.stem(), "boot");
        assert_eq!(image.modules(), strings(&["core-oj", "core-libart"]));
        assert_eq!(image.dir(), Utf8Path::new("out/test_device/dex_artjars"));
        assert!(image.zip().is_none());
    }

    #[test]
    fn test_variants_cached_independently() {
        let ctx = create_test_context();
        let default = default_boot_image_config(&ctx).unwrap();
        let apex = apex_boot_image_config(&ctx).unwrap();

        assert!(Arc::ptr_eq(&default, &default_boot_image_config(&ctx).unwrap()));
        assert_eq!(default.modules(), apex.modules());
        assert_eq!(
            apex.symbols_dir(),
            Utf8Path::new("out/test_device/dex_apexjars_unstripped")
        );
        assert!(apex.zip().is_none());
    }
}
