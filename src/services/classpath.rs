use crate::context::BuildContext;
use crate::error::Result;
use crate::services::apex_jar::split_apex_jar_pair;
use crate::services::boot_image::{SYSTEM_FRAMEWORK_DIR, default_boot_image_config};
use crate::services::global_config::dexpreopt_global_config;
use crate::state::OnceKey;
use camino::Utf8Path;
use std::sync::Arc;

const SYSTEM_SERVER_CLASSPATH_KEY: OnceKey<Vec<String>> = OnceKey::new("systemServerClasspath");
const DEFAULT_BOOTCLASSPATH_KEY: OnceKey<Vec<String>> = OnceKey::new("defaultBootclasspath");

/// On-device locations of the system server classpath jars.
///
/// Platform jars from `/system/framework` come first, then the apex jars from
/// `/apex/<apex>/javalib`, each group in declaration order. Computed once per context.
///
/// # Errors
/// Fails if the global config cannot be resolved or an updatable entry is not `<apex>:<jar>`.
pub fn system_server_classpath(ctx: &BuildContext) -> Result<Arc<Vec<String>>> {
    ctx.try_once(SYSTEM_SERVER_CLASSPATH_KEY, || {
        let global = dexpreopt_global_config(ctx)?;

        let mut locations = Vec::with_capacity(
            global.system_server_jars.len() + global.updatable_system_server_jars.len(),
        );
        for module in &global.system_server_jars {
            locations.push(
                Utf8Path::new(SYSTEM_FRAMEWORK_DIR)
                    .join(format!("{module}.jar"))
                    .into_string(),
            );
        }
        for value in &global.updatable_system_server_jars {
            let (apex, jar) = split_apex_jar_pair(value)?;
            locations.push(
                Utf8Path::new("/apex")
                    .join(apex)
                    .join("javalib")
                    .join(format!("{jar}.jar"))
                    .into_string(),
            );
        }
        Ok(locations)
    })
}

/// The device boot classpath: the default boot image's jar locations followed by the product
/// updatable boot jar locations from the global config. Computed once per context.
pub fn default_bootclasspath(ctx: &BuildContext) -> Result<Arc<Vec<String>>> {
    ctx.try_once(DEFAULT_BOOTCLASSPATH_KEY, || {
        let global = dexpreopt_global_config(ctx)?;
        let image = default_boot_image_config(ctx)?;

        let mut bootclasspath = image.dex_locations().to_vec();
        bootclasspath.extend(global.product_updatable_boot_locations.iter().cloned());
        Ok(bootclasspath)
    })
}
