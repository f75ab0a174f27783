use crate::context::BuildContext;
use crate::error::Result;
use crate::services::boot_image::default_boot_image_config;
use crate::services::classpath::{default_bootclasspath, system_server_classpath};
use indexmap::IndexMap;

/// Receiver of exported make variables
pub trait MakeVarsContext {
    /// Export a variable whose value must not be overridden
    fn strict(&mut self, name: &str, value: String);
}

impl MakeVarsContext for IndexMap<String, String> {
    fn strict(&mut self, name: &str, value: String) {
        self.insert(name.to_string(), value);
    }
}

/// Export the dexpreopt classpath variables to `out`.
///
/// # Errors
/// Propagates any resolution failure; no variables are written in that case.
pub fn dexpreopt_config_make_vars(ctx: &BuildContext, out: &mut impl MakeVarsContext) -> Result<()> {
    let bootclasspath = default_bootclasspath(ctx)?;
    let image = default_boot_image_config(ctx)?;
    let system_server = system_server_classpath(ctx)?;

    out.strict("PRODUCT_BOOTCLASSPATH", bootclasspath.join(":"));
    out.strict("PRODUCT_DEX2OAT_BOOTCLASSPATH", image.dex_locations().join(":"));
    out.strict("PRODUCT_SYSTEM_SERVER_CLASSPATH", system_server.join(":"));
    out.strict("DEXPREOPT_BOOT_JARS_MODULES", image.modules().join(":"));
    Ok(())
}

/// Collect the dexpreopt make variables in export order
pub fn collect_make_vars(ctx: &BuildContext) -> Result<IndexMap<String, String>> {
    let mut vars = IndexMap::new();
    dexpreopt_config_make_vars(ctx, &mut vars)?;
    Ok(vars)
}
