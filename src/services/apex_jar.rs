use crate::error::{DexpreoptError, Result};

/// Split an `<apex>:<jar>` value into its apex and jar names.
///
/// Only the first colon separates; anything after it belongs to the jar name.
///
/// # Errors
/// Returns [`DexpreoptError::MalformedApexJarPair`] if there is no colon or either side is empty.
pub fn split_apex_jar_pair(value: &str) -> Result<(&str, &str)> {
    match value.split_once(':') {
        Some((apex, jar)) if !apex.is_empty() && !jar.is_empty() => Ok((apex, jar)),
        _ => Err(DexpreoptError::MalformedApexJarPair(value.to_string())),
    }
}
