use crate::context::BuildContext;
use crate::models::{NativeBridge, OsType, Target};

/// Android targets relevant to dexpreopting.
///
/// Architectures that are only supported through native bridge are excluded; the remaining
/// targets keep their configured order.
pub fn dexpreopt_targets(ctx: &BuildContext) -> Vec<Target> {
    ctx.targets()
        .iter()
        .filter(|target| target.os == OsType::Android)
        .filter(|target| target.native_bridge == NativeBridge::Disabled)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildSettings;
    use crate::models::ArchType;

    #[test]
    fn test_excludes_native_bridge_and_host() {
        let settings = BuildSettings::new("test_device", "out").with_targets(vec![
            Target::android(ArchType::Arm64),
            Target::native_bridge(ArchType::Arm),
            Target {
                os: OsType::Host,
                arch: ArchType::X86_64,
                native_bridge: NativeBridge::Disabled,
            },
            Target::android(ArchType::Arm),
        ]);
        let ctx = BuildContext::new(settings);

        assert_eq!(
            dexpreopt_targets(&ctx),
            vec![
                Target::android(ArchType::Arm64),
                Target::android(ArchType::Arm)
            ]
        );
    }

    #[test]
    fn test_no_targets() {
        let ctx = BuildContext::new(BuildSettings::new("test_device", "out"));
        assert!(dexpreopt_targets(&ctx).is_empty());
    }
}
