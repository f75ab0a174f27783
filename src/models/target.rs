use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system a target builds for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsType {
    Android,
    Host,
}

/// CPU architecture of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArchType {
    #[serde(rename = "arm")]
    Arm,
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
}

impl ArchType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchType::Arm => "arm",
            ArchType::Arm64 => "arm64",
            ArchType::X86 => "x86",
            ArchType::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for ArchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a target is only reachable through native bridge translation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeBridge {
    #[default]
    Disabled,
    Enabled,
}

/// A build target as configured on the build context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub os: OsType,
    pub arch: ArchType,
    #[serde(default)]
    pub native_bridge: NativeBridge,
}

impl Target {
    pub fn android(arch: ArchType) -> Self {
        Self {
            os: OsType::Android,
            arch,
            native_bridge: NativeBridge::Disabled,
        }
    }

    pub fn native_bridge(arch: ArchType) -> Self {
        Self {
            native_bridge: NativeBridge::Enabled,
            ..Self::android(arch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_display() {
        assert_eq!(ArchType::Arm64.to_string(), "arm64");
        assert_eq!(ArchType::X86_64.to_string(), "x86_64");
    }

    #[test]
    fn test_target_deserialize_defaults_native_bridge() {
        let target: Target = serde_yaml_ng::from_str("os: android\narch: x86_64\n").unwrap();
        assert_eq!(target, Target::android(ArchType::X86_64));

        let bridged: Target =
            serde_yaml_ng::from_str("os: android\narch: arm\nnative_bridge: enabled\n").unwrap();
        assert_eq!(bridged.native_bridge, NativeBridge::Enabled);
    }
}
