/// Platform targets and target resolution
use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use umbrella_descriptor::Module;

/// Operating system family of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFamily {
    Android,
    Apple,
}

/// A concrete OS/architecture combination the artifact is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformTarget {
    /// Android library (all ABIs)
    Android,
    /// iOS device, arm64
    IosArm64,
    /// iOS simulator on Intel hosts
    IosX64,
    /// iOS simulator on Apple silicon hosts
    IosSimulatorArm64,
}

impl PlatformTarget {
    /// Every concrete target
    pub const ALL: [PlatformTarget; 4] = [
        PlatformTarget::Android,
        PlatformTarget::IosArm64,
        PlatformTarget::IosX64,
        PlatformTarget::IosSimulatorArm64,
    ];

    /// Target name as used in output paths
    pub fn name(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::IosArm64 => "iosArm64",
            Self::IosX64 => "iosX64",
            Self::IosSimulatorArm64 => "iosSimulatorArm64",
        }
    }

    pub fn family(&self) -> TargetFamily {
        match self {
            Self::Android => TargetFamily::Android,
            Self::IosArm64 | Self::IosX64 | Self::IosSimulatorArm64 => TargetFamily::Apple,
        }
    }

    pub fn is_apple(&self) -> bool {
        self.family() == TargetFamily::Apple
    }

    pub fn is_simulator(&self) -> bool {
        matches!(self, Self::IosX64 | Self::IosSimulatorArm64)
    }

    /// CPU architecture, `None` for Android which ships every ABI
    pub fn arch(&self) -> Option<&'static str> {
        match self {
            Self::Android => None,
            Self::IosArm64 | Self::IosSimulatorArm64 => Some("arm64"),
            Self::IosX64 => Some("x86_64"),
        }
    }

    /// Apple SDK the slice is built against
    pub fn sdk(&self) -> Option<&'static str> {
        match self {
            Self::Android => None,
            Self::IosArm64 => Some("iphoneos"),
            Self::IosX64 | Self::IosSimulatorArm64 => Some("iphonesimulator"),
        }
    }
}

impl std::fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted platform identifiers and what they expand to
const IDENTIFIERS: &[(&[&str], &[PlatformTarget])] = &[
    (
        &["android", "androidtarget", "a"],
        &[PlatformTarget::Android],
    ),
    (
        &["ios-arm64", "iosarm64", "b-device"],
        &[PlatformTarget::IosArm64],
    ),
    (&["ios-x64", "iosx64"], &[PlatformTarget::IosX64]),
    (
        &["ios-simulator-arm64", "iossimulatorarm64", "b-sim"],
        &[PlatformTarget::IosSimulatorArm64],
    ),
    (
        &["ios-simulator"],
        &[PlatformTarget::IosX64, PlatformTarget::IosSimulatorArm64],
    ),
    (
        &["ios"],
        &[
            PlatformTarget::IosX64,
            PlatformTarget::IosArm64,
            PlatformTarget::IosSimulatorArm64,
        ],
    ),
];

/// Expands abstract platform identifiers into concrete targets
pub struct PlatformResolver;

impl PlatformResolver {
    /// Canonical identifiers, for error messages and help output
    pub fn known_identifiers() -> Vec<&'static str> {
        IDENTIFIERS.iter().map(|(ids, _)| ids[0]).collect()
    }

    /// Expand a single identifier (case-insensitive)
    pub fn expand(identifier: &str) -> Option<&'static [PlatformTarget]> {
        let id = identifier.trim().to_ascii_lowercase();
        IDENTIFIERS
            .iter()
            .find(|(ids, _)| ids.contains(&id.as_str()))
            .map(|(_, targets)| *targets)
    }

    /// Resolve a sequence of identifiers
    ///
    /// Output preserves input order; a target produced twice keeps its
    /// first position.
    pub fn resolve<S: AsRef<str>>(identifiers: &[S]) -> BuildResult<Vec<PlatformTarget>> {
        Self::resolve_with(identifiers, |i| format!("targets[{}]", i))
    }

    /// Resolve the targets declared by a module
    pub fn resolve_module(module: &Module) -> BuildResult<Vec<PlatformTarget>> {
        Self::resolve_with(module.targets.as_slice(), |i| {
            format!("module.targets[{}] of '{}'", i, module.name)
        })
    }

    fn resolve_with<S: AsRef<str>>(
        identifiers: &[S],
        field: impl Fn(usize) -> String,
    ) -> BuildResult<Vec<PlatformTarget>> {
        let mut resolved = Vec::new();

        for (i, identifier) in identifiers.iter().enumerate() {
            let identifier = identifier.as_ref();
            let targets =
                Self::expand(identifier).ok_or_else(|| BuildError::UnknownPlatform {
                    platform: identifier.to_string(),
                    field: field(i),
                    expected: Self::known_identifiers().join(", "),
                })?;

            for target in targets {
                if !resolved.contains(target) {
                    resolved.push(*target);
                }
            }
        }

        Ok(resolved)
    }
}
