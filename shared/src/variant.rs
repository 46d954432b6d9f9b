//! Engine variant selection result.

use serde::{Deserialize, Serialize};

/// Which game-engine runtime the loaded data targets.
///
/// Chosen once per source during discovery and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineVariant {
    /// System3-era data: flat `.DAT` files, no resource manifest.
    System3,
    /// Xsystem35 data: `.ALD` archives described by a synthesized manifest.
    Xsystem35,
}

impl EngineVariant {
    /// Name of the runtime module that has to be bootstrapped for this variant.
    pub fn module_name(self) -> &'static str {
        match self {
            EngineVariant::System3 => "system3",
            EngineVariant::Xsystem35 => "xsystem35",
        }
    }

    /// Whether a resource manifest is synthesized after discovery.
    pub fn needs_manifest(self) -> bool {
        matches!(self, EngineVariant::Xsystem35)
    }
}

impl std::fmt::Display for EngineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.module_name())
    }
}
