//! Shared types for the xsys game-data loader.
//!
//! Everything here is container-agnostic: the engine variant, the fixed
//! filename conventions of both engines, the manifest line format and the
//! name-matching helpers every source uses.

pub mod fs;
pub mod game_format;
pub mod manifest_format;
pub mod names;
pub mod variant;

pub use game_format::{GAME_FORMAT, GameFormat};
pub use manifest_format::{ManifestLine, ResourceRole, SAVE_SLOTS};
pub use variant::EngineVariant;
