//! Text format of the Xsystem35 resource manifest.
//!
//! One directive per line, fields separated by a single space:
//!
//! ```text
//! Ain System39.ain
//! GraphicsA XXXXXGA.ALD
//! SaveA save/XXXXXa.asd
//! MsgSkip save/XXXXX.msgskip
//! ```

use std::fmt;

/// Save slots are lettered `A` through `Z`.
pub const SAVE_SLOTS: std::ops::RangeInclusive<char> = 'A'..='Z';

/// Role of an `.ALD` archive, keyed by the type character in its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRole {
    Data,
    Graphics,
    Midi,
    Resource,
    Scenario,
    Wave,
}

impl ResourceRole {
    /// Looks up the role for a (case-folded) type character.
    pub fn from_type_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'd' => Some(ResourceRole::Data),
            'g' => Some(ResourceRole::Graphics),
            'm' => Some(ResourceRole::Midi),
            'r' => Some(ResourceRole::Resource),
            's' => Some(ResourceRole::Scenario),
            'w' => Some(ResourceRole::Wave),
            _ => None,
        }
    }

    /// Directive prefix used in the manifest.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceRole::Data => "Data",
            ResourceRole::Graphics => "Graphics",
            ResourceRole::Midi => "Midi",
            ResourceRole::Resource => "Resource",
            ResourceRole::Scenario => "Scenario",
            ResourceRole::Wave => "Wave",
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single manifest directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    /// `<Role><Slot> <filename>`
    Resource {
        role: ResourceRole,
        slot: char,
        filename: String,
    },
    /// `Ain <filename>`
    Ain { filename: String },
    /// `Save<Slot> <path>`
    Save { slot: char, path: String },
    /// `MsgSkip <path>`
    MsgSkip { path: String },
}

impl ManifestLine {
    /// Save directive for `slot` using the archive basename `base`.
    pub fn save(base: &str, slot: char) -> Self {
        ManifestLine::Save {
            slot,
            path: format!("save/{}{}.asd", base, slot.to_ascii_lowercase()),
        }
    }

    /// Message-skip directive for the archive basename `base`.
    pub fn msg_skip(base: &str) -> Self {
        ManifestLine::MsgSkip {
            path: format!("save/{}.msgskip", base),
        }
    }
}

impl fmt::Display for ManifestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestLine::Resource {
                role,
                slot,
                filename,
            } => write!(f, "{}{} {}", role, slot, filename),
            ManifestLine::Ain { filename } => write!(f, "Ain {}", filename),
            ManifestLine::Save { slot, path } => write!(f, "Save{} {}", slot, path),
            ManifestLine::MsgSkip { path } => write!(f, "MsgSkip {}", path),
        }
    }
}
