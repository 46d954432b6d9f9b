//! Resource manifest synthesis for Xsystem35.
//!
//! The runtime finds its archives through a small text manifest: one line per
//! `.ALD` archive naming its role and slot, the interpreter image, and the
//! save-slot paths. Archive names follow the `<base><type><slot>.ALD`
//! convention, so everything is derived from the file names alone:
//!
//! ```text
//! KICHIKUGA.ALD  ->  type 'G' (Graphics), slot 'A', base "KICHIKU"
//! ```
//!
//! The save paths use the basename of the *last* classified archive. Data
//! sets mixing several basenames end up with the final one; that is how the
//! runtime has always been fed and is kept as is.

use xsys_shared::{GAME_FORMAT, ManifestLine, ResourceRole, SAVE_SLOTS, names};

/// Synthesized manifest plus the facts derived while building it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub lines: Vec<ManifestLine>,
    /// At least one archive has the Midi role
    pub has_midi: bool,
    /// Basename used for the save paths (empty if no archive was seen)
    pub basename: String,
    /// Archives skipped because of an unknown type character
    pub skipped: Vec<String>,
}

impl Manifest {
    /// Serializes the manifest, one directive per line, newline terminated.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }

    pub fn resource_lines(&self) -> impl Iterator<Item = &ManifestLine> {
        self.lines
            .iter()
            .filter(|l| matches!(l, ManifestLine::Resource { .. }))
    }
}

/// Builds the manifest from file names in discovery order.
pub fn synthesize<S: AsRef<str>>(file_names: &[S]) -> Manifest {
    let mut manifest = Manifest::default();

    for name in file_names {
        let name = name.as_ref();

        if names::eq_ignore_case(name, GAME_FORMAT.ain_file) {
            manifest.lines.push(ManifestLine::Ain {
                filename: name.to_string(),
            });
            continue;
        }

        if names::extension_lower(name).as_deref() != Some(GAME_FORMAT.resource_ext) {
            continue;
        }

        let chars: Vec<char> = name.chars().collect();
        if chars.len() < 6 {
            tracing::warn!(file = name, "Archive name too short to carry a resource type");
            manifest.skipped.push(name.to_string());
            continue;
        }

        let type_char = chars[chars.len() - 6].to_ascii_lowercase();
        let slot = chars[chars.len() - 5];
        manifest.basename = chars[..chars.len() - 6].iter().collect();

        let Some(role) = ResourceRole::from_type_char(type_char) else {
            tracing::warn!(file = name, type_char = %type_char, "Unknown resource type");
            manifest.skipped.push(name.to_string());
            continue;
        };

        if role == ResourceRole::Midi {
            manifest.has_midi = true;
        }
        manifest.lines.push(ManifestLine::Resource {
            role,
            slot: slot.to_ascii_uppercase(),
            filename: name.to_string(),
        });
    }

    for slot in SAVE_SLOTS {
        manifest
            .lines
            .push(ManifestLine::save(&manifest.basename, slot));
    }
    manifest.lines.push(ManifestLine::msg_skip(&manifest.basename));

    manifest
}
