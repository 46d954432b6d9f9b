//! Filename conventions of the supported engines.
//!
//! `GAME_FORMAT` is the single source of truth for every fixed filename and
//! extension the loader matches against. All comparisons against these
//! values are ASCII case-insensitive; extensions are stored lowercased and
//! without the dot.
//!
//! # Example
//!
//! ```
//! use xsys_shared::GAME_FORMAT;
//!
//! assert_eq!(GAME_FORMAT.manifest_file, "xsystem35.gr");
//! assert_eq!(GAME_FORMAT.resource_ext, "ald");
//! ```

/// Fixed names used while discovering and classifying game data.
#[derive(Debug, Clone, Copy)]
pub struct GameFormat {
    /// Interpreter image that is always listed in the manifest.
    pub ain_file: &'static str,

    /// Extension of Xsystem35 resource archives.
    pub resource_ext: &'static str,

    /// Manifest written into the runtime's virtual filesystem.
    pub manifest_file: &'static str,

    /// Directory name that marks the game directory on a disc.
    pub game_dir_name: &'static str,

    /// File whose presence marks a directory as the game directory.
    pub game_dir_marker: &'static str,

    /// Executable whose presence selects the System3 engine.
    pub system3_marker: &'static str,

    /// Data extension kept for System3 discs.
    pub system3_data_ext: &'static str,

    /// Extensions never registered from an Xsystem35 disc.
    pub excluded_exts: &'static [&'static str],

    /// Extensions that count as game data inside zip files and archives.
    pub data_exts: &'static [&'static str],

    /// Extensions recognised for numbered audio tracks.
    pub track_exts: &'static [&'static str],
}

/// Conventions shared by System3 and Xsystem35 game data.
pub const GAME_FORMAT: GameFormat = GameFormat {
    ain_file: "System39.ain",
    resource_ext: "ald",
    manifest_file: "xsystem35.gr",
    game_dir_name: "gamedata",
    game_dir_marker: "ADISK.DAT",
    system3_marker: "SYSTEM3.EXE",
    system3_data_ext: "dat",
    excluded_exts: &["exe", "dll", "txt", "ini"],
    data_exts: &["ald", "ain", "dat"],
    track_exts: &["wav", "mp3", "ogg"],
};

impl GameFormat {
    /// Whether `ext` (lowercased, no dot) is a game-data extension.
    pub fn is_data_ext(&self, ext: &str) -> bool {
        self.data_exts.contains(&ext)
    }

    /// Whether `ext` (lowercased, no dot) is excluded from Xsystem35 discs.
    pub fn is_excluded_ext(&self, ext: &str) -> bool {
        self.excluded_exts.contains(&ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_tables_are_lowercase() {
        for ext in GAME_FORMAT
            .data_exts
            .iter()
            .chain(GAME_FORMAT.excluded_exts)
            .chain(GAME_FORMAT.track_exts)
        {
            assert_eq!(*ext, ext.to_ascii_lowercase());
            assert!(!ext.starts_with('.'));
        }
        assert_eq!(GAME_FORMAT.resource_ext, "ald");
        assert_eq!(GAME_FORMAT.system3_data_ext, "dat");
    }

    #[test]
    fn data_and_excluded_extensions() {
        assert!(GAME_FORMAT.is_data_ext("ald"));
        assert!(GAME_FORMAT.is_data_ext("ain"));
        assert!(!GAME_FORMAT.is_data_ext("exe"));
        assert!(GAME_FORMAT.is_excluded_ext("dll"));
        assert!(!GAME_FORMAT.is_excluded_ext("ald"));
    }
}
