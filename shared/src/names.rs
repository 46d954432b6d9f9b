//! Filename matching helpers.
//!
//! Names are case-preserved but compared case-insensitively everywhere.
//! Only ASCII letters are folded; game data from both engines uses
//! Shift-JIS or ASCII names and the fixed names we match against are ASCII.

use crate::GAME_FORMAT;

/// Case-insensitive name equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Lowercased extension of `name` without the dot, if it has one.
///
/// A leading dot alone does not make an extension (`.hidden` has none).
pub fn extension_lower(name: &str) -> Option<String> {
    let base = base_name(name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(base[idx + 1..].to_ascii_lowercase()),
    }
}

/// Strips any directory prefix (`/` or `\` separated) from an entry name.
pub fn base_name(name: &str) -> &str {
    match name.rfind(['/', '\\']) {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Whether `name` is a dotfile (`.DS_Store`, `._FOO.ALD`, ...).
pub fn is_dotfile(name: &str) -> bool {
    base_name(name).starts_with('.')
}

/// Whether the base name of `name` has the shape of a numbered audio
/// track: `<digits>.<ext>` with a track extension.
///
/// Shape only. `00.ogg` matches even though no track 0 exists; such files
/// are still kept out of the game data.
pub fn is_track_name(name: &str) -> bool {
    track_stem(name).is_some()
}

/// Parses a numbered audio track name (`02.ogg`, `track/10.WAV`).
///
/// Track numbers start at 1 and must fit a `u32`; `0.wav` and
/// `99999999999.wav` match [`is_track_name`] but yield `None`.
pub fn parse_track_name(name: &str) -> Option<u32> {
    match track_stem(name)?.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(track) => Some(track),
    }
}

fn track_stem(name: &str) -> Option<&str> {
    let (stem, ext) = base_name(name).rsplit_once('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    GAME_FORMAT.track_exts.contains(&ext.as_str()).then_some(stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_lower("XXXXXG1.ALD").as_deref(), Some("ald"));
        assert_eq!(extension_lower("dir/Sub.Dat").as_deref(), Some("dat"));
        assert_eq!(extension_lower("README"), None);
        assert_eq!(extension_lower(".hidden"), None);
        assert_eq!(extension_lower("dir.d/README"), None);
    }

    #[test]
    fn base_name_strips_both_separators() {
        assert_eq!(base_name("GAME/DATA/AG.ALD"), "AG.ALD");
        assert_eq!(base_name("GAME\\AG.ALD"), "AG.ALD");
        assert_eq!(base_name("AG.ALD"), "AG.ALD");
        assert_eq!(base_name("dir/"), "");
    }

    #[test]
    fn dotfiles() {
        assert!(is_dotfile(".DS_Store"));
        assert!(is_dotfile("sub/._AG.ALD"));
        assert!(!is_dotfile("AG.ALD"));
    }

    #[test]
    fn track_names() {
        assert_eq!(parse_track_name("01.ogg"), Some(1));
        assert_eq!(parse_track_name("2.WAV"), Some(2));
        assert_eq!(parse_track_name("music/12.mp3"), Some(12));
        assert_eq!(parse_track_name("0.wav"), None);
        assert_eq!(parse_track_name("track01.ogg"), None);
        assert_eq!(parse_track_name("01.flac"), None);
        assert_eq!(parse_track_name(".ogg"), None);
        assert_eq!(parse_track_name("data.ald"), None);
    }

    #[test]
    fn unusable_track_numbers_still_look_like_tracks() {
        for name in ["0.wav", "00.ogg", "99999999999.wav", "cd/000.MP3"] {
            assert!(is_track_name(name), "{name}");
            assert_eq!(parse_track_name(name), None, "{name}");
        }
        assert!(is_track_name("4294967295.ogg"));
        assert_eq!(parse_track_name("4294967295.ogg"), Some(u32::MAX));
        assert!(!is_track_name("track01.ogg"));
        assert!(!is_track_name("01.flac"));
        assert!(!is_track_name(".ogg"));
    }

    #[test]
    fn case_insensitive_equality() {
        assert!(eq_ignore_case("system39.AIN", "System39.ain"));
        assert!(!eq_ignore_case("system39.ain", "system3.ain"));
    }
}
