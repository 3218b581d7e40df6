//! Default override file names derived from a naming pattern.
use super::DEFAULT_PATTERN;

/// Derive the conventional override path for `original_path`.
///
/// The pattern (with one leading `.` removed) is inserted before the file
/// extension, or appended when the file name has none.  A file name whose
/// only dot is its first character (`.env`) counts as having no extension.
/// The directory part is preserved unchanged.  A pattern with nothing
/// left after the dot (`""`, `"."`) falls back to [`DEFAULT_PATTERN`], so
/// the result never names the original file.
///
/// Used only to suggest names for new overrides; existing groups always
/// carry an explicit override path.
///
/// # Examples
///
/// ```
/// use local_overrides::config::derive::derive_override_path;
///
/// assert_eq!(derive_override_path("AGENTS.md", ".local"), "AGENTS.local.md");
/// assert_eq!(derive_override_path("docs/guide.md", "mine"), "docs/guide.mine.md");
/// assert_eq!(derive_override_path("Makefile", ".local"), "Makefile.local");
/// assert_eq!(derive_override_path(".env", ".local"), ".env.local");
/// ```
#[must_use]
pub fn derive_override_path(original_path: &str, pattern: &str) -> String {
    let infix = match pattern.strip_prefix('.').unwrap_or(pattern) {
        "" => DEFAULT_PATTERN.trim_start_matches('.'),
        infix => infix,
    };

    let (dir, name) = original_path
        .rfind('/')
        .map_or(("", original_path), |idx| original_path.split_at(idx + 1));

    match name.rfind('.') {
        Some(idx) if idx > 0 => {
            let (stem, extension) = name.split_at(idx);
            format!("{dir}{stem}.{infix}{extension}")
        }
        _ => format!("{dir}{name}.{infix}"),
    }
}
