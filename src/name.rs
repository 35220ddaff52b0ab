//! Reduction of client supplied file names to a bare base name.
//!
//! Browsers and command line tools may send anything as a file name, including relative
//! segments (`../`) or absolute paths. Only the last path component is ever used to address
//! the store.
//!
//! Separators are those of the platform: `/` on unix, where `\` is an ordinary file name
//! character, and both `/` and `\` on Windows.

const CURRENT_DIR: &str = ".";
const ROOT_DIR: &str = "/";

use std::path::is_separator;

/// Return the final path component of `name`.
///
/// Trailing separators are ignored. An empty name yields `"."` and a name made only of
/// separators yields `"/"`, neither of which is a usable file name; the store treats both as
/// its own root directory.
///
/// The result never contains a separator other than in the `"/"` case, which makes the
/// function idempotent.
///
/// # Arguments
///
/// * `name` - Untrusted file name as received from the client.
pub fn safe_file_name(name: &str) -> String {
    if name.is_empty() {
        return String::from(CURRENT_DIR);
    }
    let trimmed = name.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        return String::from(ROOT_DIR);
    }
    match trimmed.rfind(is_separator) {
        Some(i) => trimmed[i + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// True if a sanitized name refers to a directory by convention rather than by an entry in the
/// store (`"."`, `".."` or the bare root).
pub fn is_special(safe_name: &str) -> bool {
    safe_name == CURRENT_DIR || safe_name == ".." || safe_name == ROOT_DIR
}

#[cfg(test)]
mod tests {
    use super::{
        safe_file_name,
        is_special,
    };

    #[test]
    fn test_traversal_stripped() {
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("/etc/passwd"), "passwd");
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_is_name_character() {
        assert_eq!(safe_file_name("a\\b.txt"), "a\\b.txt");
        assert_eq!(safe_file_name("../x/a\\b.txt"), "a\\b.txt");
        assert_eq!(safe_file_name("a\\b.txt"), safe_file_name(&safe_file_name("a\\b.txt")));
    }

    #[cfg(windows)]
    #[test]
    fn test_backslash_is_separator() {
        assert_eq!(safe_file_name("..\\..\\windows\\win.ini"), "win.ini");
        assert_eq!(safe_file_name("C:\\Users\\me\\report.txt"), "report.txt");
    }

    #[test]
    fn test_plain_name_kept() {
        assert_eq!(safe_file_name("report.txt"), "report.txt");
        assert_eq!(safe_file_name("with space.tar.gz"), "with space.tar.gz");
        assert_eq!(safe_file_name("ünïcode.bin"), "ünïcode.bin");
    }

    #[test]
    fn test_trailing_separator() {
        assert_eq!(safe_file_name("dir/sub/"), "sub");
        assert_eq!(safe_file_name("a//"), "a");
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(safe_file_name(""), ".");
        assert_eq!(safe_file_name("/"), "/");
        assert_eq!(safe_file_name("///"), "/");
        assert_eq!(safe_file_name(".."), "..");
        assert_eq!(safe_file_name("foo/.."), "..");
        assert!(is_special(&safe_file_name("")));
        assert!(is_special(&safe_file_name("//")));
        assert!(is_special(&safe_file_name("a/..")));
        assert!(!is_special(&safe_file_name("...")));
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "/",
            "..",
            "../../etc/passwd",
            "a/b/c/",
            "C:\\x\\y.txt",
            "a\\b/",
            "plain",
            ".hidden",
        ];
        for v in inputs.iter() {
            let once = safe_file_name(v);
            assert_eq!(safe_file_name(&once), once, "input {:?}", v);
        }
    }
}
