//! Device path helpers with file-manager semantics.
//!
//! Device paths are absolute, `/`-separated and carry no trailing slash except for the root.

/// Joins a directory path and an entry name.
///
/// Joining onto the root would produce `//name`; the leading double slash is collapsed.
pub fn join_path(dir: &str, name: &str) -> String {
    let joined = format!("{dir}/{name}");
    match joined.strip_prefix("//") {
        Some(rest) => format!("/{rest}"),
        None => joined,
    }
}

/// Returns the parent directory of `path` (`/regs/web` → `/regs`, `/config` → `/`).
pub fn parent_path(path: &str) -> String {
    let mut segments = path.split('/').collect::<Vec<_>>();
    segments.pop();
    if segments.len() <= 1 {
        "/".to_string()
    } else {
        segments.join("/")
    }
}

/// Returns the last segment of a `/`- or `\`-separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Strips one leading `/`, turning a device path into an archive entry name.
pub fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_collapses_root_double_slash() {
        let cases = [
            ("/", "file1.txt", "/file1.txt"),
            ("/config", "file3.txt", "/config/file3.txt"),
            ("/config/sub", "x", "/config/sub/x"),
        ];
        for (dir, name, expected) in cases {
            assert_eq!(join_path(dir, name), expected, "dir={dir:?} name={name:?}");
        }
    }

    #[test]
    fn parent_path_matches_expected_cases() {
        let cases = [
            ("/config", "/"),
            ("/config/sub", "/config"),
            ("/regs/web/a", "/regs/web"),
            ("/", "/"),
        ];
        for (input, expected) in cases {
            assert_eq!(parent_path(input), expected, "input={input:?}");
        }
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("/config/file3.txt"), "file3.txt");
        assert_eq!(basename("C:\\temp\\x.json"), "x.json");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(strip_leading_slash("/config/a"), "config/a");
        assert_eq!(strip_leading_slash("config/a"), "config/a");
    }
}
