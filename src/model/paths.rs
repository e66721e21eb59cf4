// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Marksync-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Marksync and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Lexical path helpers shared by the registry and the link resolver.
//!
//! Nothing here touches the filesystem: paths are compared component-wise after `.`/`..`
//! segments are folded away, so `/ws-other` is never considered to be inside `/ws`.

use std::path::{Component, Path, PathBuf};

/// Removes `.` segments and folds `..` into the preceding segment.
///
/// A `..` that would climb above the root is dropped for absolute paths and kept for
/// relative ones.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Route of `path` relative to `root`, always `/`-separated and starting with `/`.
///
/// Returns `None` when `path` is not `root` itself or one of its descendants.
pub fn workspace_route(root: &Path, path: &Path) -> Option<String> {
    let root = clean_path(root);
    let path = clean_path(path);
    let relative = path.strip_prefix(&root).ok()?;

    let mut route = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                route.push('/');
                route.push_str(&segment.to_string_lossy());
            }
            _ => return None,
        }
    }

    if route.is_empty() {
        route.push('/');
    }
    Some(route)
}

/// Inverse of [`workspace_route`]: joins a `/`-separated route onto `root`.
///
/// `.` and `..` segments are ignored, so the result never leaves `root`.
pub fn route_to_path(root: &Path, route: &str) -> PathBuf {
    let mut path = clean_path(root);
    for segment in route.split('/').filter(|segment| !matches!(*segment, "" | "." | "..")) {
        path.push(segment);
    }
    clean_path(&path)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use rstest::rstest;

    use super::{clean_path, route_to_path, workspace_route};

    #[rstest]
    #[case("/ws/./a.md", "/ws/a.md")]
    #[case("/ws/docs/../a.md", "/ws/a.md")]
    #[case("/../a.md", "/a.md")]
    #[case("docs/../../a.md", "../a.md")]
    #[case("./", ".")]
    fn clean_folds_dot_segments(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_path(Path::new(input)), PathBuf::from(expected));
    }

    #[rstest]
    #[case("/ws", "/ws/a.md", Some("/a.md"))]
    #[case("/ws", "/ws/docs/guide.md", Some("/docs/guide.md"))]
    #[case("/ws/", "/ws/docs/./guide.md", Some("/docs/guide.md"))]
    #[case("/ws", "/ws-other/file.md", None)]
    #[case("/ws", "/workspace/file.md", None)]
    #[case("/ws", "/ws/../etc/passwd", None)]
    #[case("/ws", "/ws", Some("/"))]
    fn route_requires_true_descendant(
        #[case] root: &str,
        #[case] path: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(workspace_route(Path::new(root), Path::new(path)).as_deref(), expected);
    }

    #[test]
    fn route_to_path_joins_segments() {
        assert_eq!(route_to_path(Path::new("/ws"), "/docs/a.md"), PathBuf::from("/ws/docs/a.md"));
        assert_eq!(route_to_path(Path::new("/ws"), "docs/a.md"), PathBuf::from("/ws/docs/a.md"));
        assert_eq!(route_to_path(Path::new("/ws"), "/../etc/a.md"), PathBuf::from("/ws/etc/a.md"));
    }
}
