//! Reference classification and root-relative path arithmetic.
//!
//! Everything here is lexical: no function touches the filesystem, and the
//! same inputs always produce the same output.

use std::path::{Component, Path, PathBuf};

/// Extension that marks a reference as a tileset document.
pub const DOCUMENT_EXTENSION: &str = ".json";

/// Returns true if the reference points at another tileset document.
///
/// Anything else (b3dm, pnts, i3dm, images...) is an external asset.
pub fn is_document_url(url: &str) -> bool {
    url.ends_with(DOCUMENT_EXTENSION)
}

/// Returns true if the file at `path` is a tileset document.
pub fn is_document_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_document_url(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Lexically normalize a path, removing `.` and folding `..` into the
/// preceding component where one exists.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` is `/`
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

/// Compute `path` relative to `base`.
///
/// Both paths should be normalized and either both absolute or both relative
/// to the same directory.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_components: Vec<_> = path.components().collect();
    let base_components: Vec<_> = base
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();

    let common = path_components
        .iter()
        .zip(base_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_components.len() {
        out.push("..");
    }
    for component in &path_components[common..] {
        out.push(component.as_os_str());
    }

    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Render a relative path with `/` separators regardless of the host.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Rewrite an asset reference so it is relative to `root_dir`.
///
/// `origin_dir` is the directory of the document the reference was found in
/// and `url` is the reference as written there. Backslashes in `url` are
/// treated as separators.
pub fn rewrite(root_dir: &Path, origin_dir: &Path, url: &str) -> String {
    let url = url.replace('\\', "/");
    let target = normalize(&origin_dir.join(url));
    to_slash(&relative_to(&target, &normalize(root_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_document_url() {
        assert!(is_document_url("tileset2.json"));
        assert!(is_document_url("sub/tileset.json"));
        assert!(!is_document_url("0/0.b3dm"));
        assert!(!is_document_url("json"));
        assert!(!is_document_url("tileset.json.gz"));
    }

    #[test]
    fn test_is_document_path() {
        assert!(is_document_path(Path::new("/a/tileset.json")));
        assert!(!is_document_path(Path::new("/a/ll.b3dm")));
        assert!(!is_document_path(Path::new("/")));
    }

    #[test]
    fn test_normalize_folds_parent_and_current() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/b/../../..")), PathBuf::from(".."));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_relative_to_sibling_and_child() {
        assert_eq!(
            relative_to(Path::new("/root/a/b.b3dm"), Path::new("/root")),
            PathBuf::from("a/b.b3dm")
        );
        assert_eq!(
            relative_to(Path::new("/other/b.b3dm"), Path::new("/root/x")),
            PathBuf::from("../../other/b.b3dm")
        );
        assert_eq!(
            relative_to(Path::new("/root"), Path::new("/root")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn test_rewrite_from_root_document_is_unchanged() {
        let root = Path::new("/data/tileset");
        assert_eq!(rewrite(root, root, "parent.b3dm"), "parent.b3dm");
        assert_eq!(rewrite(root, root, "./ll/0.b3dm"), "ll/0.b3dm");
    }

    #[test]
    fn test_rewrite_from_nested_document() {
        let root = Path::new("/data/tileset");
        let origin = Path::new("/data/tileset/tileset3");
        assert_eq!(rewrite(root, origin, "ll.b3dm"), "tileset3/ll.b3dm");
    }

    #[test]
    fn test_rewrite_escaping_nested_directory() {
        let root = Path::new("/data/tileset");
        let origin = Path::new("/data/tileset/a/b");
        assert_eq!(rewrite(root, origin, "../../shared/t.b3dm"), "shared/t.b3dm");
        assert_eq!(rewrite(root, origin, "../../../x.b3dm"), "../x.b3dm");
    }

    #[test]
    fn test_rewrite_normalizes_backslashes() {
        let root = Path::new("/data/tileset");
        let origin = Path::new("/data/tileset/sub");
        assert_eq!(rewrite(root, origin, "lod\\0.b3dm"), "sub/lod/0.b3dm");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    proptest! {
        /// Joining the rewritten url onto the root reaches the same file as
        /// joining the original url onto its origin directory.
        #[test]
        fn prop_rewrite_resolves_to_same_file(
            root in prop::collection::vec(segment(), 1..4),
            origin in prop::collection::vec(segment(), 0..4),
            ups in 0usize..3,
            tail in prop::collection::vec(segment(), 1..4),
        ) {
            let root_dir = PathBuf::from("/").join(root.join("/"));
            let origin_dir = root_dir.join(origin.join("/"));
            let url = format!("{}{}.b3dm", "../".repeat(ups), tail.join("/"));

            let rewritten = rewrite(&root_dir, &origin_dir, &url);

            prop_assert!(!rewritten.contains('\\'));
            prop_assert_eq!(
                normalize(&root_dir.join(&rewritten)),
                normalize(&origin_dir.join(&url))
            );
        }

        #[test]
        fn prop_rewrite_is_deterministic(
            origin in prop::collection::vec(segment(), 0..4),
            tail in segment(),
        ) {
            let root_dir = Path::new("/r");
            let origin_dir = root_dir.join(origin.join("/"));
            let url = format!("{}.pnts", tail);
            prop_assert_eq!(
                rewrite(root_dir, &origin_dir, &url),
                rewrite(root_dir, &origin_dir, &url)
            );
        }
    }
}
