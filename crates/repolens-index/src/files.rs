//! Source tree enumeration and extension filtering.

use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &["pp", "yaml", "yml", "erb", "epp", "md", "txt"];

/// Extension allow-list, compared case-insensitively and without the dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    extensions: Vec<String>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl FileFilter {
    /// Leading dots are stripped, so `".md"` and `"md"` are equivalent.
    #[must_use]
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: Vec<String> = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        extensions.sort();
        extensions.dedup();
        Self { extensions }
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
    }
}

/// Every regular file under `root` accepted by `filter`, in a stable order.
///
/// Hidden files and directories (name starting with `.`) are skipped. Ignore
/// files such as `.gitignore` are not consulted. Paths that cannot be stored as
/// one progress log line (not UTF-8, or containing a line break) are skipped
/// with a warning.
#[must_use]
pub fn collect_files(root: &Path, filter: &FileFilter) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(root)
        .hidden(true)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(std::cmp::Ord::cmp)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()) && filter.accepts(e.path()))
        .map(ignore::DirEntry::into_path)
        .filter(|path| {
            let loggable = is_loggable(root, path);
            if !loggable {
                tracing::warn!(path = %path.display(), "skipping file with unsupported name");
            }
            loggable
        })
        .collect()
}

fn is_loggable(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_str()
        .is_some_and(|rel| !rel.contains(['\n', '\r']))
}

/// `path` relative to `root`, with `/` separators.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn filter_normalizes_extensions() {
        let filter = FileFilter::new([".MD", "yaml", " txt ", ""]);
        assert_eq!(filter.extensions(), ["md", "txt", "yaml"]);
        assert!(filter.accepts(Path::new("README.Md")));
        assert!(!filter.accepts(Path::new("main.rs")));
        assert!(!filter.accepts(Path::new("Makefile")));
    }

    #[test]
    fn default_filter_covers_config_formats() {
        let filter = FileFilter::default();
        for name in ["init.pp", "a.yaml", "b.yml", "t.erb", "t.epp", "README.md", "n.txt"] {
            assert!(filter.accepts(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn collect_skips_hidden_and_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "manifests/init.pp");
        touch(root, "README.md");
        touch(root, "src/main.rs");
        touch(root, ".hidden.md");
        touch(root, ".git/config.yaml");
        touch(root, "modules/.cache/notes.txt");

        let files = collect_files(root, &FileFilter::default());
        let rel: Vec<String> = files.iter().map(|p| relative_path(root, p)).collect();
        assert_eq!(rel, vec!["README.md", "manifests/init.pp"]);
    }

    #[test]
    fn collect_ignores_gitignore_rules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(".gitignore"), "*.md\n").unwrap();
        touch(root, "doc.md");

        let files = collect_files(root, &FileFilter::default());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn collect_missing_root_is_empty() {
        let files = collect_files(Path::new("/nonexistent/repolens/root"), &FileFilter::default());
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn collect_skips_names_that_break_log_lines() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "ok.md");
        touch(root, "odd\nname.md");
        touch(root, "carriage\rreturn.md");
        fs::write(root.join(OsStr::from_bytes(b"latin\xe9.md")), "x").unwrap();

        let files = collect_files(root, &FileFilter::default());
        let rel: Vec<String> = files.iter().map(|p| relative_path(root, p)).collect();
        assert_eq!(rel, vec!["ok.md"]);
    }

    #[test]
    fn relative_path_uses_forward_slashes() {
        let root = Path::new("/repo");
        assert_eq!(relative_path(root, Path::new("/repo/a/b.md")), "a/b.md");
    }
}
