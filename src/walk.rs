use crate::error::QueryError;
use crate::languages;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walk a directory and collect every source file the source provider can lower.
/// Respects .gitignore, .ignore, and global gitignore rules.
pub fn walk_directory(
    path: &Path,
    max_depth: Option<usize>,
    ext_filter: &[String],
) -> Result<Vec<PathBuf>, QueryError> {
    if !path.is_dir() {
        return Err(QueryError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut builder = WalkBuilder::new(path);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_path(|a, b| a.cmp(b));

    // ignore counts the root as depth 0, ours counts levels below it.
    if let Some(d) = max_depth {
        builder.max_depth(Some(d + 1));
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|e| QueryError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        })?;

        let entry_path = entry.path();
        if !entry_path.is_file() || !languages::is_supported_file(entry_path) {
            continue;
        }
        if !ext_filter.is_empty() {
            let ext = entry_path.extension().and_then(|e| e.to_str());
            if !ext.is_some_and(|ext| ext_filter.iter().any(|f| f == ext)) {
                continue;
            }
        }
        files.push(entry_path.to_path_buf());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_empty_directory() {
        let dir = TempDir::new().unwrap();
        let files = walk_directory(dir.path(), None, &[]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn walk_skips_unsupported_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lib.rs"), "pub struct A;").unwrap();
        fs::write(dir.path().join("tree.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.md"), "# hi").unwrap();
        let files = walk_directory(dir.path(), None, &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lib.rs"));
    }

    #[test]
    fn walk_depth_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("top.rs"), "").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.ts"), "").unwrap();
        assert_eq!(walk_directory(dir.path(), Some(0), &[]).unwrap().len(), 1);
        assert_eq!(walk_directory(dir.path(), Some(1), &[]).unwrap().len(), 2);
    }

    #[test]
    fn walk_sorted_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("z.rs"), "").unwrap();
        fs::write(dir.path().join("a.ts"), "").unwrap();
        let files = walk_directory(dir.path(), None, &[]).unwrap();
        assert!(files[0] < files[1]);
    }

    #[test]
    fn walk_nonexistent_dir() {
        assert!(walk_directory(Path::new("/nonexistent_dir_xyz"), None, &[]).is_err());
    }

    #[test]
    fn walk_respects_gitignore_and_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        fs::write(dir.path().join("keep.rs"), "").unwrap();
        fs::create_dir(dir.path().join("generated")).unwrap();
        fs::write(dir.path().join("generated/skip.rs"), "").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden/secret.rs"), "").unwrap();
        let files = walk_directory(dir.path(), None, &[]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.rs"));
    }

    #[test]
    fn walk_ext_filter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();
        fs::write(dir.path().join("app.ts"), "").unwrap();
        fs::write(dir.path().join("view.tsx"), "").unwrap();
        let exts = vec!["rs".to_string(), "tsx".to_string()];
        assert_eq!(walk_directory(dir.path(), None, &exts).unwrap().len(), 2);
    }
}
