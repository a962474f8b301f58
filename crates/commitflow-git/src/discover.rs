use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Walk `root` for git repositories, pruning directories named in
/// `exclude`. A repository's own subtree is not descended into, so nested
/// repos (vendored checkouts) are not reported.
pub fn find_repos(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let mut repos = Vec::new();
    let mut walker = WalkDir::new(root).follow_links(false).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable directories are skipped, not fatal.
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.depth() > 0 {
            let name = entry.file_name().to_string_lossy();
            if exclude.iter().any(|excluded| excluded == &name) {
                walker.skip_current_dir();
                continue;
            }
        }
        if entry.path().join(".git").is_dir() {
            repos.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    repos
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkrepo(root: &Path, rel: &str) {
        std::fs::create_dir_all(root.join(rel).join(".git")).unwrap();
    }

    #[test]
    fn finds_repos_and_skips_their_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        mkrepo(dir.path(), "projects/alpha");
        mkrepo(dir.path(), "projects/alpha/vendor/nested");
        mkrepo(dir.path(), "beta");

        let mut repos = find_repos(dir.path(), &[]);
        repos.sort();

        assert_eq!(
            repos,
            vec![dir.path().join("beta"), dir.path().join("projects/alpha")]
        );
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        mkrepo(dir.path(), "node_modules/some-pkg");
        mkrepo(dir.path(), "work/gamma");

        let repos = find_repos(dir.path(), &["node_modules".to_string()]);

        assert_eq!(repos, vec![dir.path().join("work/gamma")]);
    }

    #[test]
    fn empty_tree_yields_no_repos() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_repos(dir.path(), &[]).is_empty());
    }
}
