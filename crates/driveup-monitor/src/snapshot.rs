//! Directory snapshot helpers
//!
//! The monitor detects new files by comparing full directory listings
//! between poll cycles, not by subscribing to filesystem events. A
//! snapshot is the raw set of entry names in the folder; subdirectories
//! are included (upload validation filters them out later), and the set
//! is replaced wholesale each cycle.

use std::collections::HashSet;
use std::path::Path;

/// Reads the names of all entries in `dir` into a set
///
/// # Errors
/// Propagates the I/O error if the directory cannot be read (missing,
/// deleted, or permission denied).
pub async fn read_names(dir: &Path) -> std::io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Returns the entries present in `current` but not in `known`
///
/// Iteration order of the result is unspecified.
pub fn new_entries(current: &HashSet<String>, known: &HashSet<String>) -> Vec<String> {
    current.difference(known).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_names_lists_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("b.png"), b"b").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let names = read_names(dir.path()).await.unwrap();
        assert_eq!(names.len(), 3);
        assert!(names.contains("a.txt"));
        assert!(names.contains("b.png"));
        assert!(names.contains("nested"));
    }

    #[tokio::test]
    async fn test_read_names_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let names = read_names(dir.path()).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_read_names_missing_dir_is_error() {
        let result = read_names(Path::new("/nonexistent/driveup-test")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_new_entries_difference() {
        let known: HashSet<String> = ["a.txt", "b.txt"].iter().map(|s| s.to_string()).collect();
        let current: HashSet<String> = ["a.txt", "b.txt", "c.txt", "d.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut new = new_entries(&current, &known);
        new.sort();
        assert_eq!(new, vec!["c.txt".to_string(), "d.txt".to_string()]);
    }

    #[test]
    fn test_new_entries_unchanged_is_empty() {
        let names: HashSet<String> = ["a.txt", "b.txt"].iter().map(|s| s.to_string()).collect();
        assert!(new_entries(&names, &names).is_empty());
    }

    #[test]
    fn test_new_entries_ignores_removals() {
        let known: HashSet<String> = ["a.txt", "b.txt"].iter().map(|s| s.to_string()).collect();
        let current: HashSet<String> = ["a.txt"].iter().map(|s| s.to_string()).collect();
        assert!(new_entries(&current, &known).is_empty());
    }
}
