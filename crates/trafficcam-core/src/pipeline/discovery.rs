//! File discovery for finding camera images in a directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::InputConfig;

/// Discovers image files directly inside a directory (no recursion).
pub struct FileDiscovery {
    config: InputConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: InputConfig) -> Self {
        Self { config }
    }

    /// Discover all matching image files at a path.
    ///
    /// If path is a file, returns it if it matches the extension filter.
    /// If path is a directory, returns matching files directly inside it.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {e}", path);
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has one of the configured extensions.
    fn is_supported(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.config.extensions.iter().any(|wanted| {
            if self.config.case_sensitive {
                wanted == ext
            } else {
                wanted.eq_ignore_ascii_case(ext)
            }
        })
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_case_sensitive_by_default() {
        let discovery = FileDiscovery::new(InputConfig::default());

        assert!(discovery.is_supported(Path::new("cam.jpg")));
        assert!(!discovery.is_supported(Path::new("cam.JPG")));
        assert!(!discovery.is_supported(Path::new("cam.jpeg")));
        assert!(!discovery.is_supported(Path::new("cam.png")));
        assert!(!discovery.is_supported(Path::new("jpg")));
    }

    #[test]
    fn test_is_supported_case_insensitive() {
        let config = InputConfig {
            case_sensitive: false,
            extensions: vec!["jpg".to_string(), "png".to_string()],
            ..InputConfig::default()
        };
        let discovery = FileDiscovery::new(config);

        assert!(discovery.is_supported(Path::new("cam.JPG")));
        assert!(discovery.is_supported(Path::new("cam.Png")));
        assert!(!discovery.is_supported(Path::new("cam.txt")));
    }

    #[test]
    fn test_discover_is_flat_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"aa").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.jpg"), b"c").unwrap();

        let files = FileDiscovery::new(InputConfig::default()).discover(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.jpg"]);
        assert_eq!(FileDiscovery::total_size(&files), 3);
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = FileDiscovery::new(InputConfig::default()).discover(dir.path());
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cam.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let files = FileDiscovery::new(InputConfig::default()).discover(&path);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 4);
    }
}
