//! Asset file scanner
//!
//! Lists the rendered clips or diagrams directly inside one
//! `<method>/<attribute>/` folder. Listing is sorted by filename so that
//! everything downstream (bucket order, random draws, ids) is independent
//! of filesystem iteration order.

use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Kind of asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Rendered clip (`.mp4`)
    Video,
    /// Context diagram (`.png`)
    Image,
}

impl AssetKind {
    pub fn extension(&self) -> &'static str {
        match self {
            AssetKind::Video => "mp4",
            AssetKind::Image => "png",
        }
    }
}

/// Asset scanner
pub struct AssetScanner {
    ignore_patterns: Vec<String>,
}

impl AssetScanner {
    /// Create new scanner with default ignore patterns
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, and editor/OS
    /// sidecar files starting with `._`.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                "._".to_string(),
            ],
        }
    }

    /// Files of `kind` directly inside `dir`, sorted by filename
    pub fn scan(&self, dir: &Path, kind: AssetKind) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_extension(entry.path(), kind) {
                        files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            count = files.len(),
            "Scanned {} files",
            kind.extension()
        );

        Ok(files)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|pattern| file_name.starts_with(pattern.as_str()) || file_name == pattern.as_str())
    }

    /// Case-insensitive extension check
    fn has_extension(&self, path: &Path, kind: AssetKind) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(kind.extension()))
            .unwrap_or(false)
    }
}

impl Default for AssetScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_nonexistent_path() {
        let scanner = AssetScanner::new();
        let result = scanner.scan(Path::new("/nonexistent/path"), AssetKind::Video);
        match result.unwrap_err() {
            ScanError::PathNotFound(_) => {}
            other => panic!("Expected PathNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_file_as_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.mp4");
        fs::write(&file, b"").unwrap();

        let scanner = AssetScanner::new();
        match scanner.scan(&file, AssetKind::Video).unwrap_err() {
            ScanError::NotADirectory(_) => {}
            other => panic!("Expected NotADirectory error, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_sorted_filtered_single_level() {
        let dir = TempDir::new().unwrap();
        for name in ["c_high.mp4", "a_low.mp4", "b.MP4", "notes.txt", "diagram.png", "._a_low.mp4"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("z_high.mp4"), b"").unwrap();

        let scanner = AssetScanner::new();
        let names: Vec<String> = scanner
            .scan(dir.path(), AssetKind::Video)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_low.mp4", "b.MP4", "c_high.mp4"]);

        let images = scanner.scan(dir.path(), AssetKind::Image).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = AssetScanner::new();
        assert!(scanner.scan(dir.path(), AssetKind::Video).unwrap().is_empty());
    }
}
