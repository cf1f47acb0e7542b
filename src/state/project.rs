//! Session folder and the image items it contains.

use std::path::{Path, PathBuf};

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"];

/// Check if a path has a supported image extension
fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Errors that can occur while scanning a folder.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Folder could not be read
    #[error("Failed to read folder {path:?}: {source}")]
    ReadFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Folder contains no supported images
    #[error("No image files found in {path:?}")]
    NoImages { path: PathBuf },
}

/// The folder selected for the session and the items found in it.
#[derive(Clone, Debug, Default)]
pub struct ProjectState {
    /// Path to the selected folder
    pub folder: PathBuf,
    /// Item identifiers, relative to `folder`, sorted
    items: Vec<String>,
}

impl ProjectState {
    /// Use `folder` without scanning it.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            items: Vec::new(),
        }
    }

    /// Discover image files in a folder, non-recursively.
    pub fn from_folder(folder: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let folder = folder.into();
        let mut images = Vec::new();
        scan_folder(&folder, &mut images, false)?;
        Self::with_images(folder, images)
    }

    /// Discover image files in a folder and all its subfolders.
    pub fn from_folder_recursive(folder: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let folder = folder.into();
        let mut images = Vec::new();
        scan_folder(&folder, &mut images, true)?;
        Self::with_images(folder, images)
    }

    fn with_images(folder: PathBuf, images: Vec<PathBuf>) -> Result<Self, ProjectError> {
        let mut items: Vec<String> = images
            .iter()
            .filter_map(|path| path.strip_prefix(&folder).ok())
            .filter_map(|relative| relative.to_str())
            .map(|relative| relative.replace('\\', "/"))
            .collect();

        if items.is_empty() {
            return Err(ProjectError::NoImages { path: folder });
        }

        // Sort by relative path for consistent ordering
        items.sort();

        log::info!("Scanned folder {:?}: found {} images", folder, items.len());

        Ok(Self { folder, items })
    }

    /// Item identifiers available in the folder.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Check if `item` was found by the last scan.
    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }
}

fn scan_folder(
    folder: &Path,
    images: &mut Vec<PathBuf>,
    recursive: bool,
) -> Result<(), ProjectError> {
    let entries = std::fs::read_dir(folder).map_err(|source| ProjectError::ReadFolder {
        path: folder.to_path_buf(),
        source,
    })?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();

        if path.is_file() && is_image_file(&path) {
            images.push(path);
        } else if recursive && path.is_dir() {
            if let Err(e) = scan_folder(&path, images, true) {
                log::warn!("Failed to scan subdirectory {:?}: {}", path, e);
                // Continue scanning other directories
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.PNG")));
        assert!(is_image_file(Path::new("dir/scan.tiff")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_from_folder_lists_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"").unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c.png"), b"").unwrap();

        let project = ProjectState::from_folder(dir.path()).unwrap();
        assert_eq!(project.items(), ["a.png", "b.jpg"]);
        assert!(project.contains("a.png"));
        assert!(!project.contains("readme.md"));

        let recursive = ProjectState::from_folder_recursive(dir.path()).unwrap();
        assert_eq!(recursive.items(), ["a.png", "b.jpg", "sub/c.png"]);
    }

    #[test]
    fn test_from_folder_without_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"").unwrap();
        assert!(matches!(
            ProjectState::from_folder(dir.path()),
            Err(ProjectError::NoImages { .. })
        ));
    }

    #[test]
    fn test_from_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProjectState::from_folder(dir.path().join("nope")),
            Err(ProjectError::ReadFolder { .. })
        ));
    }
}
