//! Current image and active canvas tool.

use std::path::{Path, PathBuf};

use crate::model::CanvasTool;
use crate::state::AnnotationProvider;

/// Metadata for the image shown on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageObject {
    /// Absolute path of the image file
    pub path: PathBuf,
    /// Item identifier the image was opened with
    pub name: String,
    /// Pixel size read from the file header, if it could be read
    pub dimensions: Option<(u32, u32)>,
}

/// Errors that can occur when initializing an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Image file does not exist
    #[error("Image not found: {path:?}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Not a file: {path:?}")]
    NotAFile { path: PathBuf },
}

/// Image operations the item page depends on.
pub trait ImageProvider {
    /// The active canvas tool, if one has been chosen.
    fn selected_tool(&self) -> Option<CanvasTool>;

    /// Set the active canvas tool.
    fn set_selected_tool(&mut self, tool: CanvasTool);

    /// The image currently shown, if any.
    fn current_image(&self) -> Option<&ImageObject>;

    /// Load `path` as the current image and point `annotations` at it.
    ///
    /// `name` is the item identifier used as the annotation key.
    fn init_image(
        &mut self,
        path: &Path,
        name: &str,
        annotations: &mut dyn AnnotationProvider,
    ) -> Result<&ImageObject, ImageError>;
}

/// Default image provider backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct ImageState {
    selected_tool: Option<CanvasTool>,
    current_image: Option<ImageObject>,
}

impl ImageState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a tool already selected.
    pub fn with_tool(tool: CanvasTool) -> Self {
        Self {
            selected_tool: Some(tool),
            current_image: None,
        }
    }
}

/// Read pixel dimensions from the image header without decoding pixels.
fn probe_dimensions(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            log::warn!("Could not read dimensions of {:?}: {}", path, e);
            None
        }
    }
}

impl ImageProvider for ImageState {
    fn selected_tool(&self) -> Option<CanvasTool> {
        self.selected_tool
    }

    fn set_selected_tool(&mut self, tool: CanvasTool) {
        if self.selected_tool != Some(tool) {
            log::debug!("Canvas tool: {:?} -> {:?}", self.selected_tool, tool);
        }
        self.selected_tool = Some(tool);
    }

    fn current_image(&self) -> Option<&ImageObject> {
        self.current_image.as_ref()
    }

    fn init_image(
        &mut self,
        path: &Path,
        name: &str,
        annotations: &mut dyn AnnotationProvider,
    ) -> Result<&ImageObject, ImageError> {
        annotations.load_image(name);
        self.current_image = None;

        if !path.exists() {
            return Err(ImageError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ImageError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let dimensions = probe_dimensions(path);
        log::info!("Loaded image {:?} ({:?})", path, dimensions);

        Ok(&*self.current_image.insert(ImageObject {
            path: path.to_path_buf(),
            name: name.to_string(),
            dimensions,
        }))
    }
}
