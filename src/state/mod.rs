//! Session state: folder, current image and annotations.

mod annotations;
mod image;
mod project;

pub use annotations::{AnnotationProvider, AnnotationStore};
pub use image::{ImageError, ImageObject, ImageProvider, ImageState};
pub use project::{IMAGE_EXTENSIONS, ProjectError, ProjectState};
