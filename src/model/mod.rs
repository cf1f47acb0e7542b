//! Data models for the annotation page.

mod annotation;
mod tool;

pub use annotation::{
    Action, ActionTemplate, AnnotationError, AnnotationId, BoundingBox, ElementKind, ElementRef,
    Line, MIN_BBOX_SIZE, MIN_LINE_POINTS, MIN_POLYGON_VERTICES, NEW_ACTION_LABEL,
    NEW_ACTION_TIME, Point, Polygon, box_from_corners, validate_line, validate_polygon,
};
pub use tool::CanvasTool;
