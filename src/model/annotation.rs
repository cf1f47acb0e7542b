//! Annotation geometry and the time-range action type.
//!
//! Lines, boxes and polygons live on the canvas; actions are labelled time
//! intervals shown in a side list. Every annotation carries an id allocated
//! by the store it lives in.

use serde::{Deserialize, Serialize};

/// Unique identifier for an annotation within a store.
pub type AnnotationId = u64;

/// Minimum number of points for a valid line.
pub const MIN_LINE_POINTS: usize = 2;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum size (width/height) for a valid bounding box.
pub const MIN_BBOX_SIZE: f32 = 1.0;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A polyline annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: AnnotationId,
    /// Points in drawing order.
    pub points: Vec<Point>,
}

/// An axis-aligned rectangle annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: AnnotationId,
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A closed polygon annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub id: AnnotationId,
    /// The vertices in order; the last one connects back to the first.
    pub vertices: Vec<Point>,
}

/// A labelled time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: AnnotationId,
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Fields of an action before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// Label given to actions created from the page.
pub const NEW_ACTION_LABEL: &str = "New Action";

/// Placeholder start/end time for actions created from the page.
pub const NEW_ACTION_TIME: f64 = 999.0;

impl ActionTemplate {
    pub fn new(label: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            label: label.into(),
            start_time,
            end_time,
        }
    }

    /// The action appended by the "add action" button.
    pub fn new_action() -> Self {
        Self::new(NEW_ACTION_LABEL, NEW_ACTION_TIME, NEW_ACTION_TIME)
    }

    /// Check that both times are finite and the interval is not reversed.
    pub fn validate(&self) -> Result<(), AnnotationError> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(AnnotationError::InvalidTimeRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.end_time < self.start_time {
            return Err(AnnotationError::InvalidTimeRange {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }
}

/// Which collection an annotation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Line,
    Box,
    Polygon,
    Action,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Line => "line",
            ElementKind::Box => "box",
            ElementKind::Polygon => "polygon",
            ElementKind::Action => "action",
        }
    }

    /// Parse the lowercase name produced by [`ElementKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "line" => Some(ElementKind::Line),
            "box" => Some(ElementKind::Box),
            "polygon" => Some(ElementKind::Polygon),
            "action" => Some(ElementKind::Action),
            _ => None,
        }
    }
}

/// Reference to a single annotation, used for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: AnnotationId,
}

impl ElementRef {
    pub fn new(kind: ElementKind, id: AnnotationId) -> Self {
        Self { kind, id }
    }

    pub fn line(id: AnnotationId) -> Self {
        Self::new(ElementKind::Line, id)
    }

    pub fn bbox(id: AnnotationId) -> Self {
        Self::new(ElementKind::Box, id)
    }

    pub fn polygon(id: AnnotationId) -> Self {
        Self::new(ElementKind::Polygon, id)
    }

    pub fn action(id: AnnotationId) -> Self {
        Self::new(ElementKind::Action, id)
    }
}

/// Errors raised when creating or editing annotations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// No image has been loaded into the store yet
    #[error("No image is loaded")]
    NoImageLoaded,

    /// Not enough points for the shape
    #[error("A {kind} needs at least {required} points, got {got}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        got: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("Coordinates must be finite")]
    NonFiniteCoordinate,

    /// Box is smaller than the minimum size
    #[error("Bounding box {width}x{height} is too small")]
    BoxTooSmall { width: f32, height: f32 },

    /// Action interval is reversed or not finite
    #[error("Invalid time range {start}..{end}")]
    InvalidTimeRange { start: f64, end: f64 },

    /// No annotation with this id in the collection
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: AnnotationId },
}

/// Validate the points of a new line.
pub fn validate_line(points: &[Point]) -> Result<(), AnnotationError> {
    validate_points("line", points, MIN_LINE_POINTS)
}

/// Validate the vertices of a new polygon.
pub fn validate_polygon(vertices: &[Point]) -> Result<(), AnnotationError> {
    validate_points("polygon", vertices, MIN_POLYGON_VERTICES)
}

fn validate_points(
    kind: &'static str,
    points: &[Point],
    required: usize,
) -> Result<(), AnnotationError> {
    if points.len() < required {
        return Err(AnnotationError::TooFewPoints {
            kind,
            required,
            got: points.len(),
        });
    }
    if !points.iter().all(Point::is_finite) {
        return Err(AnnotationError::NonFiniteCoordinate);
    }
    Ok(())
}

/// Normalize two corners into `(x, y, width, height)`.
///
/// Fails if either side is not larger than [`MIN_BBOX_SIZE`].
pub fn box_from_corners(p1: Point, p2: Point) -> Result<(f32, f32, f32, f32), AnnotationError> {
    if !p1.is_finite() || !p2.is_finite() {
        return Err(AnnotationError::NonFiniteCoordinate);
    }
    let x = p1.x.min(p2.x);
    let y = p1.y.min(p2.y);
    let width = (p1.x - p2.x).abs();
    let height = (p1.y - p2.y).abs();

    if width > MIN_BBOX_SIZE && height > MIN_BBOX_SIZE {
        Ok((x, y, width, height))
    } else {
        Err(AnnotationError::BoxTooSmall { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_from_corners_normalizes() {
        let a = box_from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0)).unwrap();
        let b = box_from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0)).unwrap();
        assert_eq!(a, (10.0, 20.0, 40.0, 60.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_box_from_corners_too_small() {
        let err = box_from_corners(Point::new(10.0, 10.0), Point::new(10.5, 40.0)).unwrap_err();
        assert!(matches!(err, AnnotationError::BoxTooSmall { .. }));
    }

    #[test]
    fn test_validate_line_and_polygon() {
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(validate_line(&two).is_ok());
        assert_eq!(
            validate_polygon(&two),
            Err(AnnotationError::TooFewPoints {
                kind: "polygon",
                required: 3,
                got: 2
            })
        );
        assert_eq!(
            validate_line(&[Point::new(0.0, 0.0), Point::new(f32::NAN, 1.0)]),
            Err(AnnotationError::NonFiniteCoordinate)
        );
    }

    #[test]
    fn test_new_action_template() {
        let template = ActionTemplate::new_action();
        assert_eq!(template.label, "New Action");
        assert_eq!(template.start_time, 999.0);
        assert_eq!(template.end_time, 999.0);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_action_template_rejects_reversed_range() {
        assert!(ActionTemplate::new("x", 5.0, 1.0).validate().is_err());
        assert!(ActionTemplate::new("x", f64::NAN, 1.0).validate().is_err());
        assert!(ActionTemplate::new("x", 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_element_kind_names() {
        for kind in [
            ElementKind::Line,
            ElementKind::Box,
            ElementKind::Polygon,
            ElementKind::Action,
        ] {
            assert_eq!(ElementKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ElementKind::from_name("circle"), None);
    }
}
