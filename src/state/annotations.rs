//! Annotation storage for the images of a session.
//!
//! The store keeps one set of collections per image and tracks which image is
//! current. It also owns the session's selected element, so selection is
//! referenced by kind and id rather than by object identity.

use std::collections::HashMap;

use crate::model::{
    Action, ActionTemplate, AnnotationError, AnnotationId, BoundingBox, ElementKind, ElementRef,
    Line, Point, Polygon, box_from_corners, validate_line, validate_polygon,
};

/// Annotation operations the item page depends on.
pub trait AnnotationProvider {
    /// Make `key` the current image, creating empty collections if needed.
    fn load_image(&mut self, key: &str);

    /// Key of the current image, if any.
    fn current_image(&self) -> Option<&str>;

    /// Snapshot of the current image's lines.
    fn lines(&self) -> Vec<Line>;

    /// Snapshot of the current image's boxes.
    fn boxes(&self) -> Vec<BoundingBox>;

    /// Snapshot of the current image's polygons.
    fn polygons(&self) -> Vec<Polygon>;

    /// Snapshot of the current image's actions.
    fn actions(&self) -> Vec<Action>;

    /// Remove a line. Returns false if no line has this id.
    fn remove_line(&mut self, id: AnnotationId) -> bool;

    /// Remove a box. Returns false if no box has this id.
    fn remove_box(&mut self, id: AnnotationId) -> bool;

    /// Remove a polygon. Returns false if no polygon has this id.
    fn remove_polygon(&mut self, id: AnnotationId) -> bool;

    /// Append an action and return its id.
    fn add_action(&mut self, template: ActionTemplate) -> Result<AnnotationId, AnnotationError>;

    /// Replace the label and times of an existing action.
    fn update_action(
        &mut self,
        id: AnnotationId,
        template: ActionTemplate,
    ) -> Result<(), AnnotationError>;

    /// Remove an action. Returns false if no action has this id.
    fn remove_action(&mut self, id: AnnotationId) -> bool;

    /// The selected element, if any.
    fn selected(&self) -> Option<ElementRef>;

    /// Replace the selection.
    fn select(&mut self, element: Option<ElementRef>);
}

/// Collections for a single image.
#[derive(Debug, Clone, Default)]
struct ImageAnnotations {
    lines: Vec<Line>,
    boxes: Vec<BoundingBox>,
    polygons: Vec<Polygon>,
    actions: Vec<Action>,
}

/// In-memory annotation store for a session.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    images: HashMap<String, ImageAnnotations>,
    current: Option<String>,
    /// Counter for generating unique annotation IDs.
    next_id: AnnotationId,
    selected: Option<ElementRef>,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            current: None,
            next_id: 1,
            selected: None,
        }
    }

    fn allocate_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn current_ref(&self) -> Option<&ImageAnnotations> {
        self.current.as_ref().and_then(|key| self.images.get(key))
    }

    fn current_mut(&mut self) -> Option<&mut ImageAnnotations> {
        match &self.current {
            Some(key) => self.images.get_mut(key),
            None => None,
        }
    }

    fn require_current(&self) -> Result<(), AnnotationError> {
        if self.current_ref().is_some() {
            Ok(())
        } else {
            Err(AnnotationError::NoImageLoaded)
        }
    }

    /// Add a line to the current image.
    pub fn add_line(&mut self, points: Vec<Point>) -> Result<AnnotationId, AnnotationError> {
        validate_line(&points)?;
        self.require_current()?;
        let id = self.allocate_id();
        if let Some(image) = self.current_mut() {
            image.lines.push(Line { id, points });
        }
        log::debug!("Added line {}", id);
        Ok(id)
    }

    /// Add a box spanning two corners to the current image.
    pub fn add_box(&mut self, p1: Point, p2: Point) -> Result<AnnotationId, AnnotationError> {
        let (x, y, width, height) = box_from_corners(p1, p2)?;
        self.require_current()?;
        let id = self.allocate_id();
        if let Some(image) = self.current_mut() {
            image.boxes.push(BoundingBox {
                id,
                x,
                y,
                width,
                height,
            });
        }
        log::debug!("Added box {} ({}x{})", id, width, height);
        Ok(id)
    }

    /// Add a polygon to the current image.
    pub fn add_polygon(&mut self, vertices: Vec<Point>) -> Result<AnnotationId, AnnotationError> {
        validate_polygon(&vertices)?;
        self.require_current()?;
        let id = self.allocate_id();
        if let Some(image) = self.current_mut() {
            image.polygons.push(Polygon { id, vertices });
        }
        log::debug!("Added polygon {}", id);
        Ok(id)
    }

    /// Drop the selection if it points at the removed element.
    fn forget_selection(&mut self, element: ElementRef) {
        if self.selected == Some(element) {
            log::debug!("Cleared selection of removed {} {}", element.kind.name(), element.id);
            self.selected = None;
        }
    }

    fn remove_element(&mut self, kind: ElementKind, id: AnnotationId) -> bool {
        let Some(image) = self.current_mut() else {
            return false;
        };
        let removed = match kind {
            ElementKind::Line => remove_by_id(&mut image.lines, id, |l| l.id),
            ElementKind::Box => remove_by_id(&mut image.boxes, id, |b| b.id),
            ElementKind::Polygon => remove_by_id(&mut image.polygons, id, |p| p.id),
            ElementKind::Action => remove_by_id(&mut image.actions, id, |a| a.id),
        };
        if removed {
            log::debug!("Removed {} {}", kind.name(), id);
            self.forget_selection(ElementRef::new(kind, id));
        }
        removed
    }
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: AnnotationId,
    id_of: impl Fn(&T) -> AnnotationId,
) -> bool {
    match items.iter().position(|item| id_of(item) == id) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

impl AnnotationProvider for AnnotationStore {
    fn load_image(&mut self, key: &str) {
        self.images.entry(key.to_string()).or_default();
        self.current = Some(key.to_string());
        log::debug!("Annotation store switched to {:?}", key);
    }

    fn current_image(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn lines(&self) -> Vec<Line> {
        self.current_ref().map(|i| i.lines.clone()).unwrap_or_default()
    }

    fn boxes(&self) -> Vec<BoundingBox> {
        self.current_ref().map(|i| i.boxes.clone()).unwrap_or_default()
    }

    fn polygons(&self) -> Vec<Polygon> {
        self.current_ref()
            .map(|i| i.polygons.clone())
            .unwrap_or_default()
    }

    fn actions(&self) -> Vec<Action> {
        self.current_ref()
            .map(|i| i.actions.clone())
            .unwrap_or_default()
    }

    fn remove_line(&mut self, id: AnnotationId) -> bool {
        self.remove_element(ElementKind::Line, id)
    }

    fn remove_box(&mut self, id: AnnotationId) -> bool {
        self.remove_element(ElementKind::Box, id)
    }

    fn remove_polygon(&mut self, id: AnnotationId) -> bool {
        self.remove_element(ElementKind::Polygon, id)
    }

    fn add_action(&mut self, template: ActionTemplate) -> Result<AnnotationId, AnnotationError> {
        template.validate()?;
        self.require_current()?;
        let id = self.allocate_id();
        if let Some(image) = self.current_mut() {
            image.actions.push(Action {
                id,
                label: template.label,
                start_time: template.start_time,
                end_time: template.end_time,
            });
        }
        log::debug!("Added action {}", id);
        Ok(id)
    }

    fn update_action(
        &mut self,
        id: AnnotationId,
        template: ActionTemplate,
    ) -> Result<(), AnnotationError> {
        template.validate()?;
        let image = self.current_mut().ok_or(AnnotationError::NoImageLoaded)?;
        let action = image
            .actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AnnotationError::NotFound { kind: "action", id })?;
        action.label = template.label;
        action.start_time = template.start_time;
        action.end_time = template.end_time;
        log::debug!("Updated action {}", id);
        Ok(())
    }

    fn remove_action(&mut self, id: AnnotationId) -> bool {
        self.remove_element(ElementKind::Action, id)
    }

    fn selected(&self) -> Option<ElementRef> {
        self.selected
    }

    fn select(&mut self, element: Option<ElementRef>) {
        if self.selected != element {
            log::debug!("Selection changed: {:?} -> {:?}", self.selected, element);
            self.selected = element;
        }
    }
}
