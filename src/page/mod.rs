//! The item page: one image with its annotations and the canvas tool state.
//!
//! An [`ItemPage`] is opened on a [`Session`] and hands it back on
//! [`ItemPage::close`]. Everything that must outlive a single page (the
//! selected element, the active tool, the event observers) lives in the
//! session, so reopening a page picks up where the last one left off.
//!
//! The page keeps snapshots of the four annotation collections. They are
//! refreshed when the page opens and after each mutation made through the
//! page; changes made directly on the providers need
//! [`ItemPage::refresh_annotations`].

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::events::{EventBus, PageEvent};
use crate::keybindings::HotkeyBindings;
use crate::model::{
    Action, ActionTemplate, AnnotationError, AnnotationId, BoundingBox, CanvasTool, ElementRef,
    Line, Polygon,
};
use crate::state::{
    AnnotationProvider, AnnotationStore, ImageObject, ImageProvider, ImageState, ProjectState,
};


/// Navigation parameters passed to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavParams {
    /// Identifier of the selected item (image path relative to the folder)
    pub data: String,
}

impl NavParams {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// Host platform family, used when building image URIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    pub fn is_windows_family(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// Collaborators shared by the pages of a session.
#[derive(Debug)]
pub struct Session<I = ImageState, A = AnnotationStore> {
    /// Selected folder
    pub project: ProjectState,
    /// Current image and active tool
    pub images: I,
    /// Annotations and selection
    pub annotations: A,
    pub hotkeys: HotkeyBindings,
    pub events: EventBus,
    pub platform: Platform,
}

impl Session {
    /// Session with the default providers and hotkeys.
    pub fn new(project: ProjectState) -> Self {
        Self::with_providers(project, ImageState::new(), AnnotationStore::new())
    }

    /// Session using the hotkeys and start tool from `config`.
    pub fn from_config(project: ProjectState, config: &AppConfig) -> Self {
        Self::with_providers(
            project,
            ImageState::with_tool(config.preferences.default_tool),
            AnnotationStore::new(),
        )
        .with_hotkeys(config.hotkeys.clone())
    }
}

impl<I, A> Session<I, A> {
    pub fn with_providers(project: ProjectState, images: I, annotations: A) -> Self {
        Self {
            project,
            images,
            annotations,
            hotkeys: HotkeyBindings::default(),
            events: EventBus::new(),
            platform: Platform::current(),
        }
    }

    pub fn with_hotkeys(mut self, hotkeys: HotkeyBindings) -> Self {
        self.hotkeys = hotkeys;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

/// Join an item identifier onto a folder with `/`.
fn join_item(folder: &str, item: &str) -> String {
    let item = item.trim_start_matches(['/', '\\']);
    if folder.is_empty() {
        return item.to_string();
    }
    format!("{}/{}", folder.trim_end_matches(['/', '\\']), item)
}

/// Image source for `item` in `folder`.
///
/// On the Windows family this is a `file:///` URI with forward slashes; on
/// every other platform it is the joined path unchanged.
pub fn image_src_for(platform: Platform, folder: &Path, item: &str) -> String {
    let joined = join_item(&folder.to_string_lossy(), item);
    if platform.is_windows_family() {
        format!("file:///{}", joined.replace('\\', "/"))
    } else {
        joined
    }
}

/// View-model for a single annotated image.
#[derive(Debug)]
pub struct ItemPage<I = ImageState, A = AnnotationStore> {
    item: String,
    session: Session<I, A>,
    lines: Vec<Line>,
    boxes: Vec<BoundingBox>,
    polygons: Vec<Polygon>,
    actions: Vec<Action>,
}

impl<I: ImageProvider, A: AnnotationProvider> ItemPage<I, A> {
    /// Open the page for the item named in `nav`.
    ///
    /// Defaults the canvas tool to [`CanvasTool::Line`] if none is set. A
    /// missing or unreadable image is logged and leaves the page without a
    /// current image; annotations still work.
    pub fn open(nav: NavParams, mut session: Session<I, A>) -> Self {
        let item = nav.data;
        if item.is_empty() {
            log::warn!("Opening item page without an item identifier");
        }

        if session.images.selected_tool().is_none() {
            session.images.set_selected_tool(CanvasTool::Line);
        }

        let path = session
            .project
            .folder
            .join(item.trim_start_matches(['/', '\\']));
        if let Err(e) = session
            .images
            .init_image(&path, &item, &mut session.annotations)
        {
            log::warn!("Failed to load image for {:?}: {}", item, e);
        }

        let mut page = Self {
            item,
            session,
            lines: Vec::new(),
            boxes: Vec::new(),
            polygons: Vec::new(),
            actions: Vec::new(),
        };
        page.refresh_annotations();
        log::debug!(
            "Opened {:?}: {} lines, {} boxes, {} polygons, {} actions",
            page.item,
            page.lines.len(),
            page.boxes.len(),
            page.polygons.len(),
            page.actions.len()
        );
        page
    }

    /// Close the page and return the session.
    pub fn close(self) -> Session<I, A> {
        self.session
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn session(&self) -> &Session<I, A> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<I, A> {
        &mut self.session
    }

    /// Absolute path of the image file.
    pub fn image_path(&self) -> PathBuf {
        self.session
            .project
            .folder
            .join(self.item.trim_start_matches(['/', '\\']))
    }

    /// Source string for displaying the image.
    pub fn image_src(&self) -> String {
        image_src_for(self.session.platform, &self.session.project.folder, &self.item)
    }

    pub fn selected_canvas_tool(&self) -> Option<CanvasTool> {
        self.session.images.selected_tool()
    }

    pub fn current_image(&self) -> Option<&ImageObject> {
        self.session.images.current_image()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Pull fresh snapshots of all annotation collections.
    pub fn refresh_annotations(&mut self) {
        let annotations = &self.session.annotations;
        self.lines = annotations.lines();
        self.boxes = annotations.boxes();
        self.polygons = annotations.polygons();
        self.actions = annotations.actions();
    }

    /// Ask observers to redraw the canvas.
    pub fn render_canvas(&mut self) {
        self.session.events.publish(PageEvent::RenderCanvas);
    }

    pub fn is_selected(&self, element: ElementRef) -> bool {
        self.session.annotations.selected() == Some(element)
    }

    /// Select `element`, replacing any previous selection.
    pub fn item_select(&mut self, element: ElementRef) {
        self.session.annotations.select(Some(element));
        self.render_canvas();
    }

    /// Clear the selection. Returns false if nothing was selected.
    pub fn clear_selection(&mut self) -> bool {
        if self.session.annotations.selected().is_none() {
            return false;
        }
        self.session.annotations.select(None);
        self.render_canvas();
        true
    }

    /// Delete annotation `id` from the collection of the active tool.
    ///
    /// Returns false, without notifying anyone, if that collection has no
    /// annotation with this id.
    pub fn item_delete(&mut self, id: AnnotationId) -> bool {
        let Some(tool) = self.selected_canvas_tool() else {
            log::debug!("Delete of {} ignored: no canvas tool", id);
            return false;
        };

        let annotations = &mut self.session.annotations;
        let removed = match tool {
            CanvasTool::Line => annotations.remove_line(id),
            CanvasTool::Rectangle => annotations.remove_box(id),
            CanvasTool::Polygon => annotations.remove_polygon(id),
        };

        if removed {
            self.refresh_annotations();
            self.render_canvas();
        } else {
            log::debug!("No {} with id {} to delete", tool.element_kind().name(), id);
        }
        removed
    }

    fn actions_changed(&mut self) {
        self.actions = self.session.annotations.actions();
        self.session.events.publish(PageEvent::ActionsChanged);
    }

    /// Append a "New Action" placeholder and return its id.
    pub fn action_add(&mut self) -> Result<AnnotationId, AnnotationError> {
        let id = self
            .session
            .annotations
            .add_action(ActionTemplate::new_action())?;
        self.actions_changed();
        Ok(id)
    }

    /// Edit the label and time range of an action.
    pub fn action_update(
        &mut self,
        id: AnnotationId,
        label: impl Into<String>,
        start_time: f64,
        end_time: f64,
    ) -> Result<(), AnnotationError> {
        self.session
            .annotations
            .update_action(id, ActionTemplate::new(label, start_time, end_time))?;
        self.actions_changed();
        Ok(())
    }

    /// Delete an action. Returns false if no action has this id.
    pub fn action_delete(&mut self, id: AnnotationId) -> bool {
        let removed = self.session.annotations.remove_action(id);
        if removed {
            self.actions_changed();
        }
        removed
    }

    /// Switch the active canvas tool.
    pub fn select_canvas_tool(&mut self, tool: CanvasTool) {
        let previous = self.session.images.selected_tool();
        self.session.images.set_selected_tool(tool);
        if previous != Some(tool) {
            self.session.events.publish(PageEvent::ToolChanged(tool));
        }
    }

    /// Handle a window key-down. Returns the tool bound to `key`, if any.
    pub fn on_key_down(&mut self, key: &str) -> Option<CanvasTool> {
        let tool = self.session.hotkeys.tool_for_key(key)?;
        log::debug!("Hotkey {:?} -> {}", key, tool.name());
        self.select_canvas_tool(tool);
        Some(tool)
    }
}
