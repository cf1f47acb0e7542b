//! Hotkeys for switching the canvas tool.
//!
//! Keys are compared as the logical key strings a window reports on key down
//! (for example `"l"` or `"F2"`). Matching is exact, so `"L"` and `"l"` are
//! different bindings.

use serde::{Deserialize, Serialize};

use crate::model::CanvasTool;

/// Default hotkey for the line tool.
pub const DEFAULT_LINE_KEY: &str = "l";
/// Default hotkey for the rectangle tool.
pub const DEFAULT_RECTANGLE_KEY: &str = "r";
/// Default hotkey for the polygon tool.
pub const DEFAULT_POLYGON_KEY: &str = "p";

/// Hotkey configuration for the canvas tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyBindings {
    /// Hotkey for the line tool
    #[serde(default = "default_line")]
    pub line: String,
    /// Hotkey for the rectangle tool
    #[serde(default = "default_rectangle")]
    pub rectangle: String,
    /// Hotkey for the polygon tool
    #[serde(default = "default_polygon")]
    pub polygon: String,
}

fn default_line() -> String {
    DEFAULT_LINE_KEY.to_string()
}

fn default_rectangle() -> String {
    DEFAULT_RECTANGLE_KEY.to_string()
}

fn default_polygon() -> String {
    DEFAULT_POLYGON_KEY.to_string()
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            line: default_line(),
            rectangle: default_rectangle(),
            polygon: default_polygon(),
        }
    }
}

impl HotkeyBindings {
    /// Create new bindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tool that corresponds to a key press, if any.
    ///
    /// Bindings are checked line, rectangle, polygon; the first match wins.
    pub fn tool_for_key(&self, key: &str) -> Option<CanvasTool> {
        if key.is_empty() {
            None
        } else if key == self.line {
            Some(CanvasTool::Line)
        } else if key == self.rectangle {
            Some(CanvasTool::Rectangle)
        } else if key == self.polygon {
            Some(CanvasTool::Polygon)
        } else {
            None
        }
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: CanvasTool) -> &str {
        match tool {
            CanvasTool::Line => &self.line,
            CanvasTool::Rectangle => &self.rectangle,
            CanvasTool::Polygon => &self.polygon,
        }
    }

    /// Set the hotkey for a tool.
    pub fn set_tool_key(&mut self, tool: CanvasTool, key: impl Into<String>) {
        let key = key.into();
        match tool {
            CanvasTool::Line => self.line = key,
            CanvasTool::Rectangle => self.rectangle = key,
            CanvasTool::Polygon => self.polygon = key,
        }
    }

    /// Check if a key is already bound to a tool other than `exclude_tool`.
    pub fn key_conflict(&self, key: &str, exclude_tool: Option<CanvasTool>) -> Option<CanvasTool> {
        CanvasTool::all()
            .iter()
            .copied()
            .filter(|tool| Some(*tool) != exclude_tool)
            .find(|tool| self.key_for_tool(*tool) == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = HotkeyBindings::new();
        assert_eq!(bindings.tool_for_key("l"), Some(CanvasTool::Line));
        assert_eq!(bindings.tool_for_key("r"), Some(CanvasTool::Rectangle));
        assert_eq!(bindings.tool_for_key("p"), Some(CanvasTool::Polygon));
    }

    #[test]
    fn test_unbound_and_case_sensitive() {
        let bindings = HotkeyBindings::new();
        assert_eq!(bindings.tool_for_key("x"), None);
        assert_eq!(bindings.tool_for_key("R"), None);
        assert_eq!(bindings.tool_for_key(""), None);
    }

    #[test]
    fn test_first_binding_wins_on_duplicate() {
        let mut bindings = HotkeyBindings::new();
        bindings.set_tool_key(CanvasTool::Polygon, "l");
        assert_eq!(bindings.tool_for_key("l"), Some(CanvasTool::Line));
    }

    #[test]
    fn test_set_and_get_tool_key() {
        let mut bindings = HotkeyBindings::new();
        bindings.set_tool_key(CanvasTool::Rectangle, "b");
        assert_eq!(bindings.key_for_tool(CanvasTool::Rectangle), "b");
        assert_eq!(bindings.tool_for_key("b"), Some(CanvasTool::Rectangle));
        assert_eq!(bindings.tool_for_key("r"), None);
    }

    #[test]
    fn test_key_conflict() {
        let bindings = HotkeyBindings::new();
        assert_eq!(bindings.key_conflict("p", None), Some(CanvasTool::Polygon));
        assert_eq!(bindings.key_conflict("p", Some(CanvasTool::Polygon)), None);
        assert_eq!(bindings.key_conflict("z", None), None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let bindings: HotkeyBindings = serde_json::from_str(r#"{"rectangle": "b"}"#).unwrap();
        assert_eq!(bindings.line, "l");
        assert_eq!(bindings.rectangle, "b");
        assert_eq!(bindings.polygon, "p");
    }
}
