//! Canvas drawing tools.

use serde::{Deserialize, Serialize};

use super::ElementKind;

/// Drawing tools available on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasTool {
    /// Polyline tool
    #[default]
    Line,
    /// Rectangle (bounding box) tool
    Rectangle,
    /// Polygon tool
    Polygon,
}

impl CanvasTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            CanvasTool::Line => "Line",
            CanvasTool::Rectangle => "Rectangle",
            CanvasTool::Polygon => "Polygon",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [CanvasTool] {
        &[CanvasTool::Line, CanvasTool::Rectangle, CanvasTool::Polygon]
    }

    /// The annotation collection this tool draws into.
    pub fn element_kind(&self) -> ElementKind {
        match self {
            CanvasTool::Line => ElementKind::Line,
            CanvasTool::Rectangle => ElementKind::Box,
            CanvasTool::Polygon => ElementKind::Polygon,
        }
    }

    /// Parse a tool name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|tool| tool.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_is_line() {
        assert_eq!(CanvasTool::default(), CanvasTool::Line);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(CanvasTool::from_name("rectangle"), Some(CanvasTool::Rectangle));
        assert_eq!(CanvasTool::from_name("POLYGON"), Some(CanvasTool::Polygon));
        assert_eq!(CanvasTool::from_name("select"), None);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CanvasTool::Rectangle).unwrap();
        assert_eq!(json, "\"rectangle\"");
        let tool: CanvasTool = serde_json::from_str("\"polygon\"").unwrap();
        assert_eq!(tool, CanvasTool::Polygon);
    }
}
