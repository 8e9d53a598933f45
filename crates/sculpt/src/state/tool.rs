//! Tool-mode state machine. Exactly one mode is active at a time.

use serde::{Deserialize, Serialize};

/// Interaction mode of the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Select,
    Draw,
    CircleDraw,
    Carve,
    Scale,
    CircleCarve,
    Bend,
    SketchCarve,
}

impl ToolMode {
    pub const ALL: [ToolMode; 8] = [
        ToolMode::Select,
        ToolMode::Draw,
        ToolMode::CircleDraw,
        ToolMode::Carve,
        ToolMode::Scale,
        ToolMode::CircleCarve,
        ToolMode::Bend,
        ToolMode::SketchCarve,
    ];

    /// Message shown when the mode becomes active
    pub fn activation_message(self) -> &'static str {
        match self {
            ToolMode::Select => "Select mode active. Move or scale shapes.",
            ToolMode::Draw => "Drawing mode active. Drag to sketch.",
            ToolMode::CircleDraw => "Circle Draw active. Click and drag to set radius.",
            ToolMode::Carve => "Carve mode active. Select a shape to split.",
            ToolMode::Scale => "Scale mode active. Click a shape to resize it.",
            ToolMode::CircleCarve => "Circle Carve active. Click to punch a hole!",
            ToolMode::Bend => "Bend mode active. Click a shape to curve it.",
            ToolMode::SketchCarve => "Sketch Carve active. Draw a shape to punch it through!",
        }
    }

    /// Modes whose pointer drag records a freehand polyline
    pub fn collects_strokes(self) -> bool {
        matches!(self, ToolMode::Draw | ToolMode::SketchCarve)
    }
}

/// Active mode plus the independent straight-lines flag
#[derive(Debug, Clone, Default)]
pub struct ToolState {
    active: ToolMode,
    straight_lines: bool,
}

impl ToolState {
    pub fn active(&self) -> ToolMode {
        self.active
    }

    pub fn is_active(&self, mode: ToolMode) -> bool {
        self.active == mode
    }

    pub fn straight_lines(&self) -> bool {
        self.straight_lines
    }

    /// Toggle `requested`: re-requesting the active non-select mode returns to
    /// Select, anything else activates `requested`. Returns the message to show.
    pub fn toggle(&mut self, requested: ToolMode) -> &'static str {
        if requested == self.active && requested != ToolMode::Select {
            self.active = ToolMode::Select;
            tracing::debug!("tool {:?} toggled off", requested);
            return "Return to Selection mode.";
        }
        self.active = requested;
        tracing::debug!("tool {:?} active", requested);
        requested.activation_message()
    }

    /// Force Select (Escape)
    pub fn cancel(&mut self) -> &'static str {
        self.active = ToolMode::Select;
        "Mode canceled. Selection active."
    }

    pub fn toggle_straight_lines(&mut self) -> &'static str {
        self.straight_lines = !self.straight_lines;
        if self.straight_lines {
            "Straight Lines: ON"
        } else {
            "Straight Lines: OFF"
        }
    }
}
