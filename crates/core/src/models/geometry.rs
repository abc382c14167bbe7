use serde::{Deserialize, Serialize};

/// Gap kept between a dragged panel and the left/right/top viewport edges.
pub const EDGE_MARGIN: f64 = 10.0;
/// Height of the strip that must stay visible at the bottom edge (header).
pub const HEADER_RESERVE: f64 = 60.0;
/// Gap kept between a resized panel and the right/bottom viewport edges.
pub const RESIZE_MARGIN: f64 = 20.0;
pub const MIN_WIDTH: f64 = 280.0;
pub const MIN_HEIGHT: f64 = 350.0;
pub const DEFAULT_WIDTH: f64 = 380.0;
pub const DEFAULT_HEIGHT: f64 = 430.0;
/// Default placement measured from the bottom-right corner.
pub const DEFAULT_RIGHT_OFFSET: f64 = 420.0;
pub const DEFAULT_BOTTOM_OFFSET: f64 = 480.0;

/// A pointer or panel coordinate in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Visible area of the host window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position and size of the floating chat panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelGeometry {
    pub position: Position,
    pub size: Size,
}

impl PanelGeometry {
    /// Default-sized panel anchored near the bottom-right corner.
    pub fn default_for(viewport: Viewport) -> Self {
        Self {
            position: Position::new(
                viewport.width - DEFAULT_RIGHT_OFFSET,
                viewport.height - DEFAULT_BOTTOM_OFFSET,
            ),
            size: Size::default(),
        }
    }

    /// Where the panel lands when its origin is dragged to `origin`.
    ///
    /// `x ∈ [10, vw - width - 10]`, `y ∈ [10, vh - 60]`. The lower bound is
    /// applied last so it holds even when the viewport is narrower than the panel.
    pub fn dragged_to(&self, origin: Position, viewport: Viewport) -> Position {
        Position {
            x: origin
                .x
                .min(viewport.width - self.size.width - EDGE_MARGIN)
                .max(EDGE_MARGIN),
            y: origin.y.min(viewport.height - HEADER_RESERVE).max(EDGE_MARGIN),
        }
    }

    /// Size the panel takes when its bottom-right corner follows `pointer`.
    ///
    /// `width ≥ 280`, `height ≥ 350`, otherwise bounded by the viewport minus
    /// a 20px margin. Minimums win over the viewport bound.
    pub fn resized_to(&self, pointer: Position, viewport: Viewport) -> Size {
        Size {
            width: (pointer.x - self.position.x)
                .min(viewport.width - self.position.x - RESIZE_MARGIN)
                .max(MIN_WIDTH),
            height: (pointer.y - self.position.y)
                .min(viewport.height - self.position.y - RESIZE_MARGIN)
                .max(MIN_HEIGHT),
        }
    }
}

/// Transient pointer gesture on an open panel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pointer offset from the panel origin, captured at pointer-down.
    Dragging { offset: Position },
    Resizing,
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}
