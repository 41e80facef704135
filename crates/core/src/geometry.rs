//! Rectangle and placement value types
//!
//! Geometry flows through the annotator in three shapes: [`ClientRect`] as
//! reported by the host layout engine (size fields may be missing),
//! [`Rect`] after normalization (scroll offset applied, size derived), and
//! [`Placement`] as produced by a positioner for one overlay fragment.
//! All values are in host pixels.

/// Bounding rectangle as reported by the host layout engine
///
/// `right`/`bottom` are always present; some hosts also report `width` and
/// `height` directly, others leave them for the consumer to derive.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl ClientRect {
    /// Create a rectangle from edge coordinates, leaving the size fields
    /// for [`normalize`](Self::normalize) to derive.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            width: None,
            height: None,
        }
    }

    /// Create a rectangle from an origin and an explicit size.
    pub fn with_size(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width: Some(width),
            height: Some(height),
        }
    }

    /// Apply the vertical scroll offset and derive any missing size fields.
    ///
    /// The offset shifts `top` and `bottom` into document space before the
    /// size is derived, so a host that omits `height` still gets
    /// `bottom - top`.
    pub fn normalize(&self, scroll: ScrollOffset) -> Rect {
        let top = self.top + scroll.y;
        let bottom = self.bottom + scroll.y;
        Rect {
            left: self.left,
            top,
            width: self.width.unwrap_or(self.right - self.left),
            height: self.height.unwrap_or(bottom - top),
        }
    }
}

/// Scroll position of the host view
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    /// Create a scroll offset.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Normalized rectangle in document space
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a rectangle from an origin and size.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Final overlay placement produced by a positioner
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Create a placement.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}
