//! Placement strategies
//!
//! A positioner turns one measured rectangle into the placement of the
//! overlay drawn for it. Implementations must be pure: identical inputs give
//! identical placements, with no side effects, so reconciliation can call
//! them as often as it likes.

use crate::geometry::{Placement, Rect};

/// Translates a measured rectangle into overlay placement.
pub trait Positioner {
    /// Placement of an overlay of `height` pixels for `rect`.
    fn get_position(&self, rect: &Rect, height: f32) -> Placement;
}

/// Places the overlay along the bottom edge of the rectangle.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnderlinePositioner;

impl Positioner for UnderlinePositioner {
    fn get_position(&self, rect: &Rect, height: f32) -> Placement {
        Placement {
            left: rect.left,
            top: rect.top + rect.height - height,
            width: rect.width,
            height,
        }
    }
}

/// Places the overlay along the top edge of the rectangle.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlinePositioner;

impl Positioner for OverlinePositioner {
    fn get_position(&self, rect: &Rect, height: f32) -> Placement {
        Placement {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height,
        }
    }
}

/// Places the overlay through the vertical center of the rectangle.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrikeoutPositioner;

impl Positioner for StrikeoutPositioner {
    fn get_position(&self, rect: &Rect, height: f32) -> Placement {
        Placement {
            left: rect.left,
            top: rect.top + (rect.height - height) / 2.0,
            width: rect.width,
            height,
        }
    }
}
