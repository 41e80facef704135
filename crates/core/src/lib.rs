//! Overmark Core Library
//!
//! Overlay annotation engine: tracks the on-screen geometry of annotated
//! elements and reconciles one overlay fragment per bounding rectangle as
//! the host document reflows and resizes.
//!
//! The crate is headless. A host supplies element geometry through
//! [`HostDocument`], receives overlay mutations through [`OverlayTree`],
//! delivers window resizes via [`ResizeRegistry`], and pumps deferred work
//! (entrance animations, trailing throttle refreshes) with
//! [`Annotator::run_due_tasks`].

pub mod annotator;
pub mod geometry;
pub mod options;
pub mod positioner;
pub mod resize;
pub mod template;
pub mod tree;

pub use annotator::{
    AnnotationInfo, AnnotationRecord, Annotator, AnnotatorError, AnnotatorResult, ElementId,
    HostDocument, OverlayFragment, RecordId, RefreshEvent, OVERLAY_CLASS, RESIZE_THROTTLE,
    REVEAL_DELAY,
};
pub use geometry::{ClientRect, Placement, Rect, ScrollOffset};
pub use options::{AnnotatorOptions, OptionsPatch};
pub use positioner::{OverlinePositioner, Positioner, StrikeoutPositioner, UnderlinePositioner};
pub use resize::{ResizeCallback, ResizeRegistry};
pub use template::{GapPart, PartWidth, SolidPart, Template, TemplatePart};
pub use tree::{NodeId, NodeStyle, OverlayTree, PositionScheme, SizeUnit};
