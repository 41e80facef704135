//! Overlay shape templates
//!
//! A template describes how one fragment's visual shape is assembled from
//! ordered parts and how those parts react to a geometry change. The shape
//! subtree is container → row → one cell per part; parts write their visual
//! state into the cell's style and the host renders it.
//!
//! Part widths are either fixed pixel spans or `Star` wildcards. Star parts
//! share `100 * star_count / total_parts` percent of the fragment width
//! evenly; fixed parts are unaffected by how many siblings they have.

use std::sync::Arc;

use crate::geometry::Placement;
use crate::tree::{NodeId, OverlayTree, SizeUnit};

/// Class carried by every shape container node.
pub const SHAPE_CLASS: &str = "ovm-shape";

/// Class carried by every shape row node.
pub const ROW_CLASS: &str = "ovm-row";

/// Class carried by every part cell node.
pub const CELL_CLASS: &str = "ovm-cell";

/// Width specification of one template part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartWidth {
    /// Fixed span in pixels.
    Fixed(f32),
    /// Wildcard: shares the star budget with the other star parts.
    Star,
}

/// One building block of an overlay shape.
pub trait TemplatePart {
    /// Width specification of this part.
    fn width(&self) -> PartWidth;

    /// Build the cell's initial visual state.
    ///
    /// `prev` is the preceding sibling cell (if any), `star_cost` the percent
    /// budget granted to each star part of this template.
    #[allow(clippy::too_many_arguments)]
    fn apply_to(
        &self,
        tree: &mut OverlayTree,
        cell: NodeId,
        prev: Option<NodeId>,
        placement: &Placement,
        index: usize,
        total: usize,
        color: &str,
        star_cost: f32,
    );

    /// Update the cell after the fragment's placement changed.
    fn resize(&self, tree: &mut OverlayTree, cell: NodeId, placement: &Placement);
}

/// Part filled with the annotation color.
#[derive(Debug, Clone, Copy)]
pub struct SolidPart {
    width: PartWidth,
}

impl SolidPart {
    /// A solid part with a fixed pixel span.
    pub fn fixed(width: f32) -> Self {
        Self {
            width: PartWidth::Fixed(width),
        }
    }

    /// A solid part that stretches over its star share.
    pub fn star() -> Self {
        Self {
            width: PartWidth::Star,
        }
    }
}

impl TemplatePart for SolidPart {
    fn width(&self) -> PartWidth {
        self.width
    }

    fn apply_to(
        &self,
        tree: &mut OverlayTree,
        cell: NodeId,
        _prev: Option<NodeId>,
        placement: &Placement,
        _index: usize,
        _total: usize,
        color: &str,
        star_cost: f32,
    ) {
        if let Some(style) = tree.style_mut(cell) {
            // Star cells are sized in percent so they track the fragment
            // width without being rewritten on every resize.
            match self.width {
                PartWidth::Fixed(width) => {
                    style.width = width;
                    style.width_unit = SizeUnit::Px;
                }
                PartWidth::Star => {
                    style.width = star_cost;
                    style.width_unit = SizeUnit::Percent;
                }
            }
            style.height = placement.height;
            style.background = Some(color.to_string());
        }
    }

    fn resize(&self, tree: &mut OverlayTree, cell: NodeId, placement: &Placement) {
        if let Some(style) = tree.style_mut(cell) {
            style.height = placement.height;
        }
    }
}

/// Spacer part that takes room without painting anything.
#[derive(Debug, Clone, Copy)]
pub struct GapPart {
    width: PartWidth,
}

impl GapPart {
    /// A gap with a fixed pixel span.
    pub fn fixed(width: f32) -> Self {
        Self {
            width: PartWidth::Fixed(width),
        }
    }
}

impl TemplatePart for GapPart {
    fn width(&self) -> PartWidth {
        self.width
    }

    fn apply_to(
        &self,
        tree: &mut OverlayTree,
        cell: NodeId,
        _prev: Option<NodeId>,
        placement: &Placement,
        _index: usize,
        _total: usize,
        _color: &str,
        star_cost: f32,
    ) {
        if let Some(style) = tree.style_mut(cell) {
            match self.width {
                PartWidth::Fixed(width) => {
                    style.width = width;
                    style.width_unit = SizeUnit::Px;
                }
                PartWidth::Star => {
                    style.width = star_cost;
                    style.width_unit = SizeUnit::Percent;
                }
            }
            style.height = placement.height;
        }
    }

    fn resize(&self, tree: &mut OverlayTree, cell: NodeId, placement: &Placement) {
        if let Some(style) = tree.style_mut(cell) {
            style.height = placement.height;
        }
    }
}

/// Named, ordered sequence of parts
///
/// Cheap to clone; parts are shared.
#[derive(Clone)]
pub struct Template {
    name: String,
    parts: Vec<Arc<dyn TemplatePart>>,
}

impl Template {
    /// Create a template from its parts.
    pub fn new(name: impl Into<String>, parts: Vec<Arc<dyn TemplatePart>>) -> Self {
        Self {
            name: name.into(),
            parts,
        }
    }

    /// Single solid bar spanning the whole fragment.
    pub fn solid(name: impl Into<String>) -> Self {
        Self::new(name, vec![Arc::new(SolidPart::star())])
    }

    /// `segments` solid bars separated by fixed gaps.
    pub fn segmented(name: impl Into<String>, segments: usize, gap: f32) -> Self {
        let mut parts: Vec<Arc<dyn TemplatePart>> = Vec::new();
        for i in 0..segments {
            if i > 0 {
                parts.push(Arc::new(GapPart::fixed(gap)));
            }
            parts.push(Arc::new(SolidPart::star()));
        }
        Self::new(name, parts)
    }

    /// Template name, used as the annotation kind.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered parts.
    pub fn parts(&self) -> &[Arc<dyn TemplatePart>] {
        &self.parts
    }

    /// Percent budget granted to each star part.
    pub fn star_cost(&self) -> f32 {
        if self.parts.is_empty() {
            return 0.0;
        }
        let stars = self
            .parts
            .iter()
            .filter(|part| part.width() == PartWidth::Star)
            .count();
        stars as f32 * 100.0 / self.parts.len() as f32
    }

    /// Build the shape subtree for one fragment.
    ///
    /// Returns the container node; the caller attaches it to the fragment.
    pub fn instantiate(&self, tree: &mut OverlayTree, placement: &Placement, color: &str) -> NodeId {
        let container = tree.create_node();
        tree.add_class(container, SHAPE_CLASS);

        let row = tree.create_node();
        tree.add_class(row, ROW_CLASS);
        tree.append_child(container, row);

        let star_cost = self.star_cost();
        let total = self.parts.len();
        let mut prev = None;
        for (index, part) in self.parts.iter().enumerate() {
            let cell = tree.create_node();
            tree.add_class(cell, CELL_CLASS);
            part.apply_to(tree, cell, prev, placement, index, total, color, star_cost);
            tree.append_child(row, cell);
            prev = Some(cell);
        }

        container
    }

    /// Resize every cell of an instantiated shape to a new placement.
    pub fn resize(&self, tree: &mut OverlayTree, container: NodeId, placement: &Placement) {
        let Some(&row) = tree.children(container).first() else {
            return;
        };
        let cells: Vec<NodeId> = tree.children(row).to_vec();
        for (part, cell) in self.parts.iter().zip(cells) {
            part.resize(tree, cell, placement);
        }
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("parts", &self.parts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> Placement {
        Placement::new(10.0, 20.0, 200.0, 5.0)
    }

    #[test]
    fn test_star_cost_all_stars() {
        let template = Template::solid("underline");
        assert_eq!(template.star_cost(), 100.0);
    }

    #[test]
    fn test_star_cost_mixed_parts() {
        // 2 stars out of 4 parts: each star gets 50 percent.
        let parts: Vec<Arc<dyn TemplatePart>> = vec![
            Arc::new(SolidPart::star()),
            Arc::new(GapPart::fixed(4.0)),
            Arc::new(SolidPart::star()),
            Arc::new(GapPart::fixed(4.0)),
        ];
        let template = Template::new("dashed", parts);
        assert_eq!(template.star_cost(), 50.0);
    }

    #[test]
    fn test_star_cost_empty_template() {
        let template = Template::new("empty", Vec::new());
        assert_eq!(template.star_cost(), 0.0);
    }

    #[test]
    fn test_instantiate_builds_container_row_cells() {
        let mut tree = OverlayTree::new();
        let template = Template::segmented("dashes", 2, 4.0);

        let container = template.instantiate(&mut tree, &placement(), "red");

        assert!(tree.has_class(container, SHAPE_CLASS));
        let row = tree.children(container)[0];
        assert!(tree.has_class(row, ROW_CLASS));
        // 2 segments + 1 gap.
        assert_eq!(tree.children(row).len(), 3);
    }

    #[test]
    fn test_solid_cell_gets_color_and_star_share() {
        let mut tree = OverlayTree::new();
        let template = Template::solid("underline");

        let container = template.instantiate(&mut tree, &placement(), "#ff0000");
        let row = tree.children(container)[0];
        let cell = tree.children(row)[0];
        let style = tree.style(cell).unwrap();

        assert_eq!(style.background.as_deref(), Some("#ff0000"));
        assert_eq!(style.width, 100.0);
        assert_eq!(style.width_unit, SizeUnit::Percent);
        assert_eq!(style.height, 5.0);
    }

    #[test]
    fn test_gap_cell_has_no_color() {
        let mut tree = OverlayTree::new();
        let template = Template::segmented("dashes", 2, 4.0);

        let container = template.instantiate(&mut tree, &placement(), "blue");
        let row = tree.children(container)[0];
        let gap = tree.children(row)[1];
        let style = tree.style(gap).unwrap();

        assert!(style.background.is_none());
        assert_eq!(style.width, 4.0);
        assert_eq!(style.width_unit, SizeUnit::Px);
    }

    #[test]
    fn test_segmented_star_share_accounts_for_gaps() {
        // 2 stars out of 3 parts: each star cell gets 2/3 of the width.
        let mut tree = OverlayTree::new();
        let template = Template::segmented("dashes", 2, 4.0);

        let container = template.instantiate(&mut tree, &placement(), "blue");
        let row = tree.children(container)[0];
        let first = tree.children(row)[0];
        let style = tree.style(first).unwrap();

        assert_eq!(style.width_unit, SizeUnit::Percent);
        assert!((style.width - 200.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_resize_updates_cell_height() {
        let mut tree = OverlayTree::new();
        let template = Template::solid("underline");
        let container = template.instantiate(&mut tree, &placement(), "red");

        let thinner = Placement::new(10.0, 20.0, 80.0, 3.0);
        template.resize(&mut tree, container, &thinner);

        let row = tree.children(container)[0];
        let cell = tree.children(row)[0];
        let style = tree.style(cell).unwrap();
        assert_eq!(style.height, 3.0);
        // Star widths are percent-based and survive untouched.
        assert_eq!(style.width, 100.0);
    }

    #[test]
    fn test_resize_missing_structure_is_noop() {
        let mut tree = OverlayTree::new();
        let template = Template::solid("underline");
        let bare = tree.create_node();

        // A container without a row is skipped rather than panicking.
        template.resize(&mut tree, bare, &placement());
    }
}
