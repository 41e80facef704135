//! Annotation attachment store and overlay reconciliation
//!
//! The annotator owns a side-table mapping host elements to their annotation
//! records and keeps each record's overlay fragments in sync with the
//! element's current bounding rectangles. Reconciliation repositions the
//! shared prefix of fragments, destroys the surplus, and creates the deficit
//! with a width-0 entrance that grows to final width after a short deferred
//! delay.
//!
//! Everything runs on one thread. The host pumps deferred work through
//! [`Annotator::run_due_tasks`] and delivers window resizes through the hook
//! returned by [`Annotator::resize_hook`], which throttles bursts before
//! refreshing every annotated element.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use overmark_scheduler::{CancellationToken, Clock, Throttle, ThrottleFire, TimerQueue};

use crate::geometry::{ClientRect, ScrollOffset};
use crate::options::{AnnotatorOptions, OptionsPatch};
use crate::positioner::Positioner;
use crate::resize::ResizeCallback;
use crate::template::Template;
use crate::tree::{NodeId, OverlayTree, PositionScheme};

/// Host-assigned handle of an annotatable element.
pub type ElementId = u64;

/// Stable identifier of one annotation record.
pub type RecordId = uuid::Uuid;

/// Minimum interval between resize-driven batch refreshes.
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(50);

/// Delay before a fresh fragment grows from zero to its final width.
pub const REVEAL_DELAY: Duration = Duration::from_millis(10);

/// Class applied to every fragment wrapper node.
pub const OVERLAY_CLASS: &str = "ovm-overlay";

/// Geometry and tagging services the host page provides.
///
/// Implementations must not call back into the annotator from these methods;
/// the annotator invokes them while its own state is borrowed.
pub trait HostDocument {
    /// Current bounding rectangles of the element, one per rendered line box.
    ///
    /// Empty when the element is invisible or out of flow.
    fn client_rects(&self, element: ElementId) -> Vec<ClientRect>;

    /// Current scroll position of the host view.
    fn scroll_offset(&self) -> ScrollOffset;

    /// Toggle the presentational class marking an element as annotated.
    fn set_element_class(&self, element: ElementId, class: &str, enabled: bool);
}

/// Errors surfaced by annotation operations.
#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    #[error("no template registered for annotation kind '{kind}'")]
    UnknownKind { kind: String },
}

/// Result alias for annotation operations.
pub type AnnotatorResult<T> = Result<T, AnnotatorError>;

/// Layout-change notification carrying the element whose geometry moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshEvent {
    pub target: ElementId,
}

/// One overlay unit covering a single bounding rectangle of the target.
///
/// `outer` is the absolutely positioned wrapper whose width animates in;
/// `inner` holds the final width; `shape` is the templated subtree.
#[derive(Debug)]
pub struct OverlayFragment {
    outer: NodeId,
    inner: NodeId,
    shape: NodeId,
    reveal: Option<CancellationToken>,
}

impl OverlayFragment {
    /// Wrapper node attached under the overlay root.
    pub fn outer(&self) -> NodeId {
        self.outer
    }

    /// Body node carrying the final width.
    pub fn inner(&self) -> NodeId {
        self.inner
    }

    /// Templated shape container.
    pub fn shape(&self) -> NodeId {
        self.shape
    }
}

/// Annotation state attached to one element.
#[derive(Debug)]
pub struct AnnotationRecord {
    id: RecordId,
    element: ElementId,
    kind: String,
    color: String,
    fragments: Vec<OverlayFragment>,
}

impl AnnotationRecord {
    /// Stable record id.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// The annotated element.
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Template name this annotation renders with.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Color applied to the overlay parts.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Live fragments, one per bounding rectangle, in rectangle order.
    pub fn fragments(&self) -> &[OverlayFragment] {
        &self.fragments
    }
}

/// Snapshot of an annotation returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationInfo {
    pub id: RecordId,
    pub kind: String,
    pub color: String,
    /// Outer wrapper node of each fragment, in rectangle order.
    pub fragments: Vec<NodeId>,
}

/// Work the annotator defers onto its timer queue.
#[derive(Debug)]
enum DeferredTask {
    /// Grow a freshly created fragment wrapper to its final width.
    Reveal { outer: NodeId, width: f32 },
    /// Trailing edge of the resize throttle.
    RefreshAll,
}

struct AnnotatorInner {
    id: String,
    templates: HashMap<String, Template>,
    positioner: Box<dyn Positioner>,
    options: AnnotatorOptions,
    records: HashMap<ElementId, AnnotationRecord>,
    throttle: Throttle,
    timers: TimerQueue<DeferredTask>,
    host: Rc<dyn HostDocument>,
    tree: Rc<RefCell<OverlayTree>>,
    clock: Rc<dyn Clock>,
}

impl AnnotatorInner {
    fn annotated_class(&self) -> String {
        format!("ovm-{}", self.id)
    }

    /// Reconcile one element's fragment list against its current rectangles.
    fn refresh_element(&mut self, element: ElementId) -> AnnotatorResult<()> {
        // An event may arrive after unannotation; nothing to do then.
        let Some(record) = self.records.get_mut(&element) else {
            return Ok(());
        };

        let rects = self.host.client_rects(element);
        let scroll = self.host.scroll_offset();
        let template = self
            .templates
            .get(&record.kind)
            .ok_or_else(|| AnnotatorError::UnknownKind {
                kind: record.kind.clone(),
            })?;

        let height = self.options.height;
        let opacity = self.options.opacity;
        let shared = rects.len().min(record.fragments.len());

        let mut tree = self.tree.borrow_mut();

        // Reposition the fragments that still have a rectangle.
        for (rect, frag) in rects.iter().zip(record.fragments.iter()).take(shared) {
            let rect = rect.normalize(scroll);
            let placement = self.positioner.get_position(&rect, height);
            if let Some(style) = tree.style_mut(frag.outer) {
                style.width = placement.width;
                style.left = placement.left;
                style.top = placement.top;
            }
            template.resize(&mut tree, frag.shape, &placement);
        }

        // Destroy fragments whose rectangle disappeared.
        for frag in record.fragments.drain(shared..) {
            if let Some(token) = frag.reveal {
                token.cancel();
            }
            tree.remove(frag.outer);
        }

        // Create fragments for rectangles that gained a line box.
        let root = tree.root();
        let now = self.clock.now();
        for rect in rects.iter().skip(shared) {
            let rect = rect.normalize(scroll);
            let placement = self.positioner.get_position(&rect, height);

            let outer = tree.create_node();
            if let Some(style) = tree.style_mut(outer) {
                style.position = PositionScheme::Absolute;
                style.height = placement.height;
                // Width starts at zero and grows to the placement width once
                // the reveal task fires.
                style.width = 0.0;
                style.left = placement.left;
                style.top = placement.top;
                style.opacity = opacity;
            }
            tree.add_class(outer, OVERLAY_CLASS);

            let inner = tree.create_node();
            if let Some(style) = tree.style_mut(inner) {
                style.height = placement.height;
                style.width = placement.width;
            }

            let shape = template.instantiate(&mut tree, &placement, &record.color);
            tree.append_child(inner, shape);
            tree.append_child(outer, inner);
            tree.append_child(root, outer);

            template.resize(&mut tree, shape, &placement);

            let token = self.timers.schedule(
                now + REVEAL_DELAY,
                DeferredTask::Reveal {
                    outer,
                    width: placement.width,
                },
            );
            record.fragments.push(OverlayFragment {
                outer,
                inner,
                shape,
                reveal: Some(token),
            });
        }

        tracing::trace!(
            element,
            rects = rects.len(),
            shared,
            "reconciled annotation fragments"
        );
        Ok(())
    }
}

/// Annotation overlay engine
///
/// Cheap to clone; clones share the same state, the way a host page shares
/// one annotator across event handlers.
#[derive(Clone)]
pub struct Annotator {
    inner: Rc<RefCell<AnnotatorInner>>,
}

impl Annotator {
    /// Create an annotator over the given host services.
    ///
    /// `templates` maps annotation kinds to the template rendering them.
    /// Options start at their defaults; use [`with_options`](Self::with_options)
    /// or [`set_options`](Self::set_options) to change them.
    pub fn new(
        id: impl Into<String>,
        templates: HashMap<String, Template>,
        positioner: Box<dyn Positioner>,
        host: Rc<dyn HostDocument>,
        tree: Rc<RefCell<OverlayTree>>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(AnnotatorInner {
                id: id.into(),
                templates,
                positioner,
                options: AnnotatorOptions::default(),
                records: HashMap::new(),
                throttle: Throttle::new(RESIZE_THROTTLE),
                timers: TimerQueue::new(),
                host,
                tree,
                clock,
            })),
        }
    }

    /// Replace the options wholesale at construction time.
    pub fn with_options(self, options: AnnotatorOptions) -> Self {
        self.inner.borrow_mut().options = options;
        self
    }

    /// This annotator's instance id.
    pub fn id(&self) -> String {
        self.inner.borrow().id.clone()
    }

    /// Class marking elements annotated by this instance.
    pub fn annotated_class(&self) -> String {
        self.inner.borrow().annotated_class()
    }

    /// Shallow-merge an options patch; untouched keys keep their values.
    pub fn set_options(&self, patch: &OptionsPatch) {
        self.inner.borrow_mut().options.merge(patch);
    }

    /// Current effective options.
    pub fn options(&self) -> AnnotatorOptions {
        self.inner.borrow().options.clone()
    }

    /// Annotate elements with the given kind and color.
    ///
    /// Any existing annotation on the elements is removed first. Each element
    /// is tagged with the instance class and refreshed immediately. Record
    /// ids are returned in input order.
    pub fn annotate(
        &self,
        elements: &[ElementId],
        kind: &str,
        color: &str,
    ) -> AnnotatorResult<Vec<RecordId>> {
        {
            let inner = self.inner.borrow();
            if !inner.templates.contains_key(kind) {
                return Err(AnnotatorError::UnknownKind {
                    kind: kind.to_string(),
                });
            }
        }

        self.unannotate(elements);

        let mut ids = Vec::with_capacity(elements.len());
        for &element in elements {
            let mut inner = self.inner.borrow_mut();
            tracing::debug!(element, kind, color, "annotating element");
            let record = AnnotationRecord {
                id: RecordId::new_v4(),
                element,
                kind: kind.to_string(),
                color: color.to_string(),
                fragments: Vec::new(),
            };
            ids.push(record.id);
            inner.records.insert(element, record);

            let class = inner.annotated_class();
            inner.host.set_element_class(element, &class, true);
            inner.refresh_element(element)?;
        }
        Ok(ids)
    }

    /// Remove any annotation from the elements.
    ///
    /// Idempotent: elements without a record are skipped.
    pub fn unannotate(&self, elements: &[ElementId]) {
        let mut inner = self.inner.borrow_mut();
        for &element in elements {
            let Some(record) = inner.records.remove(&element) else {
                continue;
            };
            tracing::debug!(element, "removing annotation");
            {
                let mut tree = inner.tree.borrow_mut();
                for frag in record.fragments {
                    if let Some(token) = frag.reveal {
                        token.cancel();
                    }
                    tree.remove(frag.outer);
                }
            }
            let class = inner.annotated_class();
            inner.host.set_element_class(element, &class, false);
        }
    }

    /// Snapshot of the annotation attached to an element, if any.
    ///
    /// Pure lookup; never mutates.
    pub fn annotation_info(&self, element: ElementId) -> Option<AnnotationInfo> {
        let inner = self.inner.borrow();
        inner.records.get(&element).map(|record| AnnotationInfo {
            id: record.id,
            kind: record.kind.clone(),
            color: record.color.clone(),
            fragments: record.fragments.iter().map(|frag| frag.outer).collect(),
        })
    }

    /// Elements currently annotated by this instance, in stable order.
    pub fn annotated_elements(&self) -> Vec<ElementId> {
        let inner = self.inner.borrow();
        let mut elements: Vec<ElementId> = inner.records.keys().copied().collect();
        elements.sort_unstable();
        elements
    }

    /// Reconcile one element's overlay against its current geometry.
    pub fn refresh_element(&self, element: ElementId) -> AnnotatorResult<()> {
        self.inner.borrow_mut().refresh_element(element)
    }

    /// Reconcile the element named by a layout-change event.
    pub fn refresh_from_event(&self, event: &RefreshEvent) -> AnnotatorResult<()> {
        self.refresh_element(event.target)
    }

    /// Refresh every annotated element, isolating per-element failures.
    ///
    /// Failed elements are logged and returned; the rest refresh normally.
    pub fn refresh_all(&self) -> Vec<(ElementId, AnnotatorError)> {
        let elements = self.annotated_elements();
        let mut failures = Vec::new();
        for element in elements {
            if let Err(err) = self.inner.borrow_mut().refresh_element(element) {
                tracing::warn!(element, %err, "annotation refresh failed");
                failures.push((element, err));
            }
        }
        failures
    }

    /// Deliver a window-resize trigger through the throttle.
    ///
    /// The first trigger in a clear window refreshes immediately; triggers
    /// inside the cooldown coalesce into one trailing refresh executed by
    /// [`run_due_tasks`](Self::run_due_tasks).
    pub fn handle_resize(&self) {
        let action = {
            let mut inner = self.inner.borrow_mut();
            let now = inner.clock.now();
            let action = inner.throttle.fire(now);
            if let ThrottleFire::ArmTrailing(deadline) = action {
                inner.timers.schedule(deadline, DeferredTask::RefreshAll);
            }
            action
        };
        if action == ThrottleFire::Now {
            self.refresh_all();
        }
    }

    /// Resize hook for [`ResizeRegistry`](crate::resize::ResizeRegistry).
    ///
    /// Holds only a weak handle: once the annotator is dropped the hook
    /// upgrades to nothing and does no work, so a forgotten registration
    /// cannot keep the annotator alive or act on a dead one.
    pub fn resize_hook(&self) -> ResizeCallback {
        let weak: Weak<RefCell<AnnotatorInner>> = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Annotator { inner }.handle_resize();
            }
        })
    }

    /// Run every deferred task whose deadline has passed.
    ///
    /// Executes pending reveals (skipping nodes that no longer exist) and
    /// trailing throttle refreshes. Returns the number of tasks executed.
    pub fn run_due_tasks(&self) -> usize {
        let due = {
            let mut inner = self.inner.borrow_mut();
            let now = inner.clock.now();
            inner.timers.advance(now)
        };
        let count = due.len();
        for task in due {
            match task {
                DeferredTask::Reveal { outer, width } => {
                    let inner = self.inner.borrow();
                    let mut tree = inner.tree.borrow_mut();
                    // The wrapper may have been destroyed since the reveal
                    // was queued.
                    if let Some(style) = tree.style_mut(outer) {
                        style.width = width;
                    }
                }
                DeferredTask::RefreshAll => {
                    let run = {
                        let mut inner = self.inner.borrow_mut();
                        let now = inner.clock.now();
                        inner.throttle.trailing_elapsed(now)
                    };
                    if run {
                        self.refresh_all();
                    }
                }
            }
        }
        count
    }

    /// Earliest pending deferred deadline, for hosts driving a wakeup timer.
    pub fn next_due_task(&self) -> Option<std::time::Instant> {
        self.inner.borrow().timers.next_due()
    }
}
