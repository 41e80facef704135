//! End-to-end annotator flow: annotate, reflow, resize bursts, teardown.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::Duration;

use overmark_core::{
    Annotator, ClientRect, ElementId, HostDocument, OverlayTree, ResizeRegistry, ScrollOffset,
    Template, UnderlinePositioner, RESIZE_THROTTLE, REVEAL_DELAY,
};
use overmark_scheduler::{Clock, ManualClock};

#[derive(Default)]
struct PageHost {
    rects: RefCell<HashMap<ElementId, Vec<ClientRect>>>,
    scroll: Cell<ScrollOffset>,
    classes: RefCell<HashMap<ElementId, BTreeSet<String>>>,
}

impl PageHost {
    fn set_rects(&self, element: ElementId, rects: Vec<ClientRect>) {
        self.rects.borrow_mut().insert(element, rects);
    }

    fn class_count(&self, class: &str) -> usize {
        self.classes
            .borrow()
            .values()
            .filter(|set| set.contains(class))
            .count()
    }
}

impl HostDocument for PageHost {
    fn client_rects(&self, element: ElementId) -> Vec<ClientRect> {
        self.rects
            .borrow()
            .get(&element)
            .cloned()
            .unwrap_or_default()
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll.get()
    }

    fn set_element_class(&self, element: ElementId, class: &str, enabled: bool) {
        let mut classes = self.classes.borrow_mut();
        let set = classes.entry(element).or_default();
        if enabled {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
    }
}

struct Page {
    annotator: Annotator,
    host: Rc<PageHost>,
    tree: Rc<RefCell<OverlayTree>>,
    clock: Rc<ManualClock>,
    registry: ResizeRegistry,
}

fn page() -> Page {
    let host = Rc::new(PageHost::default());
    let tree = Rc::new(RefCell::new(OverlayTree::new()));
    let clock = Rc::new(ManualClock::new());

    let mut templates = HashMap::new();
    templates.insert("underline".to_string(), Template::solid("underline"));
    templates.insert("dashed".to_string(), Template::segmented("dashed", 3, 2.0));

    let host_dyn: Rc<dyn HostDocument> = host.clone();
    let clock_dyn: Rc<dyn Clock> = clock.clone();
    let annotator = Annotator::new(
        "page",
        templates,
        Box::new(UnderlinePositioner),
        host_dyn,
        tree.clone(),
        clock_dyn,
    );

    let mut registry = ResizeRegistry::new();
    registry.register(annotator.id(), annotator.resize_hook());

    Page {
        annotator,
        host,
        tree,
        clock,
        registry,
    }
}

fn line(top: f32, width: f32) -> ClientRect {
    ClientRect::with_size(10.0, top, width, 18.0)
}

#[test]
fn annotate_reflow_and_resize_storm() {
    let mut page = page();

    // Three paragraphs, the second one wrapping over two lines.
    page.host.set_rects(1, vec![line(0.0, 300.0)]);
    page.host.set_rects(2, vec![line(20.0, 280.0), line(40.0, 120.0)]);
    page.host.set_rects(3, vec![line(80.0, 200.0)]);

    page.annotator
        .annotate(&[1, 2], "underline", "#d33")
        .unwrap();
    page.annotator.annotate(&[3], "dashed", "#36c").unwrap();

    assert_eq!(page.host.class_count("ovm-page"), 3);
    assert_eq!(
        page.annotator.annotation_info(2).unwrap().fragments.len(),
        2
    );

    // Entrance animation settles.
    page.clock.advance(REVEAL_DELAY);
    page.annotator.run_due_tasks();
    {
        let info = page.annotator.annotation_info(2).unwrap();
        let tree = page.tree.borrow();
        assert_eq!(tree.style(info.fragments[0]).unwrap().width, 280.0);
        assert_eq!(tree.style(info.fragments[1]).unwrap().width, 120.0);
    }

    // A window resize reflows paragraph 2 onto a single wider line. The
    // first notification refreshes immediately; the rest of the burst
    // coalesces into one trailing refresh.
    page.host.set_rects(2, vec![line(20.0, 400.0)]);
    page.registry.notify();
    assert_eq!(
        page.annotator.annotation_info(2).unwrap().fragments.len(),
        1
    );

    page.host.set_rects(1, vec![line(0.0, 360.0)]);
    page.clock.advance(Duration::from_millis(5));
    page.registry.notify();
    page.registry.notify();
    {
        // Still the pre-burst width: the burst is throttled.
        let info = page.annotator.annotation_info(1).unwrap();
        let tree = page.tree.borrow();
        assert_eq!(tree.style(info.fragments[0]).unwrap().width, 300.0);
    }

    page.clock.advance(RESIZE_THROTTLE);
    page.annotator.run_due_tasks();
    {
        let info = page.annotator.annotation_info(1).unwrap();
        let tree = page.tree.borrow();
        assert_eq!(tree.style(info.fragments[0]).unwrap().width, 360.0);
    }
}

#[test]
fn scrolled_page_places_overlays_in_document_space() {
    let page = page();
    page.host.scroll.set(ScrollOffset::new(0.0, 250.0));
    page.host
        .set_rects(7, vec![ClientRect::new(10.0, 5.0, 210.0, 23.0)]);

    page.annotator.annotate(&[7], "underline", "#000").unwrap();

    let outer = page.annotator.annotation_info(7).unwrap().fragments[0];
    let tree = page.tree.borrow();
    // top = (5 + 250) + 18 - 5 with the default height of 5.
    assert_eq!(tree.style(outer).unwrap().top, 268.0);
}

#[test]
fn teardown_unregisters_and_clears_overlays() {
    let mut page = page();
    page.host.set_rects(1, vec![line(0.0, 100.0)]);
    page.annotator.annotate(&[1], "underline", "red").unwrap();

    page.annotator.unannotate(&[1]);
    assert!(page.tree.borrow().is_empty());
    assert_eq!(page.host.class_count("ovm-page"), 0);

    assert!(page.registry.unregister(&page.annotator.id()));
    page.registry.notify();
    assert!(page.registry.is_empty());
}

#[test]
fn pending_reveal_of_removed_fragment_never_fires() {
    let page = page();
    page.host.set_rects(1, vec![line(0.0, 100.0)]);
    page.annotator.annotate(&[1], "underline", "red").unwrap();
    let outer = page.annotator.annotation_info(1).unwrap().fragments[0];

    // The paragraph disappears before the reveal deadline.
    page.host.set_rects(1, Vec::new());
    page.annotator.refresh_element(1).unwrap();

    page.clock.advance(REVEAL_DELAY);
    page.annotator.run_due_tasks();

    let tree = page.tree.borrow();
    assert!(!tree.contains(outer));
    assert!(tree.is_empty());
}
