//! Integration test: drive a viewer through the wire format, layout,
//! hit-testing, zoom, reset and teardown the way a host would.

use std::cell::RefCell;
use std::rc::Rc;

use icicle_core::layout::Geometry;
use icicle_core::parsers::parse_auto;
use icicle_core::{
    CallTreeNode, Click, ClickAction, Modifiers, NodeId, ProfileForest, ProfileViewer,
    ProportionalMetrics, StyleRegistry, SurfaceSize, ViewerConfig,
};
use icicle_protocol::{Rect, RenderCommand};

const PROFILE: &str = r#"{
    "all": {
        "func": "root", "file": "", "path": "", "line": 0, "count": 100, "flags": 0,
        "children": [
            { "func": "A", "file": "a.jl", "path": "/src/a.jl", "line": 1, "count": 60, "flags": 0,
              "children": [
                  { "func": "A1", "file": "a.jl", "path": "/src/a.jl", "line": 10, "count": 30, "flags": 0, "children": [] },
                  { "func": "A2", "file": "a.jl", "path": "/src/a.jl", "line": 20, "count": 30, "flags": 2, "children": [] }
              ] },
            { "func": "B", "file": "b.jl", "path": "/src/b.jl", "line": 2, "count": 40, "flags": 16, "children": [] }
        ]
    },
    "2": { "func": "worker", "file": "w.jl", "path": "/src/w.jl", "line": 5, "count": 7, "flags": 0, "children": [] }
}"#;

fn open(width: f64, height: f64) -> ProfileViewer {
    let mut viewer = ProfileViewer::new(
        SurfaceSize {
            css_width: width,
            css_height: height,
            dpr: 1.0,
        },
        &StyleRegistry::default(),
        ViewerConfig::default(),
        Box::new(ProportionalMetrics::SANS),
    )
    .expect("surface is valid");
    let forest = ProfileForest::from_json(PROFILE.as_bytes()).expect("profile parses");
    viewer.set_data(Some(forest));
    viewer
}

fn id_of(viewer: &ProfileViewer, name: &str) -> NodeId {
    let tree = viewer.tree().expect("data loaded");
    tree.iter()
        .find(|(_, n)| n.func == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

fn snapshot(geometry: &Geometry) -> Vec<(NodeId, Option<Rect>)> {
    geometry
        .placed()
        .iter()
        .map(|&id| (id, geometry.rect(id)))
        .collect()
}

#[test]
fn three_level_tree_end_to_end() {
    let mut viewer = open(200.0, 400.0);
    let row = viewer.row_height();

    let widths: Vec<(String, f64)> = {
        let tree = viewer.tree().expect("tree").clone();
        let geometry = viewer.layout();
        tree.iter()
            .map(|(id, n)| (n.func.clone(), geometry.rect(id).map_or(-1.0, |r| r.w)))
            .collect()
    };
    assert_eq!(
        widths,
        vec![
            ("root".to_string(), 200.0),
            ("A".to_string(), 120.0),
            ("A1".to_string(), 60.0),
            ("A2".to_string(), 60.0),
            ("B".to_string(), 80.0),
        ]
    );

    // The second row belongs to A and B; x = 90 falls inside A.
    assert_eq!(viewer.node_at(90.0, row + 5.0), Some(id_of(&viewer, "A")));

    // A1 owns the third row's left half.
    let a1 = id_of(&viewer, "A1");
    let center = viewer.layout().rect(a1).expect("A1 placed").center();
    assert_eq!(viewer.node_at(center.x, center.y), Some(a1));
    assert_eq!(
        viewer.on_click(Click::single(center.x, center.y)),
        ClickAction::ZoomedIn(a1)
    );
    assert_eq!(viewer.active_node(), Some(a1));
    assert_eq!(viewer.layout().rect(a1), Some(Rect::new(0.0, 0.0, 200.0, row)));
}

#[test]
fn zoom_then_double_click_restores_geometry() {
    let mut viewer = open(200.0, 400.0);
    let before = snapshot(viewer.layout());
    let row = viewer.row_height();

    viewer.on_click(Click::single(10.0, row + 5.0));
    assert_eq!(viewer.active_node(), Some(id_of(&viewer, "A")));
    assert_ne!(snapshot(viewer.layout()), before);

    assert_eq!(
        viewer.on_click(Click::double(10.0, 390.0)),
        ClickAction::Reset
    );
    assert_eq!(snapshot(viewer.layout()), before);
}

#[test]
fn frames_carry_both_layers() {
    let mut viewer = open(200.0, 400.0);
    let first = viewer.frame();
    let base = first.base.expect("base layer");
    let labels: Vec<&str> = base
        .iter()
        .filter_map(|c| match c {
            RenderCommand::DrawText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["root", "A", "A1", "A2", "B"]);

    viewer.on_pointer_move(150.0, viewer.row_height() + 5.0);
    let hover = viewer.frame();
    assert!(hover.base.is_none(), "hover must not repaint the tree");
    let tooltip = hover.overlay.and_then(|o| o.tooltip).expect("tooltip");
    assert_eq!(tooltip.function, "B");
    assert_eq!(tooltip.flags, vec!["foreign"]);
    assert_eq!(tooltip.location.as_deref(), Some("b.jl:2"));
}

#[test]
fn ctrl_click_reports_source_path() {
    let mut viewer = open(200.0, 400.0);
    let opened = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&opened);
    viewer.register_ctrl_click_handler(Some(Box::new(move |node: &CallTreeNode| {
        *sink.borrow_mut() = Some((node.path.clone(), node.line));
    })));

    let row = viewer.row_height();
    let click = Click::single(150.0, row + 5.0).with_modifiers(Modifiers {
        ctrl: false,
        meta: true,
    });
    viewer.on_click(click);
    assert_eq!(*opened.borrow(), Some(("/src/b.jl".to_string(), 2)));
    assert_eq!(viewer.active_node(), viewer.tree().map(|t| t.root()));

    viewer.register_ctrl_click_handler(None);
    viewer.on_pointer_move(150.0, row + 5.0);
    let tooltip = viewer.frame().overlay.and_then(|o| o.tooltip).expect("tooltip");
    assert_eq!(tooltip.hint, None);
}

#[test]
fn switching_selection_then_destroying() {
    let registry = StyleRegistry::default();
    let mut viewer = ProfileViewer::new(
        SurfaceSize {
            css_width: 300.0,
            css_height: 200.0,
            dpr: 2.0,
        },
        &registry,
        ViewerConfig::default(),
        Box::new(ProportionalMetrics::SANS),
    )
    .expect("surface is valid");
    viewer.set_data(ProfileForest::from_json(PROFILE.as_bytes()).ok());
    assert_eq!(viewer.selections(), vec!["all", "2"]);
    assert_eq!(viewer.current_selection(), Some("all"));

    let switched = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&switched);
    viewer.register_selection_handler(Some(Box::new(move |key: &str| {
        sink.borrow_mut().push(key.to_owned());
    })));
    viewer.select("2").expect("known selection");
    assert_eq!(*switched.borrow(), vec!["2".to_string()]);
    assert_eq!(viewer.active_node(), Some(id_of(&viewer, "worker")));

    assert!(registry.is_installed());
    viewer.destroy();
    assert!(viewer.is_destroyed());
    assert!(!registry.is_installed());
    viewer.destroy();
    viewer.on_wheel(-100.0);
    assert!(viewer.frame().is_empty());
}

#[test]
fn scrolling_shifts_hits_one_level_down() {
    // One full row plus half of the next: the children hang off the bottom.
    let mut viewer = open(200.0, 30.0);
    let row = viewer.row_height();
    viewer.frame();
    let root = id_of(&viewer, "root");
    let a = id_of(&viewer, "A");
    assert_eq!(viewer.node_at(10.0, 5.0), Some(root));

    assert!(viewer.on_wheel(row));
    assert_eq!(viewer.scroll_position(), -row);
    let scrolled = viewer.frame();
    assert!(scrolled.base.is_some());

    assert_eq!(viewer.node_at(10.0, 5.0), Some(a));
    assert_eq!(viewer.node_at(10.0, row + 5.0), Some(id_of(&viewer, "A1")));
    assert_eq!(viewer.layout().rect(root), Some(Rect::new(0.0, -row, 200.0, row)));

    viewer.on_pointer_move(10.0, 5.0);
    let tooltip = viewer.frame().overlay.and_then(|o| o.tooltip).expect("tooltip");
    assert_eq!(tooltip.function, "A");

    assert_eq!(viewer.on_click(Click::single(10.0, 5.0)), ClickAction::ZoomedIn(a));
    assert_eq!(viewer.scroll_position(), 0.0);
}

#[test]
fn resizing_moves_hits_with_the_new_width() {
    let mut viewer = open(200.0, 400.0);
    let row = viewer.row_height();
    viewer.frame();
    let before = snapshot(viewer.layout());
    assert_eq!(viewer.node_at(90.0, row + 5.0), Some(id_of(&viewer, "A")));

    viewer.on_resize(100.0, 400.0, 1.0);
    let resized = viewer.frame();
    assert!(resized.canvas.is_some());
    assert!(resized.base.is_some());

    // A now ends at x = 60, so the same point lands in B.
    assert_eq!(viewer.node_at(90.0, row + 5.0), Some(id_of(&viewer, "B")));
    assert_eq!(viewer.node_at(150.0, row + 5.0), None);

    let after = snapshot(viewer.layout());
    assert_eq!(after.len(), before.len());
    for ((id, old), (same, new)) in before.iter().zip(&after) {
        assert_eq!(id, same);
        let (old, new) = (old.expect("placed"), new.expect("placed"));
        assert_eq!(new.w, old.w / 2.0);
        assert_eq!(new.x, old.x / 2.0);
        assert_eq!(new.y, old.y);
    }
}

#[test]
fn very_deep_stack_scrolls_to_the_bottom() {
    const DEPTH: usize = 10_000;
    let stack = (0..DEPTH).map(|i| format!("f{i}")).collect::<Vec<_>>().join(";");
    let forest = parse_auto(format!("{stack} 1\n").as_bytes()).expect("collapsed stack parses");

    let mut viewer = ProfileViewer::new(
        SurfaceSize {
            css_width: 200.0,
            css_height: 400.0,
            dpr: 1.0,
        },
        &StyleRegistry::default(),
        ViewerConfig::default(),
        Box::new(ProportionalMetrics::SANS),
    )
    .expect("surface is valid");
    viewer.set_data(Some(forest));
    let row = viewer.row_height();
    assert!(viewer.frame().base.is_some());

    // Far past the last row: nothing visible, but the frame still renders.
    assert!(viewer.on_wheel(1e9));
    let empty = viewer.frame().base.expect("base layer");
    assert!(!empty.iter().any(|c| matches!(c, RenderCommand::DrawRect { .. })));
    assert_eq!(viewer.node_at(10.0, 5.0), None);

    // Back up until the deepest frame, at depth DEPTH below the "all" root,
    // is the eleventh visible row.
    let bottom = -row * (DEPTH as f64 - 10.0);
    assert!(viewer.on_wheel(viewer.scroll_position() - bottom));
    assert_eq!(viewer.scroll_position(), bottom);
    assert!(viewer.frame().base.is_some());
    assert!(!viewer.can_scroll_down());

    let last = id_of(&viewer, &format!("f{}", DEPTH - 1));
    assert_eq!(viewer.node_at(10.0, 10.5 * row), Some(last));
    assert_eq!(
        viewer.node_at(10.0, 9.5 * row),
        Some(id_of(&viewer, &format!("f{}", DEPTH - 2)))
    );
    assert_eq!(viewer.node_at(10.0, 11.5 * row), None);
}

