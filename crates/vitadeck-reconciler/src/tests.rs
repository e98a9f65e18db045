use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vitadeck_core::*;

use crate::*;

/// Depth-first outline of a committed tree, one line per node.
fn outline<T: SceneTree>(tree: &T) -> Vec<String> {
    fn walk<'a, T: SceneTree>(tree: &'a T, node: T::Node<'a>, depth: usize, out: &mut Vec<String>) {
        let line = match tree.view(node) {
            Some(NodeView::Element { props, .. }) => match props {
                Props::Rect(r) => format!("rect {},{} {}x{}", r.x, r.y, r.width, r.height),
                Props::Text(_) => "text".to_string(),
                Props::Button(b) => format!("button {}", b.label),
            },
            Some(NodeView::Text(s)) => format!("'{s}'"),
            None => "?".to_string(),
        };
        out.push(format!("{}{}", "  ".repeat(depth), line));
        for child in tree.children(node) {
            walk(tree, child, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    for root in tree.roots() {
        walk(tree, root, 0, &mut out);
    }
    out
}

fn rect(x: i32, y: i32) -> Props {
    Props::Rect(RectProps::new(x, y, 10, 10))
}

fn commit(backend: &mut PersistentBackend, nodes: Vec<Node>) {
    backend.prepare_for_commit().unwrap();
    let mut set = backend.create_container_child_set();
    for n in nodes {
        backend
            .append_child_to_container_child_set(&mut set, n)
            .unwrap();
    }
    let children = backend.finalize_container_children(set).unwrap();
    backend.replace_container_children(children).unwrap();
    backend.reset_after_commit().unwrap();
}

#[test]
fn test_persistent_build_and_commit() {
    let mut b = PersistentBackend::new();
    let mut parent = b.create_instance(ElementType::Rect, rect(5, 5)).unwrap();
    let mut label = b
        .create_instance(ElementType::Text, Props::Text(TextProps::new()))
        .unwrap();
    let raw = b.create_text_instance("hi").unwrap();
    b.append_initial_child(&mut label, raw).unwrap();
    b.append_initial_child(&mut parent, label).unwrap();
    assert!(!b.finalize_initial_children(&parent).unwrap());

    assert!(b.snapshot().is_empty());
    commit(&mut b, vec![parent]);
    assert!(b.take_committed());
    assert!(!b.take_committed());
    assert_eq!(outline(&b), vec!["rect 5,5 10x10", "  text", "    'hi'"]);
}

#[test]
fn test_persistent_append_to_shared_node_is_rejected() {
    let mut b = PersistentBackend::new();
    let node = b.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    commit(&mut b, vec![node.clone()]);

    let mut shared = node;
    let child = b.create_instance(ElementType::Rect, rect(1, 1)).unwrap();
    assert!(matches!(
        b.append_initial_child(&mut shared, child),
        Err(HostError::ContractViolation(_))
    ));
}

#[test]
fn test_persistent_readers_see_whole_snapshots() {
    let mut b = PersistentBackend::new();
    let a = b.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    let c = b.create_instance(ElementType::Rect, rect(20, 0)).unwrap();
    commit(&mut b, vec![a.clone(), c.clone()]);
    let before = b.snapshot();

    // Build the next tree off to the side; the reader is unaffected.
    let moved = b
        .clone_instance(&a, None, rect(0, 50), true)
        .unwrap();
    assert_eq!(outline(&before), vec!["rect 0,0 10x10", "rect 20,0 10x10"]);
    assert_eq!(outline(&b), outline(&before));

    commit(&mut b, vec![moved, c]);
    assert_eq!(outline(&before), vec!["rect 0,0 10x10", "rect 20,0 10x10"]);
    assert_eq!(outline(&b), vec!["rect 0,50 10x10", "rect 20,0 10x10"]);
    assert!(!Snapshot::ptr_eq(&before, &b.snapshot()));
    assert_eq!(b.commits(), 2);
}

#[test]
fn test_persistent_clone_keeps_identity_and_original() {
    let mut b = PersistentBackend::new();
    let mut parent = b.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    let child = b.create_instance(ElementType::Rect, rect(1, 1)).unwrap();
    b.append_initial_child(&mut parent, child).unwrap();

    let new_props = Props::Rect(RectProps::new(0, 0, 10, 10).color(Color::RED));
    let payload = b.prepare_update(&parent, &rect(0, 0), &new_props).unwrap();
    assert_eq!(
        payload.as_ref().map(|p| p.props.as_slice()),
        Some(&[PropKey::Color][..])
    );

    let kept = b
        .clone_instance(&parent, payload.as_ref(), new_props.clone(), true)
        .unwrap();
    let emptied = b
        .clone_instance(&parent, payload.as_ref(), new_props, false)
        .unwrap();

    assert_eq!(kept.id(), parent.id());
    assert_eq!(kept.children().len(), 1);
    assert!(emptied.children().is_empty());
    assert!(!Node::ptr_eq(&kept, &parent));
    // Original untouched.
    assert_eq!(parent.children().len(), 1);
    assert_eq!(
        parent.as_element().map(|e| e.props.clone()),
        Some(rect(0, 0))
    );
}

#[test]
fn test_persistent_button_clone_drops_children() {
    let mut b = PersistentBackend::new();
    let props = Props::Button(ButtonProps::new(0, 0, 10, 10, "ok"));
    let mut button = b.create_instance(ElementType::Button, props.clone()).unwrap();
    let raw = b.create_text_instance("stray").unwrap();
    b.append_initial_child(&mut button, raw).unwrap();
    let clone = b.clone_instance(&button, None, props, true).unwrap();
    assert!(clone.children().is_empty());
}

#[test]
fn test_persistent_hidden_clones_leave_live_tree_alone() {
    let mut b = PersistentBackend::new();
    let mut parent = b.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    let raw = b.create_text_instance("x").unwrap();
    b.append_initial_child(&mut parent, raw.clone()).unwrap();
    commit(&mut b, vec![parent.clone()]);
    let live = outline(&b);

    let hidden = b.clone_hidden_instance(&parent, rect(9, 9)).unwrap();
    let hidden_text = b.clone_hidden_text_instance(&raw, "y").unwrap();
    assert_eq!(hidden.id(), parent.id());
    assert!(hidden.children().is_empty());
    assert!(matches!(hidden_text, Node::Text(ref s) if &**s == "y"));
    assert_eq!(outline(&b), live);
    assert_eq!(b.commits(), 1);
}

#[test]
fn test_prepare_update_no_change_and_mismatch() {
    let mut b = PersistentBackend::new();
    let node = b.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    assert_eq!(b.prepare_update(&node, &rect(0, 0), &rect(0, 0)), Ok(None));
    assert!(matches!(
        b.prepare_update(&node, &rect(0, 0), &Props::Text(TextProps::new())),
        Err(HostError::KindMismatch { .. })
    ));
    assert!(matches!(
        b.create_instance(ElementType::Button, rect(0, 0)),
        Err(HostError::KindMismatch {
            expected: ElementType::Button,
            found: ElementType::Rect
        })
    ));
}

#[test]
fn test_persistent_detach_deregisters_handlers() {
    let mut b = PersistentBackend::new();
    let props = Props::Rect(RectProps::new(0, 0, 5, 5).handlers(Handlers::new().on_click(|| {})));
    let node = b.create_instance(ElementType::Rect, props).unwrap();
    let id = node.id().unwrap();
    assert!(b.handlers().get(id).is_some());
    b.detach_deleted_instance(&node).unwrap();
    assert!(b.handlers().get(id).is_none());
    assert!(!b.is_live(id));
    assert_eq!(
        b.detach_deleted_instance(&node),
        Err(HostError::UnknownNode(id))
    );
}

#[test]
fn test_nested_commit_is_a_contract_violation() {
    let mut m = MutationBackend::new();
    m.prepare_for_commit().unwrap();
    assert!(matches!(
        m.prepare_for_commit(),
        Err(HostError::ContractViolation(_))
    ));
    m.reset_after_commit().unwrap();
    assert!(matches!(
        m.reset_after_commit(),
        Err(HostError::ContractViolation(_))
    ));
}

#[test]
fn test_mutation_structure_ops() {
    let mut m = MutationBackend::new();
    let a = m.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    let b = m.create_instance(ElementType::Rect, rect(1, 0)).unwrap();
    let c = m.create_instance(ElementType::Rect, rect(2, 0)).unwrap();

    m.append_child_to_container(a).unwrap();
    m.append_child_to_container(c).unwrap();
    m.insert_in_container_before(b, c).unwrap();
    assert_eq!(m.root_children(), &[a, b, c]);

    // Unknown reference: append.
    let d = m.create_instance(ElementType::Rect, rect(3, 0)).unwrap();
    let stranger = m.create_instance(ElementType::Rect, rect(4, 0)).unwrap();
    m.insert_in_container_before(d, stranger).unwrap();
    assert_eq!(m.root_children(), &[a, b, c, d]);

    // Appending an attached child moves it.
    m.append_child(a, d).unwrap();
    assert_eq!(m.root_children(), &[a, b, c]);
    assert_eq!(m.children_of(a), Some(&[d][..]));

    // Removing a non-child is a no-op.
    m.remove_child(b, d).unwrap();
    assert_eq!(m.children_of(a), Some(&[d][..]));
    m.remove_child_from_container(b).unwrap();
    assert_eq!(m.root_children(), &[a, c]);
    assert!(matches!(
        m.pending_mirror_ops().last(),
        Some(MirrorOp::RemoveChild { parent: None, child }) if *child == b
    ));
}

#[test]
fn test_mutation_rejects_move_under_descendant() {
    let mut m = MutationBackend::new();
    let a = m.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    let b = m.create_instance(ElementType::Rect, rect(1, 0)).unwrap();
    let c = m.create_instance(ElementType::Rect, rect(2, 0)).unwrap();
    m.append_child_to_container(a).unwrap();
    m.append_child(a, b).unwrap();
    m.append_child(b, c).unwrap();
    let queued = m.pending_mirror_ops().len();

    let violation = Err(HostError::ContractViolation(
        "node moved under its own descendant",
    ));
    assert_eq!(m.append_child(b, a), violation);
    assert_eq!(m.append_child(c, a), violation);
    assert_eq!(m.insert_before(c, a, b), violation);

    // Nothing moved and nothing was mirrored.
    assert_eq!(m.root_children(), &[a]);
    assert_eq!(m.children_of(a), Some(&[b][..]));
    assert_eq!(m.children_of(b), Some(&[c][..]));
    assert_eq!(m.pending_mirror_ops().len(), queued);

    // Moving a descendant up is still fine.
    m.append_child_to_container(c).unwrap();
    assert_eq!(m.root_children(), &[a, c]);
    assert!(m.children_of(b).is_some_and(|kids| kids.is_empty()));
}

#[test]
fn test_mutation_update_in_place() {
    let mut m = MutationBackend::new();
    let a = m.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    m.append_child_to_container(a).unwrap();
    m.drain_mirror_ops();

    assert_eq!(m.prepare_update(&a, &rect(0, 0), &rect(0, 0)), Ok(None));
    m.commit_update(a, &UpdatePayload::default(), rect(0, 0))
        .unwrap();
    assert!(m.drain_mirror_ops().is_empty());

    let payload = m
        .prepare_update(&a, &rect(0, 0), &rect(3, 4))
        .unwrap()
        .unwrap();
    m.commit_update(a, &payload, rect(3, 4)).unwrap();
    let ops = m.drain_mirror_ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], MirrorOp::Update { id, .. } if id == a));
    assert_eq!(m.props_of(a), Some(&rect(3, 4)));
}

#[test]
fn test_mutation_text_update_and_reset() {
    let mut m = MutationBackend::new();
    let mut label = m
        .create_instance(ElementType::Text, Props::Text(TextProps::new()))
        .unwrap();
    let raw = m.create_text_instance("one").unwrap();
    m.append_initial_child(&mut label, raw).unwrap();
    m.commit_text_update(raw, "one", "two").unwrap();
    assert_eq!(m.text_of(raw), Some("two"));
    assert!(matches!(
        m.commit_text_update(label, "", "x"),
        Err(HostError::ContractViolation(_))
    ));
    m.reset_text_content(label).unwrap();
    assert_eq!(m.children_of(label), Some(&[][..]));
}

#[test]
fn test_mutation_detach_releases_everything() {
    let mut m = MutationBackend::new();
    let props = Props::Button(
        ButtonProps::new(0, 0, 5, 5, "x").handlers(Handlers::new().on_click(|| {})),
    );
    let id = m.create_instance(ElementType::Button, props).unwrap();
    m.append_child_to_container(id).unwrap();
    m.drain_mirror_ops();

    m.remove_child_from_container(id).unwrap();
    m.detach_deleted_instance(&id).unwrap();
    assert!(m.handlers().get(id).is_none());
    assert!(!m.is_live(id));
    let ops = m.drain_mirror_ops();
    assert_eq!(
        ops,
        vec![
            MirrorOp::RemoveChild {
                parent: None,
                child: id
            },
            MirrorOp::Destroy { id }
        ]
    );
}

#[test]
fn test_mirror_ops_reach_the_bridge_with_wire_ids() {
    #[derive(Default)]
    struct Log(Vec<String>);
    impl NodeMirror for Log {
        fn create_node(&mut self, id: &str, _node: &NativeNode) {
            self.0.push(format!("create {id}"));
        }
        fn update_node(&mut self, id: &str, _node: &NativeNode) {
            self.0.push(format!("update {id}"));
        }
        fn destroy_node(&mut self, id: &str) {
            self.0.push(format!("destroy {id}"));
        }
        fn append_child(&mut self, parent: &str, child: &str) {
            self.0.push(format!("append [{parent}] {child}"));
        }
        fn insert_before(&mut self, parent: &str, child: &str, before: &str) {
            self.0.push(format!("insert [{parent}] {child} {before}"));
        }
        fn remove_child(&mut self, parent: &str, child: &str) {
            self.0.push(format!("remove [{parent}] {child}"));
        }
    }

    let mut m = MutationBackend::new();
    let a = m.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    m.append_child_to_container(a).unwrap();
    let mut log = Log::default();
    for op in m.drain_mirror_ops() {
        op.apply(&mut log);
    }
    let id = a.encode();
    assert_eq!(log.0, vec![format!("create {id}"), format!("append [] {id}")]);
}

#[test]
fn test_instrumented_records_per_operation() {
    let metrics = Rc::new(ReconcilerMetrics::new("mutation"));
    let mut host = Instrumented::new(MutationBackend::new(), metrics.clone());
    let id = host.create_instance(ElementType::Rect, rect(0, 0)).unwrap();
    host.append_child_to_container(id).unwrap();
    let err = host.create_instance(ElementType::Text, rect(0, 0));

    assert!(err.is_err());
    assert_eq!(
        metrics.summary_for("mutation.createInstance").map(|s| s.count),
        Some(2)
    );
    assert_eq!(
        metrics.method_names(),
        vec![
            "mutation.appendChildToContainer".to_string(),
            "mutation.createInstance".to_string()
        ]
    );

    let backend = host.into_inner();
    assert_eq!(backend.root_children(), &[id]);
    assert_eq!(metrics.summary().len(), 2);
}

fn scene(count: Rc<Cell<u32>>) -> impl FnMut() -> Vec<VNode> {
    move || {
        let n = count.get();
        let mut kids = vec![VNode::text(TextProps::new(), format!("count {n}"))];
        if n % 2 == 0 {
            kids.push(VNode::button(ButtonProps::new(10, 40, 80, 30, "even")));
        }
        vec![VNode::rect(RectProps::new(100, 100, 200, 200), kids)]
    }
}

#[test]
fn test_positional_driver_same_tree_on_both_backends() {
    let count = Rc::new(Cell::new(0));
    let mut mutation = MutationBackend::new();
    let mut persistent = PersistentBackend::new();
    let mut a = PositionalDriver::new(scene(count.clone()));
    let mut b = PositionalDriver::new(scene(count.clone()));

    for n in 0..4 {
        count.set(n);
        a.drive_mutation(&mut mutation).unwrap();
        b.drive_persistent(&mut persistent).unwrap();
        assert_eq!(outline(&mutation), outline(&persistent));
    }
    assert_eq!(
        outline(&persistent),
        vec!["rect 100,100 200x200", "  text", "    'count 3'"]
    );
    // The button was removed and detached on both sides.
    assert_eq!(mutation.live_count(), 2);
    assert_eq!(persistent.live_count(), 2);
    assert_eq!(mutation.element_count(), 2);
    assert_eq!(persistent.element_count(), 2);
}

#[test]
fn test_positional_driver_keeps_ids_across_updates() {
    let count = Rc::new(Cell::new(0));
    let mut backend = PersistentBackend::new();
    let mut driver = PositionalDriver::new(scene(count.clone()));
    driver.drive_persistent(&mut backend).unwrap();
    let first = backend.snapshot().element_ids();
    count.set(2);
    driver.drive_persistent(&mut backend).unwrap();
    assert_eq!(backend.snapshot().element_ids(), first);
}

#[test]
fn test_positional_driver_skips_commit_when_nothing_changed() {
    let mut backend = PersistentBackend::new();
    let mut driver = PositionalDriver::new(|| vec![VNode::rect(RectProps::new(0, 0, 1, 1), vec![])]);
    driver.drive_persistent(&mut backend).unwrap();
    assert!(backend.take_committed());
    driver.drive_persistent(&mut backend).unwrap();
    assert!(!backend.take_committed());
    assert_eq!(backend.commits(), 1);
}

#[test]
fn test_positional_driver_recovers_from_failed_drive() {
    let count = Rc::new(Cell::new(0));
    let mut backend = MutationBackend::new();
    let mut driver = PositionalDriver::new(scene(count.clone()));
    driver.drive_mutation(&mut backend).unwrap();
    assert_eq!(backend.root_children().len(), 1);

    // A commit already in flight makes the next drive fail.
    backend.prepare_for_commit().unwrap();
    assert!(driver.drive_mutation(&mut backend).is_err());
    backend.reset_after_commit().unwrap();

    count.set(1);
    driver.drive_mutation(&mut backend).unwrap();
    assert_eq!(backend.root_children().len(), 1);
    assert_eq!(
        outline(&backend),
        vec!["rect 100,100 200x200", "  text", "    'count 1'"]
    );
}

#[test]
fn test_manager_switch_unmounts_and_keeps_metrics() {
    let mut manager = ReconcilerManager::new(BackendKind::default());
    assert_eq!(manager.active_kind(), BackendKind::Mutation);

    let hits = Rc::new(RefCell::new(0));
    let hits2 = hits.clone();
    let mut driver = PositionalDriver::new(move || {
        let hits = hits2.clone();
        vec![VNode::button(
            ButtonProps::new(0, 0, 10, 10, "b")
                .handlers(Handlers::new().on_click(move || *hits.borrow_mut() += 1)),
        )]
    });
    manager.drive(&mut driver).unwrap();
    assert_eq!(manager.backend().handlers().len(), 1);
    assert!(manager.metrics(BackendKind::Mutation).summary_for("mutation.createInstance").is_some());

    assert!(manager.switch_to(BackendKind::Mutation).unwrap().is_none());
    let ops = manager.switch_to(BackendKind::Persistent).unwrap().unwrap();
    assert!(ops.iter().any(|op| matches!(op, MirrorOp::Destroy { .. })));
    assert_eq!(manager.active_kind(), BackendKind::Persistent);
    assert_eq!(manager.backend().live_count(), 0);

    driver.forget(BackendKind::Mutation);
    manager.drive(&mut driver).unwrap();
    assert_eq!(manager.backend().handlers().len(), 1);
    assert!(manager.metrics(BackendKind::Mutation).summary_for("mutation.createInstance").is_some());
    assert!(manager.metrics(BackendKind::Persistent).summary_for("persistent.cloneInstance").is_none());

    manager.reset_metrics(None);
    assert!(manager.metrics(BackendKind::Mutation).summary().is_empty());
    assert_eq!(*hits.borrow(), 0);
}

#[test]
fn test_available_backends() {
    let list = available();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "persistent");
    assert_eq!(list[1].label, "Mutation");
    assert_eq!("mutation".parse::<BackendKind>(), Ok(BackendKind::Mutation));
    assert!("fiber".parse::<BackendKind>().is_err());
}
