use super::*;

struct Layout {
    wb: Workbench,
    app: ElementId,
    window: ElementId,
    stack: ElementId,
    p1: ElementId,
    p2: ElementId,
}

fn layout() -> Layout {
    let mut wb = Workbench::new();
    let app = wb.create_application("app");
    let window = wb.create_default(ElementKind::Window, "window").unwrap();
    let stack = wb.create_default(ElementKind::PartStack, "stack").unwrap();
    let p1 = wb.create_default(ElementKind::Part, "P1").unwrap();
    let p2 = wb.create_default(ElementKind::Part, "P2").unwrap();
    wb.append(app, window).unwrap();
    wb.append(window, stack).unwrap();
    wb.append(stack, p1).unwrap();
    wb.append(stack, p2).unwrap();
    Layout {
        wb,
        app,
        window,
        stack,
        p1,
        p2,
    }
}

#[test]
fn test_attach_links_parent_and_child() {
    let l = layout();
    assert_eq!(l.wb.parent(l.p1).unwrap(), Some(l.stack));
    assert_eq!(l.wb.children(l.stack).unwrap(), &[l.p1, l.p2]);
    assert_eq!(l.wb.parent(l.app).unwrap(), None);
    assert_eq!(l.wb.root_of(l.p2).unwrap(), l.app);
    assert!(l.wb.check_invariants().is_empty());
}

#[test]
fn test_attach_at_index() {
    let mut l = layout();
    let p0 = l.wb.create_default(ElementKind::Editor, "P0").unwrap();
    l.wb.attach(l.stack, p0, Some(0)).unwrap();
    assert_eq!(l.wb.children(l.stack).unwrap(), &[p0, l.p1, l.p2]);

    let p3 = l.wb.create_default(ElementKind::Part, "P3").unwrap();
    let err = l.wb.attach(l.stack, p3, Some(5)).unwrap_err();
    assert_eq!(err, ModelError::IndexOutOfBounds { index: 5, len: 3 });
    assert_eq!(l.wb.parent(p3).unwrap(), None);
}

#[test]
fn test_attach_owned_child_fails() {
    let mut l = layout();
    let other = l.wb.create_default(ElementKind::PartStack, "other").unwrap();
    l.wb.append(l.window, other).unwrap();

    let err = l.wb.append(other, l.p1).unwrap_err();
    assert_eq!(err, ModelError::ElementAlreadyOwned { child: l.p1 });
    assert_eq!(l.wb.parent(l.p1).unwrap(), Some(l.stack));
    assert!(l.wb.children(other).unwrap().is_empty());
}

#[test]
fn test_attach_ancestor_is_cycle() {
    let mut l = layout();
    let sash = l.wb.create_default(ElementKind::PartSashContainer, "sash").unwrap();
    let inner = l.wb.create_default(ElementKind::PartSashContainer, "inner").unwrap();
    l.wb.append(sash, inner).unwrap();

    let err = l.wb.append(inner, sash).unwrap_err();
    assert_eq!(
        err,
        ModelError::CycleDetected {
            container: inner,
            child: sash
        }
    );
    assert_eq!(l.wb.parent(sash).unwrap(), None);
    assert_eq!(l.wb.children(inner).unwrap(), &[] as &[ElementId]);

    let err = l.wb.append(sash, sash).unwrap_err();
    assert!(matches!(err, ModelError::CycleDetected { .. }));
}

#[test]
fn test_attach_incompatible_kind() {
    let mut l = layout();
    let err = l.wb.append(l.p1, l.window).unwrap_err();
    assert!(matches!(err, ModelError::CycleDetected { .. }));

    let lone_window = l.wb.create_default(ElementKind::Window, "w2").unwrap();
    let err = l.wb.append(l.stack, lone_window).unwrap_err();
    assert_eq!(
        err,
        ModelError::IncompatibleChild {
            container: ElementKind::PartStack,
            child: ElementKind::Window
        }
    );
}

#[test]
fn test_main_menu_holds_one() {
    let mut l = layout();
    let menu = l.wb.create_default(ElementKind::Menu, "main").unwrap();
    let extra = l.wb.create_default(ElementKind::Menu, "extra").unwrap();
    l.wb.append(l.window, menu).unwrap();

    assert_eq!(l.wb.main_menu(l.window).unwrap(), Some(menu));
    assert!(l.wb.children(l.window).unwrap().contains(&l.stack));
    let err = l.wb.append(l.window, extra).unwrap_err();
    assert_eq!(
        err,
        ModelError::SlotOccupied {
            container: l.window,
            slot: Slot::MainMenu
        }
    );
}

#[test]
fn test_attach_then_detach_restores_state() {
    let mut l = layout();
    let before: Vec<ElementId> = l.wb.children(l.stack).unwrap().to_vec();

    let p3 = l.wb.create_default(ElementKind::Part, "P3").unwrap();
    l.wb.attach(l.stack, p3, Some(1)).unwrap();
    assert_eq!(l.wb.detach(l.stack, p3).unwrap(), 1);

    assert_eq!(l.wb.children(l.stack).unwrap(), before.as_slice());
    assert_eq!(l.wb.parent(p3).unwrap(), None);
    assert!(l.wb.contains(p3));
}

#[test]
fn test_detach_non_child() {
    let mut l = layout();
    let err = l.wb.detach(l.window, l.p1).unwrap_err();
    assert_eq!(
        err,
        ModelError::NotAttached {
            container: l.window,
            child: l.p1
        }
    );
}

#[test]
fn test_detach_active_child_does_not_promote() {
    let mut l = layout();
    l.wb.set_active_child(l.stack, Some(l.p1)).unwrap();
    l.wb.detach(l.stack, l.p1).unwrap();

    assert_eq!(l.wb.active_child(l.stack).unwrap(), None);
    assert_eq!(l.wb.children(l.stack).unwrap(), &[l.p2]);
}

#[test]
fn test_set_active_child_rules() {
    let mut l = layout();
    let err = l.wb.set_active_child(l.stack, Some(l.window)).unwrap_err();
    assert!(matches!(err, ModelError::InvalidReference(_)));
    assert_eq!(l.wb.active_child(l.stack).unwrap(), None);

    let err = l.wb.set_active_child(l.p1, None).unwrap_err();
    assert!(matches!(err, ModelError::MissingCapability { .. }));

    l.wb.set_active_child(l.stack, Some(l.p2)).unwrap();
    assert_eq!(l.wb.active_child(l.stack).unwrap(), Some(l.p2));
    l.wb.set_active_child(l.stack, None).unwrap();
    assert_eq!(l.wb.active_child(l.stack).unwrap(), None);
}

#[test]
fn test_active_path_and_activate() {
    let mut l = layout();
    assert_eq!(l.wb.active_leaf(l.app).unwrap(), l.app);

    l.wb.activate(l.p2).unwrap();
    assert_eq!(l.wb.active_leaf(l.app).unwrap(), l.p2);
    assert_eq!(
        l.wb.active_path(l.app).unwrap(),
        vec![l.app, l.window, l.stack, l.p2]
    );
    assert_eq!(l.wb.active_leaf(l.window).unwrap(), l.p2);
}

#[test]
fn test_move_to_reparents() {
    let mut l = layout();
    let other = l.wb.create_default(ElementKind::PartStack, "other").unwrap();
    l.wb.append(l.window, other).unwrap();

    l.wb.move_to(l.p1, other, None).unwrap();
    assert_eq!(l.wb.parent(l.p1).unwrap(), Some(other));
    assert_eq!(l.wb.children(l.stack).unwrap(), &[l.p2]);
    assert!(l.wb.check_invariants().is_empty());
}

#[test]
fn test_move_to_failure_rolls_back() {
    let mut l = layout();
    l.wb.set_active_child(l.stack, Some(l.p1)).unwrap();

    let err = l.wb.move_to(l.p1, l.app, None).unwrap_err();
    assert!(matches!(err, ModelError::IncompatibleChild { .. }));
    assert_eq!(l.wb.children(l.stack).unwrap(), &[l.p1, l.p2]);
    assert_eq!(l.wb.active_child(l.stack).unwrap(), Some(l.p1));

    let err = l.wb.move_to(l.window, l.stack, None).unwrap_err();
    assert!(matches!(err, ModelError::CycleDetected { .. }));
    assert_eq!(l.wb.parent(l.window).unwrap(), Some(l.app));
}

#[test]
fn test_dispose_requires_detached() {
    let mut l = layout();
    let err = l.wb.dispose(l.stack).unwrap_err();
    assert_eq!(err, ModelError::ElementAlreadyOwned { child: l.stack });

    let removed = l.wb.remove(l.window, l.stack).unwrap();
    assert_eq!(removed, 3);
    assert!(!l.wb.contains(l.p1));
    assert_eq!(l.wb.get(l.p2).unwrap_err(), ModelError::InvalidElement);
    assert!(l.wb.children(l.window).unwrap().is_empty());
    assert!(l.wb.check_invariants().is_empty());
}

#[test]
fn test_descendants_pre_order() {
    let mut l = layout();
    let command = l.wb.add_command(l.app, "cmd", "Cmd", &[]).unwrap();

    let order: Vec<ElementId> = l.wb.descendants(l.app).unwrap().collect();
    assert_eq!(order, vec![l.window, l.stack, l.p1, l.p2, command]);
}

#[test]
fn test_find_and_find_by_element_id() {
    let l = layout();
    let parts: Vec<ElementId> = l
        .wb
        .find(l.app, |_, e| e.kind() == ElementKind::Part)
        .unwrap()
        .collect();
    assert_eq!(parts, vec![l.p1, l.p2]);

    let first = l.wb.find(l.app, |_, e| e.kind().is_part_like()).unwrap().next();
    assert_eq!(first, Some(l.p1));

    assert_eq!(l.wb.find_by_element_id(l.app, "P2"), Some(l.p2));
    assert_eq!(l.wb.find_by_element_id(l.app, "app"), Some(l.app));
    assert_eq!(l.wb.find_by_element_id(l.stack, "window"), None);
}

#[test]
fn test_default_binding_contexts() {
    let l = layout();
    assert_eq!(
        l.wb.binding_contexts(l.app).unwrap(),
        &[CompactString::from(DIALOG_AND_WINDOW_CONTEXT)]
    );
    assert_eq!(
        l.wb.binding_contexts(l.window).unwrap(),
        &[CompactString::from(WINDOW_CONTEXT)]
    );
    assert!(l.wb.binding_contexts(l.p1).unwrap().is_empty());

    let mut custom = Workbench::with_defaults(DefaultBindingContexts {
        application: vec![],
        window: vec![CompactString::from("ctx.custom")],
    });
    let app = custom.create_application("app");
    assert!(custom.binding_contexts(app).unwrap().is_empty());
}

#[test]
fn test_create_key_binding_kind_needs_data() {
    let mut wb = Workbench::new();
    let err = wb.create_default(ElementKind::KeyBinding, "kb").unwrap_err();
    assert!(matches!(err, ModelError::InvalidReference(_)));
    assert!(wb.is_empty());
}
