use super::*;
use crate::model::{ElementKind, ModelError};

/// Records every call and hands out the element's id string as widget.
#[derive(Default)]
struct RecordingRenderer {
    realized: Vec<ElementId>,
    unrealized: Vec<ElementId>,
}

impl Renderer for RecordingRenderer {
    fn realize(&mut self, workbench: &Workbench, element: ElementId) -> Option<Opaque> {
        self.realized.push(element);
        let kind = workbench.kind(element).ok()?;
        // Stacks are drawn by their parts.
        if kind == ElementKind::PartStack {
            return None;
        }
        let name = workbench.get(element).ok()?.element_id().to_string();
        Some(Opaque::new(name))
    }

    fn unrealize(&mut self, _workbench: &Workbench, element: ElementId, widget: Opaque) {
        assert!(widget.is::<String>());
        self.unrealized.push(element);
    }
}

fn tree() -> (Workbench, ElementId, ElementId, ElementId, ElementId, ElementId) {
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
    wb.add_command(app, "cmd", "Cmd", &[]).unwrap();
    (wb, app, window, stack, p1, p2)
}

#[test]
fn test_render_slots_defaults() {
    let (wb, _, window, ..) = tree();
    assert!(wb.widget(window).unwrap().is_none());
    assert!(wb.renderer(window).unwrap().is_none());
    assert!(wb.to_be_rendered(window).unwrap());
    assert!(wb.visible(window).unwrap());
}

#[test]
fn test_render_slots_need_ui_element() {
    let (mut wb, app, ..) = tree();
    let command = wb.find_command(app, "cmd").unwrap();
    let err = wb.set_widget(command, Some(Opaque::new(1u8))).unwrap_err();
    assert!(matches!(err, ModelError::MissingCapability { .. }));
    assert!(wb.visible(command).is_err());
}

#[test]
fn test_set_widget_is_pure_storage() {
    let (mut wb, _, window, stack, p1, p2) = tree();
    let widget = Opaque::new(String::from("shell"));
    assert!(wb.set_widget(window, Some(widget.clone())).unwrap().is_none());

    assert!(wb.widget(window).unwrap().unwrap().ptr_eq(&widget));
    assert_eq!(wb.children(stack).unwrap(), &[p1, p2]);
    assert!(wb.set_widget(window, None).unwrap().is_some());
}

#[test]
fn test_realize_subtree_pre_order() {
    let (mut wb, app, window, stack, p1, p2) = tree();
    let mut renderer = RecordingRenderer::default();

    let count = realize_subtree(&mut wb, app, &mut renderer).unwrap();
    assert_eq!(renderer.realized, vec![app, window, stack, p1, p2]);
    assert_eq!(count, 4);
    assert_eq!(
        wb.widget(p2).unwrap().and_then(|w| w.downcast_ref::<String>()),
        Some(&"P2".to_string())
    );
    assert!(wb.widget(stack).unwrap().is_none());

    // Already realized elements are left alone.
    let mut again = RecordingRenderer::default();
    realize_subtree(&mut wb, app, &mut again).unwrap();
    assert_eq!(again.realized, vec![stack]);
}

#[test]
fn test_realize_skips_hidden_subtree() {
    let (mut wb, app, window, stack, p1, p2) = tree();
    wb.set_to_be_rendered(stack, false).unwrap();
    let mut renderer = RecordingRenderer::default();

    realize_subtree(&mut wb, app, &mut renderer).unwrap();
    assert_eq!(renderer.realized, vec![app, window]);
    assert!(wb.widget(p1).unwrap().is_none());
    assert!(wb.widget(p2).unwrap().is_none());
}

#[test]
fn test_unrealize_children_first() {
    let (mut wb, app, window, _, p1, p2) = tree();
    let mut renderer = RecordingRenderer::default();
    realize_subtree(&mut wb, app, &mut renderer).unwrap();

    let released = unrealize_subtree(&mut wb, window, &mut renderer).unwrap();
    assert_eq!(released, 3);
    assert_eq!(renderer.unrealized, vec![p2, p1, window]);
    assert!(wb.widget(window).unwrap().is_none());
    assert!(wb.widget(app).unwrap().is_some());
}
