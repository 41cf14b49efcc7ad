use super::*;
use crate::bindings::DIALOG_AND_WINDOW_CONTEXT;
use crate::bindings::WINDOW_CONTEXT;

struct Fixture {
    wb: Workbench,
    app: ElementId,
    window: ElementId,
    p1: ElementId,
    p2: ElementId,
    save: ElementId,
}

fn fixture() -> Fixture {
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
    wb.activate(p1).unwrap();
    let save = wb.add_command(app, "cmd.save", "Save", &[]).unwrap();
    Fixture {
        wb,
        app,
        window,
        p1,
        p2,
        save,
    }
}

fn seq(text: &str) -> KeySequence {
    text.parse().unwrap()
}

fn bind(wb: &mut Workbench, table: ElementId, keys: &str, command: ElementId) -> ElementId {
    let pcmd = wb
        .parameterize(command, std::iter::empty::<(&str, &str)>())
        .unwrap();
    wb.add_key_binding(table, seq(keys), pcmd, None).unwrap()
}

#[test]
fn test_part_handler_beats_application_handler() {
    let mut f = fixture();
    let app_handler = f.wb.add_handler(f.app, "h.app", f.save).unwrap();
    let part_handler = f.wb.add_handler(f.p1, "h.p1", f.save).unwrap();

    assert_eq!(f.wb.resolve_handler(f.save, f.p1).unwrap(), part_handler);
    assert_eq!(f.wb.resolve_handler(f.save, f.p2).unwrap(), app_handler);
    assert_eq!(f.wb.resolve_active_handler(f.save, f.app).unwrap(), part_handler);
}

#[test]
fn test_window_handler_between_part_and_application() {
    let mut f = fixture();
    f.wb.add_handler(f.app, "h.app", f.save).unwrap();
    let window_handler = f.wb.add_handler(f.window, "h.window", f.save).unwrap();
    assert_eq!(f.wb.resolve_handler(f.save, f.p2).unwrap(), window_handler);
}

#[test]
fn test_missing_handler_is_not_found() {
    let f = fixture();
    let err = f.wb.resolve_handler(f.save, f.p1).unwrap_err();
    assert_eq!(err, ModelError::NotFound("handler for command 'cmd.save'".to_string()));
}

#[test]
fn test_handler_for_other_command_is_ignored() {
    let mut f = fixture();
    let close = f.wb.add_command(f.app, "cmd.close", "Close", &[]).unwrap();
    f.wb.add_handler(f.p1, "h.close", close).unwrap();
    let app_handler = f.wb.add_handler(f.app, "h.save", f.save).unwrap();
    assert_eq!(f.wb.resolve_handler(f.save, f.p1).unwrap(), app_handler);
}

#[test]
fn test_binding_context_stack_innermost_first() {
    let mut f = fixture();
    f.wb.add_binding_context(f.p1, "ctx.editor").unwrap();
    f.wb.add_binding_context(f.p1, WINDOW_CONTEXT).unwrap();

    let stack = f.wb.binding_context_stack(f.p1).unwrap();
    assert_eq!(stack, vec!["ctx.editor", WINDOW_CONTEXT, DIALOG_AND_WINDOW_CONTEXT]);
}

#[test]
fn test_key_binding_resolves_through_context_stack() {
    let mut f = fixture();
    let table = f.wb.add_binding_table(f.app, DIALOG_AND_WINDOW_CONTEXT).unwrap();
    bind(&mut f.wb, table, "Ctrl+s", f.save);

    let pcmd = f.wb.resolve_key_binding(&seq("Ctrl+s"), f.p1).unwrap();
    assert_eq!(pcmd.command(), f.save);

    let err = f.wb.resolve_key_binding(&seq("Ctrl+q"), f.p1).unwrap_err();
    assert_eq!(err, ModelError::NotBound("Ctrl+q".to_string()));
}

#[test]
fn test_binding_for_undeclared_context_is_not_bound() {
    let mut f = fixture();
    f.wb.add_binding_context(f.p2, "ctx.p2").unwrap();
    let table = f.wb.add_binding_table(f.window, "ctx.p2").unwrap();
    bind(&mut f.wb, table, "Ctrl+e", f.save);

    let err = f.wb.resolve_key_binding(&seq("Ctrl+e"), f.p1).unwrap_err();
    assert!(matches!(err, ModelError::NotBound(_)));
    assert_eq!(f.wb.resolve_key_binding(&seq("Ctrl+e"), f.p2).unwrap().command(), f.save);
}

#[test]
fn test_inner_context_shadows_outer() {
    let mut f = fixture();
    let close = f.wb.add_command(f.app, "cmd.close", "Close", &[]).unwrap();
    let outer = f.wb.add_binding_table(f.app, DIALOG_AND_WINDOW_CONTEXT).unwrap();
    let inner = f.wb.add_binding_table(f.app, WINDOW_CONTEXT).unwrap();
    bind(&mut f.wb, outer, "Ctrl+w", f.save);
    bind(&mut f.wb, inner, "Ctrl+w", close);

    assert_eq!(f.wb.resolve_key_binding(&seq("Ctrl+w"), f.p1).unwrap().command(), close);
    // The application alone only sees the outer context.
    assert_eq!(f.wb.resolve_key_binding(&seq("Ctrl+w"), f.app).unwrap().command(), f.save);

    assert_eq!(f.wb.sequences_for_command(close, f.p1).unwrap(), vec![seq("Ctrl+w")]);
    assert!(f.wb.sequences_for_command(f.save, f.p1).unwrap().is_empty());
}

#[test]
fn test_binding_to_disposed_command_is_skipped() {
    let mut f = fixture();
    let doomed = f.wb.add_command(f.app, "cmd.doomed", "Doomed", &[]).unwrap();
    let table = f.wb.add_binding_table(f.app, DIALOG_AND_WINDOW_CONTEXT).unwrap();
    bind(&mut f.wb, table, "Ctrl+d", doomed);
    bind(&mut f.wb, table, "Ctrl+d", f.save);

    f.wb.remove(f.app, doomed).unwrap();
    assert_eq!(f.wb.resolve_key_binding(&seq("Ctrl+d"), f.p1).unwrap().command(), f.save);
}

#[test]
fn test_partial_match_for_chords() {
    let mut f = fixture();
    let table = f.wb.add_binding_table(f.app, DIALOG_AND_WINDOW_CONTEXT).unwrap();
    bind(&mut f.wb, table, "Ctrl+k Ctrl+s", f.save);

    assert!(f.wb.is_partial_match(&seq("Ctrl+k"), f.p1).unwrap());
    assert!(!f.wb.is_partial_match(&seq("Ctrl+k Ctrl+s"), f.p1).unwrap());
    assert!(!f.wb.is_partial_match(&seq("Ctrl+j"), f.p1).unwrap());
    assert!(f.wb.resolve_key_binding(&seq("Ctrl+k"), f.p1).is_err());
}

#[test]
fn test_tables_in_scope_follow_active_path() {
    let mut f = fixture();
    let app_table = f.wb.add_binding_table(f.app, DIALOG_AND_WINDOW_CONTEXT).unwrap();
    let window_table = f.wb.add_binding_table(f.window, WINDOW_CONTEXT).unwrap();

    assert_eq!(
        f.wb.binding_tables_in_scope(f.p1).unwrap(),
        vec![window_table, app_table]
    );
    assert_eq!(f.wb.binding_tables_in_scope(f.app).unwrap(), vec![app_table]);
}
