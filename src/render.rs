//! 渲染边界：widget / renderer / to_be_rendered / visible
//!
//! 模型只存储这些槽位，不解释它们。外部 Renderer 通过
//! `realize_subtree` / `unrealize_subtree` 读写。

use crate::model::{Capability, ElementId, Opaque, Result, Slot, Workbench};

/// Turns model elements into widgets. Implemented outside the model.
pub trait Renderer {
    /// `None` means the element has no widget of its own.
    fn realize(&mut self, workbench: &Workbench, element: ElementId) -> Option<Opaque>;

    fn unrealize(&mut self, workbench: &Workbench, element: ElementId, widget: Opaque);
}

impl Workbench {
    pub fn widget(&self, element: ElementId) -> Result<Option<&Opaque>> {
        Ok(self
            .require(element, Capability::UiElement)?
            .render()
            .widget
            .as_ref())
    }

    /// Pure storage: containment is never touched. Returns the previous widget.
    pub fn set_widget(&mut self, element: ElementId, widget: Option<Opaque>) -> Result<Option<Opaque>> {
        let element = self.require_mut(element, Capability::UiElement)?;
        Ok(std::mem::replace(&mut element.render.widget, widget))
    }

    pub fn renderer(&self, element: ElementId) -> Result<Option<&Opaque>> {
        Ok(self
            .require(element, Capability::UiElement)?
            .render()
            .renderer
            .as_ref())
    }

    pub fn set_renderer(
        &mut self,
        element: ElementId,
        renderer: Option<Opaque>,
    ) -> Result<Option<Opaque>> {
        let element = self.require_mut(element, Capability::UiElement)?;
        Ok(std::mem::replace(&mut element.render.renderer, renderer))
    }

    pub fn to_be_rendered(&self, element: ElementId) -> Result<bool> {
        Ok(self
            .require(element, Capability::UiElement)?
            .render()
            .to_be_rendered)
    }

    pub fn set_to_be_rendered(&mut self, element: ElementId, value: bool) -> Result<()> {
        self.require_mut(element, Capability::UiElement)?
            .render
            .to_be_rendered = value;
        Ok(())
    }

    pub fn visible(&self, element: ElementId) -> Result<bool> {
        Ok(self.require(element, Capability::UiElement)?.render().visible)
    }

    pub fn set_visible(&mut self, element: ElementId, value: bool) -> Result<()> {
        self.require_mut(element, Capability::UiElement)?.render.visible = value;
        Ok(())
    }

    /// UI elements of the subtree in pre-order, skipping subtrees marked
    /// `to_be_rendered = false`.
    fn renderable(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(element) = self.element(id) else {
                continue;
            };
            if !element.kind().is_ui_element() || !element.render().to_be_rendered {
                continue;
            }
            out.push(id);
            for slot in Slot::ALL.into_iter().rev().filter(|s| s.is_ui()) {
                stack.extend(element.owned(slot).iter().rev().copied());
            }
        }
        out
    }
}

/// Asks `renderer` for a widget for every renderable element below `root` that has
/// none yet. Returns how many widgets were stored.
pub fn realize_subtree(
    workbench: &mut Workbench,
    root: ElementId,
    renderer: &mut dyn Renderer,
) -> Result<usize> {
    workbench.require(root, Capability::UiElement)?;
    let mut realized = 0;
    for id in workbench.renderable(root) {
        if workbench.widget(id)?.is_some() {
            continue;
        }
        if let Some(widget) = renderer.realize(workbench, id) {
            workbench.set_widget(id, Some(widget))?;
            realized += 1;
        }
    }
    tracing::debug!(root = ?root, realized, "subtree realized");
    Ok(realized)
}

/// Clears every widget below `root`, children before parents, handing each one
/// back to `renderer`. Subtrees marked `to_be_rendered = false` are included so
/// nothing outlives its element.
pub fn unrealize_subtree(
    workbench: &mut Workbench,
    root: ElementId,
    renderer: &mut dyn Renderer,
) -> Result<usize> {
    workbench.require(root, Capability::UiElement)?;
    let mut order: Vec<ElementId> = std::iter::once(root)
        .chain(workbench.descendants(root)?)
        .filter(|&id| workbench.kind(id).is_ok_and(|k| k.is_ui_element()))
        .collect();
    order.reverse();

    let mut released = 0;
    for id in order {
        if let Some(widget) = workbench.set_widget(id, None)? {
            renderer.unrealize(workbench, id, widget);
            released += 1;
        }
    }
    tracing::debug!(root = ?root, released, "subtree unrealized");
    Ok(released)
}

#[cfg(test)]
#[path = "../tests/unit/render.rs"]
mod tests;
