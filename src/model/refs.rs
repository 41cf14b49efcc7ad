//! Non-owning references: handler → command, item → command, part → menus/toolbar,
//! window trim sides, declared binding contexts.
//!
//! Setters validate the target. Getters drop targets that have since been
//! disposed or detached into another tree, so a stale reference reads as absent
//! until the target is attached back under the holder's root.

use super::element::{Element, ElementData, Side};
use super::error::{ModelError, Result};
use super::kind::{Capability, ElementKind};
use super::tree::Workbench;
use super::ElementId;
use compact_str::CompactString;

impl Workbench {
    pub(crate) fn expect_kind(&self, id: ElementId, kind: ElementKind) -> Result<&Element> {
        let element = self.get(id)?;
        if element.kind() != kind {
            return Err(ModelError::InvalidReference(format!(
                "{id:?} is a {}, expected {kind}",
                element.kind()
            )));
        }
        Ok(element)
    }

    /// `target` is alive, a `kind`, and shares a root with `holder`.
    pub(crate) fn reachable(&self, holder: ElementId, target: ElementId, kind: ElementKind) -> bool {
        self.element(target).is_some_and(|e| e.kind() == kind)
            && self.ancestors(holder).last() == self.ancestors(target).last()
    }

    fn live_of_kind(
        &self,
        holder: ElementId,
        id: Option<ElementId>,
        kind: ElementKind,
    ) -> Option<ElementId> {
        id.filter(|&id| self.reachable(holder, id, kind))
    }

    pub fn set_handler_command(
        &mut self,
        handler: ElementId,
        command: Option<ElementId>,
    ) -> Result<()> {
        self.expect_kind(handler, ElementKind::Handler)?;
        if let Some(command) = command {
            self.expect_kind(command, ElementKind::Command)?;
        }
        if let ElementData::Handler(data) = self.get_mut(handler)?.data_mut() {
            data.command = command;
        }
        Ok(())
    }

    pub fn handler_command(&self, handler: ElementId) -> Result<Option<ElementId>> {
        let command = match self.expect_kind(handler, ElementKind::Handler)?.data() {
            ElementData::Handler(data) => data.command,
            _ => None,
        };
        Ok(self.live_of_kind(handler, command, ElementKind::Command))
    }

    pub fn set_item_command(&mut self, item: ElementId, command: Option<ElementId>) -> Result<()> {
        if !matches!(self.kind(item)?, ElementKind::MenuItem | ElementKind::ToolItem) {
            return Err(ModelError::InvalidReference(format!(
                "{item:?} is not a menu or tool item"
            )));
        }
        if let Some(command) = command {
            self.expect_kind(command, ElementKind::Command)?;
        }
        if let Some(data) = self.get_mut(item)?.item_mut() {
            data.command = command;
        }
        Ok(())
    }

    pub fn item_command(&self, item: ElementId) -> Result<Option<ElementId>> {
        let command = self.get(item)?.data().as_item().and_then(|i| i.command);
        Ok(self.live_of_kind(item, command, ElementKind::Command))
    }

    fn part_data_mut(&mut self, part: ElementId) -> Result<&mut super::element::PartData> {
        let element = self.get_mut(part)?;
        let kind = element.kind();
        element
            .part_mut()
            .ok_or_else(|| ModelError::InvalidReference(format!("{part:?} is a {kind}, not a part")))
    }

    /// Returns `false` when the menu was already referenced.
    pub fn add_part_menu(&mut self, part: ElementId, menu: ElementId) -> Result<bool> {
        self.expect_kind(menu, ElementKind::Menu)?;
        let data = self.part_data_mut(part)?;
        if data.menus.contains(&menu) {
            return Ok(false);
        }
        data.menus.push(menu);
        Ok(true)
    }

    pub fn remove_part_menu(&mut self, part: ElementId, menu: ElementId) -> Result<bool> {
        let data = self.part_data_mut(part)?;
        let before = data.menus.len();
        data.menus.retain(|&m| m != menu);
        Ok(before != data.menus.len())
    }

    pub fn part_menus(&self, part: ElementId) -> Result<Vec<ElementId>> {
        let element = self.get(part)?;
        let data = element.data().as_part().ok_or_else(|| {
            ModelError::InvalidReference(format!("{part:?} is a {}, not a part", element.kind()))
        })?;
        Ok(data
            .menus
            .iter()
            .copied()
            .filter_map(|m| self.live_of_kind(part, Some(m), ElementKind::Menu))
            .collect())
    }

    pub fn set_part_toolbar(&mut self, part: ElementId, toolbar: Option<ElementId>) -> Result<()> {
        if let Some(toolbar) = toolbar {
            self.expect_kind(toolbar, ElementKind::ToolBar)?;
        }
        self.part_data_mut(part)?.toolbar = toolbar;
        Ok(())
    }

    pub fn part_toolbar(&self, part: ElementId) -> Result<Option<ElementId>> {
        let toolbar = self.get(part)?.data().as_part().and_then(|p| p.toolbar);
        Ok(self.live_of_kind(part, toolbar, ElementKind::ToolBar))
    }

    /// `trim` must be a trim container among the window's children.
    pub fn set_trim(
        &mut self,
        window: ElementId,
        side: Side,
        trim: Option<ElementId>,
    ) -> Result<()> {
        let window_el = self.expect_kind(window, ElementKind::Window)?;
        if let Some(trim) = trim {
            self.expect_kind(trim, ElementKind::TrimContainer)?;
            if !window_el.children().contains(&trim) {
                return Err(ModelError::InvalidReference(format!(
                    "{trim:?} is not a child of window {window:?}"
                )));
            }
        }
        if let Some(data) = self.get_mut(window)?.window_mut() {
            *data.trim.side_mut(side) = trim;
        }
        Ok(())
    }

    pub fn trim(&self, window: ElementId, side: Side) -> Result<Option<ElementId>> {
        let window_el = self.expect_kind(window, ElementKind::Window)?;
        let trim = match window_el.data() {
            ElementData::Window(data) => data.trim.side(side),
            _ => None,
        };
        Ok(trim.filter(|t| window_el.children().contains(t)))
    }

    pub fn main_menu(&self, window: ElementId) -> Result<Option<ElementId>> {
        let window_el = self.expect_kind(window, ElementKind::Window)?;
        Ok(window_el
            .owned(super::kind::Slot::MainMenu)
            .first()
            .copied())
    }

    pub fn binding_contexts(&self, element: ElementId) -> Result<&[CompactString]> {
        Ok(self
            .require(element, Capability::BindingContexts)?
            .binding_contexts())
    }

    /// Returns `false` when the id was already declared.
    pub fn add_binding_context(&mut self, element: ElementId, context_id: &str) -> Result<bool> {
        let contexts = self
            .require_mut(element, Capability::BindingContexts)?
            .binding_contexts_mut();
        if contexts.iter().any(|c| c == context_id) {
            return Ok(false);
        }
        contexts.push(CompactString::from(context_id));
        Ok(true)
    }

    pub fn remove_binding_context(&mut self, element: ElementId, context_id: &str) -> Result<bool> {
        let contexts = self
            .require_mut(element, Capability::BindingContexts)?
            .binding_contexts_mut();
        let before = contexts.len();
        contexts.retain(|c| c != context_id);
        Ok(before != contexts.len())
    }

    pub fn set_binding_contexts<I, S>(&mut self, element: ElementId, context_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let contexts = self
            .require_mut(element, Capability::BindingContexts)?
            .binding_contexts_mut();
        contexts.clear();
        for id in context_ids {
            let id = id.as_ref();
            if !contexts.iter().any(|c| c == id) {
                contexts.push(CompactString::from(id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/refs.rs"]
mod tests;
