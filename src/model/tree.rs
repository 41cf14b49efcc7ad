//! 包含树：元素 arena + attach/detach
//!
//! 父子关系只在 `attach` / `detach` 内同步：
//! - `child.parent == c` 当且仅当 `c` 的某个 slot 拥有 `child`
//! - 不允许成环，不允许隐式换父节点
//! - detach 当前 active child 时不会自动提升兄弟节点

use super::element::{Element, ElementData};
use super::error::{ModelError, Result};
use super::kind::{Capability, ElementKind, Slot};
use super::ElementId;
use crate::bindings::{DIALOG_AND_WINDOW_CONTEXT, WINDOW_CONTEXT};
use compact_str::CompactString;
use slotmap::SlotMap;

/// Binding contexts new Application and Window elements declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBindingContexts {
    pub application: Vec<CompactString>,
    pub window: Vec<CompactString>,
}

impl Default for DefaultBindingContexts {
    fn default() -> Self {
        Self {
            application: vec![CompactString::from(DIALOG_AND_WINDOW_CONTEXT)],
            window: vec![CompactString::from(WINDOW_CONTEXT)],
        }
    }
}

pub struct Workbench {
    arena: SlotMap<ElementId, Element>,
    defaults: DefaultBindingContexts,
}

impl Workbench {
    pub fn new() -> Self {
        Self::with_defaults(DefaultBindingContexts::default())
    }

    pub fn with_defaults(defaults: DefaultBindingContexts) -> Self {
        Self {
            arena: SlotMap::with_key(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &DefaultBindingContexts {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Creates a detached element.
    pub fn create(&mut self, data: ElementData, element_id: &str) -> ElementId {
        let kind = data.kind();
        let mut element = Element::new(data, element_id);
        match kind {
            ElementKind::Application => {
                *element.binding_contexts_mut() = self.defaults.application.clone();
            }
            ElementKind::Window => {
                *element.binding_contexts_mut() = self.defaults.window.clone();
            }
            _ => {}
        }
        self.arena.insert(element)
    }

    pub fn create_default(&mut self, kind: ElementKind, element_id: &str) -> Result<ElementId> {
        let data = ElementData::for_kind(kind).ok_or_else(|| {
            ModelError::InvalidReference(format!(
                "{kind} needs a key sequence and a command, use create_key_binding"
            ))
        })?;
        Ok(self.create(data, element_id))
    }

    pub fn create_application(&mut self, element_id: &str) -> ElementId {
        self.create(ElementData::Application, element_id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.arena.get(id)
    }

    pub fn get(&self, id: ElementId) -> Result<&Element> {
        self.arena.get(id).ok_or(ModelError::InvalidElement)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.arena.get_mut(id).ok_or(ModelError::InvalidElement)
    }

    pub fn kind(&self, id: ElementId) -> Result<ElementKind> {
        self.get(id).map(Element::kind)
    }

    pub(crate) fn require(&self, id: ElementId, capability: Capability) -> Result<&Element> {
        let element = self.get(id)?;
        let kind = element.kind();
        if !kind.has(capability) {
            return Err(ModelError::MissingCapability { kind, capability });
        }
        Ok(element)
    }

    pub(crate) fn require_mut(
        &mut self,
        id: ElementId,
        capability: Capability,
    ) -> Result<&mut Element> {
        self.require(id, capability)?;
        self.get_mut(id)
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>> {
        self.get(id).map(Element::parent)
    }

    pub fn children(&self, container: ElementId) -> Result<&[ElementId]> {
        self.get(container).map(Element::children)
    }

    pub fn owned(&self, container: ElementId, slot: Slot) -> Result<&[ElementId]> {
        self.get(container).map(|e| e.owned(slot))
    }

    /// `id` itself first, then each parent up to the root.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            arena: &self.arena,
            next: self.arena.contains_key(id).then_some(id),
        }
    }

    /// Strict: an element is not its own ancestor.
    pub fn is_ancestor(&self, ancestor: ElementId, descendant: ElementId) -> bool {
        self.ancestors(descendant).skip(1).any(|id| id == ancestor)
    }

    pub fn root_of(&self, id: ElementId) -> Result<ElementId> {
        self.get(id)?;
        Ok(self.ancestors(id).last().unwrap_or(id))
    }

    pub fn append(&mut self, container: ElementId, child: ElementId) -> Result<()> {
        self.attach(container, child, None)
    }

    /// Inserts `child` into the slot of `container` that owns its kind, at `index`
    /// (end when `None`). Nothing is mutated on failure.
    pub fn attach(
        &mut self,
        container: ElementId,
        child: ElementId,
        index: Option<usize>,
    ) -> Result<()> {
        let container_kind = self.kind(container)?;
        let child_el = self.get(child)?;
        let child_kind = child_el.kind();

        if container == child || self.is_ancestor(child, container) {
            tracing::debug!(container = ?container, child = ?child, "attach rejected: cycle");
            return Err(ModelError::CycleDetected { container, child });
        }
        if child_el.parent.is_some() {
            return Err(ModelError::ElementAlreadyOwned { child });
        }

        let slot = Slot::for_child(container_kind, child_kind).ok_or(
            ModelError::IncompatibleChild {
                container: container_kind,
                child: child_kind,
            },
        )?;

        let len = self.arena[container].owned.get(slot).len();
        if slot.capacity().is_some_and(|cap| len >= cap) {
            return Err(ModelError::SlotOccupied { container, slot });
        }
        let index = index.unwrap_or(len);
        if index > len {
            return Err(ModelError::IndexOutOfBounds { index, len });
        }

        self.arena[container]
            .owned
            .get_mut(slot)
            .insert(index, child);
        self.arena[child].parent = Some(container);

        tracing::debug!(
            container = ?container,
            child = ?child,
            kind = %child_kind,
            slot = ?slot,
            index,
            "attached"
        );
        Ok(())
    }

    /// Removes `child` from `container` and returns the index it held in its slot.
    /// The child stays alive and can be attached elsewhere.
    pub fn detach(&mut self, container: ElementId, child: ElementId) -> Result<usize> {
        self.get(container)?;
        if self.get(child)?.parent != Some(container) {
            return Err(ModelError::NotAttached { container, child });
        }

        let parent = &mut self.arena[container];
        let (slot, index) = parent
            .owned
            .slot_of(child)
            .ok_or(ModelError::NotAttached { container, child })?;
        parent.owned.get_mut(slot).remove(index);
        if parent.active_child == Some(child) {
            // No sibling is promoted.
            parent.active_child = None;
        }
        self.arena[child].parent = None;

        tracing::debug!(container = ?container, child = ?child, slot = ?slot, index, "detached");
        Ok(index)
    }

    /// Re-parents `child` under `container`. The tree is unchanged when this fails.
    pub fn move_to(
        &mut self,
        child: ElementId,
        container: ElementId,
        index: Option<usize>,
    ) -> Result<()> {
        self.get(container)?;
        if container == child || self.is_ancestor(child, container) {
            return Err(ModelError::CycleDetected { container, child });
        }

        let Some(old_parent) = self.get(child)?.parent else {
            return self.attach(container, child, index);
        };
        let was_active = self.arena[old_parent].active_child == Some(child);
        let old_index = self.detach(old_parent, child)?;

        if let Err(err) = self.attach(container, child, index) {
            self.attach(old_parent, child, Some(old_index))?;
            if was_active {
                self.arena[old_parent].active_child = Some(child);
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn active_child(&self, container: ElementId) -> Result<Option<ElementId>> {
        self.get(container).map(Element::active_child)
    }

    pub fn set_active_child(
        &mut self,
        container: ElementId,
        child: Option<ElementId>,
    ) -> Result<()> {
        let element = self.require(container, Capability::Container)?;
        if let Some(child) = child {
            if !element.children().contains(&child) {
                return Err(ModelError::InvalidReference(format!(
                    "{child:?} is not a child of {container:?}"
                )));
            }
        }
        self.arena[container].active_child = child;
        Ok(())
    }

    /// Follows `activeChild` links down from `start`.
    pub fn active_leaf(&self, start: ElementId) -> Result<ElementId> {
        self.get(start)?;
        let mut current = start;
        while let Some(next) = self.arena.get(current).and_then(|e| e.active_child) {
            current = next;
        }
        Ok(current)
    }

    /// `start` followed by each active child below it.
    pub fn active_path(&self, start: ElementId) -> Result<Vec<ElementId>> {
        self.get(start)?;
        let mut path = vec![start];
        let mut current = start;
        while let Some(next) = self.arena.get(current).and_then(|e| e.active_child) {
            path.push(next);
            current = next;
        }
        Ok(path)
    }

    /// Makes `element` the active child of its parent, and so on up to the root.
    pub fn activate(&mut self, element: ElementId) -> Result<()> {
        self.get(element)?;
        let mut current = element;
        while let Some(parent) = self.arena[current].parent {
            let parent_el = &mut self.arena[parent];
            if parent_el.children().contains(&current) {
                parent_el.active_child = Some(current);
            }
            current = parent;
        }
        Ok(())
    }

    /// Destroys a detached element and its owned subtree. Returns how many elements
    /// were destroyed. Non-owning references to them read as absent afterwards.
    pub fn dispose(&mut self, element: ElementId) -> Result<usize> {
        if self.get(element)?.parent.is_some() {
            return Err(ModelError::ElementAlreadyOwned { child: element });
        }

        let mut stack = vec![element];
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(el) = self.arena.remove(id) {
                stack.extend(el.owned.iter());
                removed += 1;
            }
        }

        tracing::debug!(element = ?element, removed, "disposed");
        Ok(removed)
    }

    pub fn remove(&mut self, container: ElementId, child: ElementId) -> Result<usize> {
        self.detach(container, child)?;
        self.dispose(child)
    }

    /// Every owned descendant of `container` in pre-order, slot by slot.
    pub fn descendants(&self, container: ElementId) -> Result<Descendants<'_>> {
        let element = self.get(container)?;
        Ok(Descendants {
            arena: &self.arena,
            stack: element.owned.iter().rev().collect(),
        })
    }

    /// Lazy pre-order search below `container`. The borrow keeps the tree frozen
    /// while the iterator lives.
    pub fn find<'a, P>(
        &'a self,
        container: ElementId,
        mut predicate: P,
    ) -> Result<impl Iterator<Item = ElementId> + 'a>
    where
        P: FnMut(ElementId, &Element) -> bool + 'a,
    {
        let arena = &self.arena;
        Ok(self
            .descendants(container)?
            .filter(move |&id| arena.get(id).is_some_and(|e| predicate(id, e))))
    }

    /// `root` itself or the first descendant with the given `id` attribute.
    pub fn find_by_element_id(&self, root: ElementId, element_id: &str) -> Option<ElementId> {
        let element = self.arena.get(root)?;
        if element.element_id() == element_id {
            return Some(root);
        }
        self.find(root, |_, e| e.element_id() == element_id)
            .ok()?
            .next()
    }

    pub(crate) fn arena(&self) -> &SlotMap<ElementId, Element> {
        &self.arena
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Ancestors<'a> {
    arena: &'a SlotMap<ElementId, Element>,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.arena.get(id).and_then(|e| e.parent);
        Some(id)
    }
}

pub struct Descendants<'a> {
    arena: &'a SlotMap<ElementId, Element>,
    stack: Vec<ElementId>,
}

impl Iterator for Descendants<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(element) = self.arena.get(id) {
            self.stack.extend(element.owned.iter().rev());
        }
        Some(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/tree.rs"]
mod tests;
