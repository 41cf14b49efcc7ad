//! 作用域上下文：每个 context owner 一张独立的 properties 表，
//! 查找沿 parent 链向上委托，到 Application 终止。
//!
//! `variables` 只是声明（文档性质），不限制可见性；
//! 它只影响 `modify_property` 写到哪一层。

use super::error::{ModelError, Result};
use super::kind::Capability;
use super::tree::Workbench;
use super::ElementId;
use compact_str::CompactString;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    variables: Vec<CompactString>,
    properties: FxHashMap<String, String>,
}

impl Context {
    pub fn variables(&self) -> &[CompactString] {
        &self.variables
    }

    pub fn declares(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> &FxHashMap<String, String> {
        &self.properties
    }

    pub(crate) fn declare(&mut self, name: &str) -> bool {
        if self.declares(name) {
            return false;
        }
        self.variables.push(CompactString::from(name));
        true
    }

    pub(crate) fn undeclare(&mut self, name: &str) -> bool {
        let before = self.variables.len();
        self.variables.retain(|v| v != name);
        before != self.variables.len()
    }

    pub(crate) fn set(&mut self, name: &str, value: String) -> Option<String> {
        self.properties.insert(name.to_string(), value)
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<String> {
        self.properties.remove(name)
    }
}

impl Workbench {
    pub fn context(&self, element: ElementId) -> Result<&Context> {
        let element = self.require(element, Capability::Context)?;
        element.context().ok_or(ModelError::MissingCapability {
            kind: element.kind(),
            capability: Capability::Context,
        })
    }

    fn context_mut(&mut self, element: ElementId) -> Result<&mut Context> {
        let element = self.require_mut(element, Capability::Context)?;
        let kind = element.kind();
        element.context.as_mut().ok_or(ModelError::MissingCapability {
            kind,
            capability: Capability::Context,
        })
    }

    /// Nearest context owner at or above `element`.
    pub fn context_owner(&self, element: ElementId) -> Result<Option<ElementId>> {
        self.get(element)?;
        Ok(self.context_chain(element).next())
    }

    /// Context owners from `element` up to the root, innermost first.
    pub fn context_chain(&self, element: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.ancestors(element)
            .filter(move |&id| self.element(id).is_some_and(|e| e.context().is_some()))
    }

    pub fn lookup(&self, element: ElementId, name: &str) -> Result<&str> {
        self.get(element)?;
        self.context_chain(element)
            .find_map(|owner| self.element(owner)?.context()?.get(name))
            .ok_or_else(|| ModelError::NotFound(format!("context value '{name}'")))
    }

    /// Only the element's own scope, no delegation.
    pub fn lookup_local(&self, element: ElementId, name: &str) -> Result<&str> {
        self.context(element)?
            .get(name)
            .ok_or_else(|| ModelError::NotFound(format!("context value '{name}'")))
    }

    pub fn set_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        Ok(self.context_mut(element)?.set(name, value.into()))
    }

    pub fn remove_property(&mut self, element: ElementId, name: &str) -> Result<Option<String>> {
        Ok(self.context_mut(element)?.remove(name))
    }

    pub fn declare_variable(&mut self, element: ElementId, name: &str) -> Result<bool> {
        Ok(self.context_mut(element)?.declare(name))
    }

    pub fn undeclare_variable(&mut self, element: ElementId, name: &str) -> Result<bool> {
        Ok(self.context_mut(element)?.undeclare(name))
    }

    /// Writes `name` into the nearest scope that declares it as a variable, or into
    /// the element's own effective scope when none does. Returns the scope written.
    pub fn modify_property(
        &mut self,
        element: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<ElementId> {
        self.get(element)?;
        let target = self
            .context_chain(element)
            .find(|&owner| {
                self.element(owner)
                    .and_then(|e| e.context())
                    .is_some_and(|c| c.declares(name))
            })
            .or_else(|| self.context_chain(element).next())
            .ok_or_else(|| ModelError::NotFound(format!("context owner for '{name}'")))?;

        self.context_mut(target)?.set(name, value.into());
        tracing::debug!(element = ?element, scope = ?target, name, "context modified");
        Ok(target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/context.rs"]
mod tests;
