//! 解析：从 active leaf 向上
//!
//! - Handler：最近的 HandlerContainer 优先，Application 兜底
//! - 按键序列：按 binding-context 栈（内层优先）逐个查表，先命中者胜

use super::key::KeySequence;
use super::ParameterizedCommand;
use crate::model::{ElementId, ElementKind, ModelError, Result, Slot, Workbench};
use compact_str::CompactString;

impl Workbench {
    /// Closest handler for `command` at or above `active_leaf`.
    pub fn resolve_handler(&self, command: ElementId, active_leaf: ElementId) -> Result<ElementId> {
        let command_el = self.expect_kind(command, ElementKind::Command)?;
        self.get(active_leaf)?;

        for scope in self.ancestors(active_leaf) {
            let Some(element) = self.element(scope) else {
                continue;
            };
            if !element.kind().is_handler_container() {
                continue;
            }
            for &handler in element.owned(Slot::Handlers) {
                if self.handler_command(handler)? == Some(command) {
                    tracing::debug!(command = ?command, scope = ?scope, handler = ?handler, "handler resolved");
                    return Ok(handler);
                }
            }
        }

        Err(ModelError::NotFound(format!(
            "handler for command '{}'",
            command_el.element_id()
        )))
    }

    /// Resolves against the active leaf below `start`.
    pub fn resolve_active_handler(&self, command: ElementId, start: ElementId) -> Result<ElementId> {
        let leaf = self.active_leaf(start)?;
        self.resolve_handler(command, leaf)
    }

    /// Binding-context ids active at `active_leaf`, innermost first. A repeated id
    /// keeps only its innermost position.
    pub fn binding_context_stack(&self, active_leaf: ElementId) -> Result<Vec<CompactString>> {
        self.get(active_leaf)?;
        let mut stack: Vec<CompactString> = Vec::new();
        for scope in self.ancestors(active_leaf) {
            let Some(element) = self.element(scope) else {
                continue;
            };
            if !element.kind().declares_binding_contexts() {
                continue;
            }
            for id in element.binding_contexts() {
                if !stack.contains(id) {
                    stack.push(id.clone());
                }
            }
        }
        Ok(stack)
    }

    /// Binding tables owned by binding containers at or above `active_leaf`, innermost first.
    pub fn binding_tables_in_scope(&self, active_leaf: ElementId) -> Result<Vec<ElementId>> {
        self.get(active_leaf)?;
        Ok(self
            .ancestors(active_leaf)
            .filter_map(|scope| self.element(scope))
            .filter(|e| e.kind().is_binding_container())
            .flat_map(|e| e.owned(Slot::BindingTables).iter().copied())
            .collect())
    }

    /// First table in scope at `active_leaf` for `context_id`. Bindings placed at
    /// its front take precedence over every other binding of that context.
    pub fn innermost_binding_table(
        &self,
        active_leaf: ElementId,
        context_id: &str,
    ) -> Result<Option<ElementId>> {
        Ok(self
            .binding_tables_in_scope(active_leaf)?
            .into_iter()
            .find(|&table| {
                self.element(table)
                    .and_then(|t| t.data().as_binding_table())
                    .is_some_and(|t| t.binding_context_id == context_id)
            }))
    }

    /// Every live key binding visible at `active_leaf`, in resolution order.
    fn active_bindings(&self, active_leaf: ElementId) -> Result<Vec<ElementId>> {
        let stack = self.binding_context_stack(active_leaf)?;
        let tables = self.binding_tables_in_scope(active_leaf)?;
        let mut bindings = Vec::new();

        for context_id in &stack {
            for &table in &tables {
                let Some(table_el) = self.element(table) else {
                    continue;
                };
                let matches_context = table_el
                    .data()
                    .as_binding_table()
                    .is_some_and(|t| &t.binding_context_id == context_id);
                if !matches_context {
                    continue;
                }
                for &binding in table_el.owned(Slot::Bindings) {
                    let live = self
                        .element(binding)
                        .and_then(|b| b.data().as_key_binding())
                        .is_some_and(|b| {
                            self.reachable(binding, b.command().command(), ElementKind::Command)
                        });
                    if live {
                        bindings.push(binding);
                    }
                }
            }
        }

        Ok(bindings)
    }

    /// The key binding element `sequence` triggers at `active_leaf`.
    pub fn find_key_binding(&self, sequence: &KeySequence, active_leaf: ElementId) -> Result<ElementId> {
        self.active_bindings(active_leaf)?
            .into_iter()
            .find(|&b| {
                self.element(b)
                    .and_then(|e| e.data().as_key_binding())
                    .is_some_and(|d| d.sequence() == sequence)
            })
            .ok_or_else(|| {
                tracing::debug!(sequence = %sequence, leaf = ?active_leaf, "key sequence not bound");
                ModelError::NotBound(sequence.to_string())
            })
    }

    pub fn resolve_key_binding(
        &self,
        sequence: &KeySequence,
        active_leaf: ElementId,
    ) -> Result<ParameterizedCommand> {
        let binding = self.find_key_binding(sequence, active_leaf)?;
        self.element(binding)
            .and_then(|e| e.data().as_key_binding())
            .map(|d| d.command().clone())
            .ok_or(ModelError::InvalidElement)
    }

    /// `sequence` is a proper prefix of some binding visible at `active_leaf`,
    /// so more strokes may follow.
    pub fn is_partial_match(&self, sequence: &KeySequence, active_leaf: ElementId) -> Result<bool> {
        Ok(self.active_bindings(active_leaf)?.into_iter().any(|b| {
            self.element(b)
                .and_then(|e| e.data().as_key_binding())
                .is_some_and(|d| sequence.is_prefix_of(d.sequence()))
        }))
    }

    /// Sequences that trigger `command` at `active_leaf`, in resolution order.
    /// Sequences shadowed by an earlier binding are left out.
    pub fn sequences_for_command(
        &self,
        command: ElementId,
        active_leaf: ElementId,
    ) -> Result<Vec<KeySequence>> {
        self.expect_kind(command, ElementKind::Command)?;
        let mut seen: Vec<&KeySequence> = Vec::new();
        let mut sequences = Vec::new();
        for binding in self.active_bindings(active_leaf)? {
            let Some(data) = self.element(binding).and_then(|e| e.data().as_key_binding()) else {
                continue;
            };
            if seen.contains(&data.sequence()) {
                continue;
            }
            seen.push(data.sequence());
            if data.command().command() == command {
                sequences.push(data.sequence().clone());
            }
        }
        Ok(sequences)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bindings/resolver.rs"]
mod tests;
