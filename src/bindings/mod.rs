//! 命令、处理器与快捷键
//!
//! - key: 按键 / 按键序列
//! - resolver: 沿 active path 解析 Handler 与按键序列

pub mod key;
mod resolver;

use crate::model::{
    BindingTableData, CommandData, ElementData, ElementId, ElementKind, HandlerData,
    KeyBindingData, ModelError, Result, Slot, Workbench,
};
use compact_str::CompactString;
use key::KeySequence;

pub const DIALOG_AND_WINDOW_CONTEXT: &str = "contexts.dialogAndWindow";
pub const WINDOW_CONTEXT: &str = "contexts.window";
pub const DIALOG_CONTEXT: &str = "contexts.dialog";

/// A command plus resolved argument values, in the command's declared parameter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedCommand {
    command: ElementId,
    parameters: Vec<(CompactString, String)>,
}

impl ParameterizedCommand {
    pub fn command(&self) -> ElementId {
        self.command
    }

    pub fn parameters(&self) -> &[(CompactString, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Workbench {
    pub fn create_command(&mut self, element_id: &str, name: &str) -> ElementId {
        self.create(
            ElementData::Command(CommandData {
                name: name.to_string(),
                ..CommandData::default()
            }),
            element_id,
        )
    }

    /// Creates a command and attaches it to the application.
    pub fn add_command(
        &mut self,
        application: ElementId,
        element_id: &str,
        name: &str,
        args: &[&str],
    ) -> Result<ElementId> {
        self.expect_kind(application, ElementKind::Application)?;
        let command = self.create_command(element_id, name);
        if let Some(data) = self.get_mut(command)?.command_mut() {
            data.args = args.iter().map(|a| CompactString::from(*a)).collect();
        }
        if let Err(err) = self.append(application, command) {
            self.dispose(command)?;
            return Err(err);
        }
        Ok(command)
    }

    pub fn commands(&self, application: ElementId) -> Result<&[ElementId]> {
        self.owned(application, Slot::Commands)
    }

    pub fn find_command_by_name(&self, application: ElementId, name: &str) -> Option<ElementId> {
        self.commands(application).ok()?.iter().copied().find(|&c| {
            self.element(c)
                .and_then(|e| e.data().as_command())
                .is_some_and(|d| d.name == name)
        })
    }

    /// Looks a command up by element id first, then by name.
    pub fn find_command(&self, application: ElementId, key: &str) -> Option<ElementId> {
        self.commands(application)
            .ok()?
            .iter()
            .copied()
            .find(|&c| self.element(c).is_some_and(|e| e.element_id() == key))
            .or_else(|| self.find_command_by_name(application, key))
    }

    /// Creates a handler for `command` and attaches it to `container`.
    pub fn add_handler(
        &mut self,
        container: ElementId,
        element_id: &str,
        command: ElementId,
    ) -> Result<ElementId> {
        self.expect_kind(command, ElementKind::Command)?;
        let handler = self.create(
            ElementData::Handler(HandlerData {
                command: Some(command),
            }),
            element_id,
        );
        if let Err(err) = self.append(container, handler) {
            self.dispose(handler)?;
            return Err(err);
        }
        Ok(handler)
    }

    pub fn handlers(&self, container: ElementId) -> Result<&[ElementId]> {
        self.owned(container, Slot::Handlers)
    }

    pub fn add_binding_table(
        &mut self,
        container: ElementId,
        binding_context_id: &str,
    ) -> Result<ElementId> {
        let table = self.create(
            ElementData::BindingTable(BindingTableData {
                binding_context_id: CompactString::from(binding_context_id),
            }),
            "",
        );
        if let Err(err) = self.append(container, table) {
            self.dispose(table)?;
            return Err(err);
        }
        Ok(table)
    }

    pub fn binding_tables(&self, container: ElementId) -> Result<&[ElementId]> {
        self.owned(container, Slot::BindingTables)
    }

    /// First table owned by `container` for `binding_context_id`.
    pub fn binding_table_for(
        &self,
        container: ElementId,
        binding_context_id: &str,
    ) -> Result<Option<ElementId>> {
        Ok(self.binding_tables(container)?.iter().copied().find(|&t| {
            self.element(t)
                .and_then(|e| e.data().as_binding_table())
                .is_some_and(|d| d.binding_context_id == binding_context_id)
        }))
    }

    /// Validates parameter names against the command's declared args.
    pub fn parameterize<I, K, V>(&self, command: ElementId, parameters: I) -> Result<ParameterizedCommand>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let element = self.expect_kind(command, ElementKind::Command)?;
        let args = element
            .data()
            .as_command()
            .map(|d| d.args.as_slice())
            .unwrap_or_default();

        let mut values: Vec<(usize, CompactString, String)> = Vec::new();
        for (name, value) in parameters {
            let name = name.as_ref();
            let position = args.iter().position(|a| a == name).ok_or_else(|| {
                ModelError::InvalidReference(format!(
                    "command '{}' has no parameter '{name}'",
                    element.element_id()
                ))
            })?;
            values.retain(|(p, _, _)| *p != position);
            values.push((position, CompactString::from(name), value.into()));
        }
        values.sort_by_key(|(p, _, _)| *p);

        Ok(ParameterizedCommand {
            command,
            parameters: values.into_iter().map(|(_, k, v)| (k, v)).collect(),
        })
    }

    pub fn create_key_binding(
        &mut self,
        element_id: &str,
        sequence: KeySequence,
        command: ParameterizedCommand,
    ) -> Result<ElementId> {
        if sequence.is_empty() {
            return Err(ModelError::InvalidReference("empty key sequence".to_string()));
        }
        self.expect_kind(command.command, ElementKind::Command)?;
        Ok(self.create(
            ElementData::KeyBinding(KeyBindingData { sequence, command }),
            element_id,
        ))
    }

    /// Creates a key binding and inserts it into `table` at `index` (end when `None`).
    pub fn add_key_binding(
        &mut self,
        table: ElementId,
        sequence: KeySequence,
        command: ParameterizedCommand,
        index: Option<usize>,
    ) -> Result<ElementId> {
        self.expect_kind(table, ElementKind::BindingTable)?;
        let binding = self.create_key_binding("", sequence, command)?;
        if let Err(err) = self.attach(table, binding, index) {
            self.dispose(binding)?;
            return Err(err);
        }
        Ok(binding)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bindings/declare.rs"]
mod tests;
