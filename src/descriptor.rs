//! 描述文件：JSON 形式的模型树
//!
//! 加载只走 `attach` 和各个引用 setter，最后跑一遍 `check_invariants`。
//! 引用按元素 id 字符串解析，找不到即失败。

use crate::bindings::key::KeySequence;
use crate::model::{
    Bounds, ElementData, ElementId, ElementKind, InvariantViolation, ModelError, Side, Workbench,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{from}' refers to unknown element '{target}'")]
    UnresolvedReference { from: String, target: String },
    #[error("a referenced {kind} has no element id")]
    AnonymousReference { kind: ElementKind },
    #[error("'{from}' refers to '{target}', which does not name exactly one saved element")]
    AmbiguousReference { from: String, target: String },
    #[error("{kind} does not take attribute '{attribute}'")]
    UnsupportedAttribute {
        kind: ElementKind,
        attribute: &'static str,
    },
    #[error("{kind} requires attribute '{attribute}'")]
    MissingAttribute {
        kind: ElementKind,
        attribute: &'static str,
    },
    #[error("{} invariant violation(s), first: {}", .0.len(), first_violation(.0))]
    Invariant(Vec<InvariantViolation>),
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn first_violation(violations: &[InvariantViolation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One element and everything it owns. Owned elements of every slot are listed in
/// `children`; the slot follows from the container and child kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub persisted_state: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_be_rendered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
    /// `None` keeps the kind's defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_contexts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_child: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closeable: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dirty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Handler, item and key binding target, by command element id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<KeySequence>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub menus: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolbar: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub trim: BTreeMap<Side, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDescriptor>,
}

impl ElementDescriptor {
    pub fn new(kind: ElementKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            tags: Vec::new(),
            persisted_state: BTreeMap::new(),
            contributor_uri: None,
            contribution_uri: None,
            label: None,
            tooltip: None,
            icon_uri: None,
            to_be_rendered: None,
            visible: None,
            properties: BTreeMap::new(),
            variables: Vec::new(),
            binding_contexts: None,
            active_child: None,
            bounds: None,
            horizontal: None,
            side: None,
            closeable: None,
            dirty: false,
            enabled: None,
            command: None,
            name: None,
            command_uri: None,
            args: Vec::new(),
            binding_context_id: None,
            sequence: None,
            parameters: BTreeMap::new(),
            menus: Vec::new(),
            toolbar: None,
            trim: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ElementDescriptor>) -> Self {
        self.children = children;
        self
    }
}

fn unsupported(kind: ElementKind, attribute: &'static str) -> LoadError {
    LoadError::UnsupportedAttribute { kind, attribute }
}

struct Loader<'a> {
    workbench: &'a mut Workbench,
    by_id: FxHashMap<String, ElementId>,
    built: Vec<(ElementId, &'a ElementDescriptor)>,
    created_bindings: Vec<ElementId>,
    pending_bindings: Vec<(ElementId, &'a ElementDescriptor)>,
}

impl<'a> Loader<'a> {
    fn resolve(&self, from: &ElementDescriptor, target: &str) -> Result<ElementId, LoadError> {
        self.by_id
            .get(target)
            .copied()
            .ok_or_else(|| LoadError::UnresolvedReference {
                from: from.id.clone(),
                target: target.to_string(),
            })
    }

    fn build(&mut self, desc: &'a ElementDescriptor) -> Result<ElementId, LoadError> {
        let id = self.workbench.create_default(desc.kind, &desc.id)?;
        self.built.push((id, desc));
        if !desc.id.is_empty() {
            self.by_id.entry(desc.id.clone()).or_insert(id);
        }
        self.apply_attributes(id, desc)?;

        for child in &desc.children {
            if child.kind == ElementKind::KeyBinding {
                if desc.kind != ElementKind::BindingTable {
                    return Err(ModelError::IncompatibleChild {
                        container: desc.kind,
                        child: child.kind,
                    }
                    .into());
                }
                self.pending_bindings.push((id, child));
                continue;
            }
            let child_id = self.build(child)?;
            self.workbench.append(id, child_id)?;
        }
        Ok(id)
    }

    fn apply_attributes(&mut self, id: ElementId, desc: &ElementDescriptor) -> Result<(), LoadError> {
        let kind = desc.kind;
        let wb = &mut *self.workbench;

        if desc.contribution_uri.is_some() && !kind.is_contribution() {
            return Err(unsupported(kind, "contribution_uri"));
        }
        {
            let element = wb.get_mut(id)?;
            for tag in &desc.tags {
                element.add_tag(tag);
            }
            element
                .persisted_state_mut()
                .extend(desc.persisted_state.clone());
            element.set_contributor_uri(desc.contributor_uri.clone());
            if let Some(contribution) = element.contribution_mut() {
                contribution.contribution_uri = desc.contribution_uri.clone();
            }

            if desc.label.is_some() || desc.tooltip.is_some() || desc.icon_uri.is_some() {
                let label = element.ui_label_mut().ok_or(unsupported(kind, "label"))?;
                label.label = desc.label.clone();
                label.tooltip = desc.tooltip.clone();
                label.icon_uri = desc.icon_uri.clone();
            }
            if let Some(bounds) = desc.bounds {
                element.window_mut().ok_or(unsupported(kind, "bounds"))?.bounds = bounds;
            }
            if let Some(horizontal) = desc.horizontal {
                if !element.set_sash_horizontal(horizontal) {
                    return Err(unsupported(kind, "horizontal"));
                }
            }
            if desc.side.is_some() && !element.set_trim_side(desc.side) {
                return Err(unsupported(kind, "side"));
            }
            if desc.closeable.is_some() || desc.dirty {
                let part = element.part_mut().ok_or(unsupported(kind, "closeable"))?;
                part.closeable = desc.closeable.unwrap_or(true);
                part.dirty = desc.dirty;
            }
            if let Some(enabled) = desc.enabled {
                element.item_mut().ok_or(unsupported(kind, "enabled"))?.enabled = enabled;
            }
            if desc.name.is_some() || desc.command_uri.is_some() || !desc.args.is_empty() {
                let command = element.command_mut().ok_or(unsupported(kind, "name"))?;
                command.name = desc.name.clone().unwrap_or_default();
                command.command_uri = desc.command_uri.clone();
                command.args = desc.args.iter().map(|a| a.as_str().into()).collect();
            }
            if let Some(context_id) = &desc.binding_context_id {
                element
                    .binding_table_mut()
                    .ok_or(unsupported(kind, "binding_context_id"))?
                    .binding_context_id = context_id.as_str().into();
            }
        }

        if desc.to_be_rendered.is_some() || desc.visible.is_some() {
            if !kind.is_ui_element() {
                return Err(unsupported(kind, "to_be_rendered"));
            }
            wb.set_to_be_rendered(id, desc.to_be_rendered.unwrap_or(true))?;
            wb.set_visible(id, desc.visible.unwrap_or(true))?;
        }
        for name in &desc.variables {
            wb.declare_variable(id, name)?;
        }
        for (name, value) in &desc.properties {
            wb.set_property(id, name, value.clone())?;
        }
        if let Some(contexts) = &desc.binding_contexts {
            wb.set_binding_contexts(id, contexts)?;
        }

        if kind != ElementKind::KeyBinding
            && (desc.sequence.is_some() || !desc.parameters.is_empty())
        {
            return Err(unsupported(kind, "sequence"));
        }
        if desc.command.is_some()
            && !matches!(
                kind,
                ElementKind::Handler
                    | ElementKind::MenuItem
                    | ElementKind::ToolItem
                    | ElementKind::KeyBinding
            )
        {
            return Err(unsupported(kind, "command"));
        }
        if (!desc.menus.is_empty() || desc.toolbar.is_some()) && !kind.is_part_like() {
            return Err(unsupported(kind, "menus"));
        }
        if !desc.trim.is_empty() && kind != ElementKind::Window {
            return Err(unsupported(kind, "trim"));
        }
        Ok(())
    }

    fn resolve_references(&mut self) -> Result<(), LoadError> {
        for &(id, desc) in &self.built {
            if let Some(target) = &desc.command {
                let command = self.resolve(desc, target)?;
                match desc.kind {
                    ElementKind::Handler => self.workbench.set_handler_command(id, Some(command))?,
                    _ => self.workbench.set_item_command(id, Some(command))?,
                }
            }
            for menu in &desc.menus {
                let menu = self.resolve(desc, menu)?;
                self.workbench.add_part_menu(id, menu)?;
            }
            if let Some(toolbar) = &desc.toolbar {
                let toolbar = self.resolve(desc, toolbar)?;
                self.workbench.set_part_toolbar(id, Some(toolbar))?;
            }
            for (&side, trim) in &desc.trim {
                let trim = self.resolve(desc, trim)?;
                self.workbench.set_trim(id, side, Some(trim))?;
            }
            if let Some(active) = &desc.active_child {
                let active = self.resolve(desc, active)?;
                self.workbench.set_active_child(id, Some(active))?;
            }
        }

        let pending = std::mem::take(&mut self.pending_bindings);
        for (table, desc) in pending {
            let binding = self.build_key_binding(desc)?;
            self.workbench.append(table, binding)?;
        }
        Ok(())
    }

    fn build_key_binding(&mut self, desc: &'a ElementDescriptor) -> Result<ElementId, LoadError> {
        let kind = ElementKind::KeyBinding;
        let sequence = desc.sequence.clone().ok_or(LoadError::MissingAttribute {
            kind,
            attribute: "sequence",
        })?;
        let target = desc.command.as_deref().ok_or(LoadError::MissingAttribute {
            kind,
            attribute: "command",
        })?;
        let command = self.resolve(desc, target)?;
        let parameterized = self.workbench.parameterize(command, &desc.parameters)?;
        let id = self
            .workbench
            .create_key_binding(&desc.id, sequence, parameterized)?;
        self.created_bindings.push(id);
        if !desc.id.is_empty() {
            self.by_id.entry(desc.id.clone()).or_insert(id);
        }
        self.apply_attributes(id, desc)?;
        if !desc.children.is_empty() {
            return Err(unsupported(kind, "children"));
        }
        Ok(id)
    }
}

/// Builds the described tree inside `workbench` and returns its root. On failure
/// every element created for it is disposed again.
pub fn load_into(workbench: &mut Workbench, desc: &ElementDescriptor) -> Result<ElementId, LoadError> {
    let mut loader = Loader {
        workbench,
        by_id: FxHashMap::default(),
        built: Vec::new(),
        created_bindings: Vec::new(),
        pending_bindings: Vec::new(),
    };

    let result = loader
        .build(desc)
        .and_then(|root| loader.resolve_references().map(|()| root));
    let root = match result {
        Ok(root) => root,
        Err(err) => {
            let created: Vec<ElementId> = loader
                .built
                .iter()
                .map(|&(id, _)| id)
                .chain(loader.created_bindings.iter().copied())
                .collect();
            discard(loader.workbench, &created);
            tracing::warn!(error = %err, "descriptor rejected");
            return Err(err);
        }
    };

    let violations = loader.workbench.check_invariants();
    if !violations.is_empty() {
        discard(loader.workbench, &[root]);
        return Err(LoadError::Invariant(violations));
    }

    tracing::info!(root = ?root, elements = loader.built.len(), "descriptor loaded");
    Ok(root)
}

/// Disposes whatever a failed load left behind. Elements still owned by another
/// created element go with their owner.
fn discard(workbench: &mut Workbench, created: &[ElementId]) {
    for &id in created {
        if workbench.parent(id).is_ok_and(|p| p.is_none()) {
            if let Err(err) = workbench.dispose(id) {
                tracing::warn!(element = ?id, error = %err, "failed to discard element");
            }
        }
    }
}

pub fn from_json_str(workbench: &mut Workbench, json: &str) -> Result<ElementId, LoadError> {
    let desc: ElementDescriptor = serde_json::from_str(json)?;
    load_into(workbench, &desc)
}

pub fn load_from_path(workbench: &mut Workbench, path: &Path) -> Result<ElementId, LoadError> {
    let data = std::fs::read_to_string(path)?;
    from_json_str(workbench, &data)
}

/// Describes `root` and its owned subtree. Every referenced element must carry an
/// element id that no other element of the subtree shares, and must itself be
/// part of the subtree.
pub fn save(workbench: &Workbench, root: ElementId) -> Result<ElementDescriptor, LoadError> {
    let mut ids: FxHashMap<&str, (ElementId, usize)> = FxHashMap::default();
    for id in std::iter::once(root).chain(workbench.descendants(root)?) {
        let Some(element) = workbench.element(id) else {
            continue;
        };
        if element.element_id().is_empty() {
            continue;
        }
        ids.entry(element.element_id())
            .and_modify(|(_, count)| *count += 1)
            .or_insert((id, 1));
    }
    Saver { workbench, ids }.describe(root)
}

struct Saver<'w> {
    workbench: &'w Workbench,
    ids: FxHashMap<&'w str, (ElementId, usize)>,
}

impl Saver<'_> {
    fn describe(&self, root: ElementId) -> Result<ElementDescriptor, LoadError> {
        let workbench = self.workbench;
        let reference = |target: ElementId| self.reference(root, target);
        let element = workbench.get(root)?;
        let kind = element.kind();
        let mut desc = ElementDescriptor::new(kind, element.element_id());

        desc.tags = element.tags().iter().map(ToString::to_string).collect();
        desc.persisted_state = element.persisted_state().clone();
        desc.contributor_uri = element.contributor_uri().map(str::to_string);
        desc.contribution_uri = element
            .contribution()
            .and_then(|c| c.contribution_uri.clone());

        if let Some(label) = element.data().ui_label() {
            desc.label = label.label.clone();
            desc.tooltip = label.tooltip.clone();
            desc.icon_uri = label.icon_uri.clone();
        }
        if kind.is_ui_element() {
            let render = element.render();
            desc.to_be_rendered = (!render.to_be_rendered).then_some(false);
            desc.visible = (!render.visible).then_some(false);
        }
        if let Some(context) = element.context() {
            desc.variables = context.variables().iter().map(ToString::to_string).collect();
            desc.properties = context
                .properties()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
        }
        if kind.declares_binding_contexts() {
            let defaults = workbench.defaults();
            let default_contexts: &[_] = match kind {
                ElementKind::Application => &defaults.application,
                ElementKind::Window => &defaults.window,
                _ => &[],
            };
            if element.binding_contexts() != default_contexts {
                desc.binding_contexts = Some(
                    element
                        .binding_contexts()
                        .iter()
                        .map(ToString::to_string)
                        .collect(),
                );
            }
        }
        if let Some(active) = element.active_child() {
            desc.active_child = Some(reference(active)?);
        }

        match element.data() {
            ElementData::Window(window) => {
                if window.bounds != Bounds::default() {
                    desc.bounds = Some(window.bounds);
                }
                for side in Side::ALL {
                    if let Some(trim) = workbench.trim(root, side)? {
                        desc.trim.insert(side, reference(trim)?);
                    }
                }
            }
            ElementData::PartSashContainer { horizontal } => desc.horizontal = Some(*horizontal),
            ElementData::TrimContainer { side } => desc.side = *side,
            ElementData::Part(part) | ElementData::Editor(part) => {
                desc.closeable = (!part.closeable).then_some(false);
                desc.dirty = part.dirty;
                for menu in workbench.part_menus(root)? {
                    desc.menus.push(reference(menu)?);
                }
                if let Some(toolbar) = workbench.part_toolbar(root)? {
                    desc.toolbar = Some(reference(toolbar)?);
                }
            }
            ElementData::MenuItem(item) | ElementData::ToolItem(item) => {
                desc.enabled = (!item.enabled).then_some(false);
                if let Some(command) = workbench.item_command(root)? {
                    desc.command = Some(reference(command)?);
                }
            }
            ElementData::Command(command) => {
                desc.name = Some(command.name.clone());
                desc.command_uri = command.command_uri.clone();
                desc.args = command.args.iter().map(ToString::to_string).collect();
            }
            ElementData::Handler(_) => {
                if let Some(command) = workbench.handler_command(root)? {
                    desc.command = Some(reference(command)?);
                }
            }
            ElementData::BindingTable(table) => {
                desc.binding_context_id = Some(table.binding_context_id.to_string());
            }
            ElementData::KeyBinding(binding) => {
                desc.sequence = Some(binding.sequence().clone());
                desc.command = Some(reference(binding.command().command())?);
                desc.parameters = binding
                    .command()
                    .parameters()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
            }
            _ => {}
        }

        for child in element.owned.iter() {
            let child_desc = self.describe(child)?;
            desc.children.push(child_desc);
        }
        Ok(desc)
    }

    /// The id `target` is written under. Loading resolves it to the first element
    /// with that id, so it has to be unique within the saved subtree.
    fn reference(&self, from: ElementId, target: ElementId) -> Result<String, LoadError> {
        let element = self.workbench.get(target)?;
        let id = element.element_id();
        if id.is_empty() {
            return Err(LoadError::AnonymousReference {
                kind: element.kind(),
            });
        }
        match self.ids.get(id) {
            Some(&(only, 1)) if only == target => Ok(id.to_string()),
            _ => {
                let from = self
                    .workbench
                    .element(from)
                    .map(|e| e.element_id().to_string())
                    .unwrap_or_default();
                Err(LoadError::AmbiguousReference {
                    from,
                    target: id.to_string(),
                })
            }
        }
    }
}

pub fn to_json_string(workbench: &Workbench, root: ElementId) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(&save(workbench, root)?)?)
}

pub fn save_to_path(workbench: &Workbench, root: ElementId, path: &Path) -> Result<(), LoadError> {
    let content = to_json_string(workbench, root)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/descriptor.rs"]
mod tests;
