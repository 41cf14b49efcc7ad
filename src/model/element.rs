//! 模型元素：共享属性 + 各种类的专有数据

use super::context::Context;
use super::kind::{ElementKind, Slot};
use super::opaque::Opaque;
use super::ElementId;
use crate::bindings::key::KeySequence;
use crate::bindings::ParameterizedCommand;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiLabel {
    pub label: Option<String>,
    pub tooltip: Option<String>,
    pub icon_uri: Option<String>,
}

/// Non-owning references from a window to the trim containers among its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimStructure {
    pub(crate) top: Option<ElementId>,
    pub(crate) bottom: Option<ElementId>,
    pub(crate) left: Option<ElementId>,
    pub(crate) right: Option<ElementId>,
}

impl TrimStructure {
    pub fn side(&self, side: Side) -> Option<ElementId> {
        match side {
            Side::Top => self.top,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn side_mut(&mut self, side: Side) -> &mut Option<ElementId> {
        match side {
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowData {
    pub label: UiLabel,
    pub bounds: Bounds,
    pub(crate) trim: TrimStructure,
}

impl WindowData {
    pub fn trim(&self) -> &TrimStructure {
        &self.trim
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartData {
    pub label: UiLabel,
    pub closeable: bool,
    pub dirty: bool,
    pub(crate) menus: Vec<ElementId>,
    pub(crate) toolbar: Option<ElementId>,
}

impl Default for PartData {
    fn default() -> Self {
        Self {
            label: UiLabel::default(),
            closeable: true,
            dirty: false,
            menus: Vec::new(),
            toolbar: None,
        }
    }
}

impl PartData {
    pub fn menus(&self) -> &[ElementId] {
        &self.menus
    }

    pub fn toolbar(&self) -> Option<ElementId> {
        self.toolbar
    }
}

/// Menu and tool items optionally bound to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemData {
    pub label: UiLabel,
    pub enabled: bool,
    pub(crate) command: Option<ElementId>,
}

impl Default for ItemData {
    fn default() -> Self {
        Self {
            label: UiLabel::default(),
            enabled: true,
            command: None,
        }
    }
}

impl ItemData {
    pub fn command(&self) -> Option<ElementId> {
        self.command
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandData {
    pub name: String,
    pub command_uri: Option<String>,
    /// Ordered parameter ids accepted by the command.
    pub args: Vec<CompactString>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerData {
    pub(crate) command: Option<ElementId>,
}

impl HandlerData {
    pub fn command(&self) -> Option<ElementId> {
        self.command
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTableData {
    pub binding_context_id: CompactString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindingData {
    pub(crate) sequence: KeySequence,
    pub(crate) command: ParameterizedCommand,
}

impl KeyBindingData {
    pub fn sequence(&self) -> &KeySequence {
        &self.sequence
    }

    pub fn command(&self) -> &ParameterizedCommand {
        &self.command
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementData {
    Application,
    Window(WindowData),
    PartSashContainer { horizontal: bool },
    PartStack,
    Part(PartData),
    Editor(PartData),
    Perspective(UiLabel),
    TrimContainer { side: Option<Side> },
    Menu(UiLabel),
    MenuItem(ItemData),
    ToolBar,
    ToolItem(ItemData),
    Command(CommandData),
    Handler(HandlerData),
    BindingTable(BindingTableData),
    KeyBinding(KeyBindingData),
    Addon,
}

impl ElementData {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementData::Application => ElementKind::Application,
            ElementData::Window(_) => ElementKind::Window,
            ElementData::PartSashContainer { .. } => ElementKind::PartSashContainer,
            ElementData::PartStack => ElementKind::PartStack,
            ElementData::Part(_) => ElementKind::Part,
            ElementData::Editor(_) => ElementKind::Editor,
            ElementData::Perspective(_) => ElementKind::Perspective,
            ElementData::TrimContainer { .. } => ElementKind::TrimContainer,
            ElementData::Menu(_) => ElementKind::Menu,
            ElementData::MenuItem(_) => ElementKind::MenuItem,
            ElementData::ToolBar => ElementKind::ToolBar,
            ElementData::ToolItem(_) => ElementKind::ToolItem,
            ElementData::Command(_) => ElementKind::Command,
            ElementData::Handler(_) => ElementKind::Handler,
            ElementData::BindingTable(_) => ElementKind::BindingTable,
            ElementData::KeyBinding(_) => ElementKind::KeyBinding,
            ElementData::Addon => ElementKind::Addon,
        }
    }

    /// Default attributes for `kind`. `None` for `KeyBinding`, which cannot exist
    /// without a sequence and a command.
    pub fn for_kind(kind: ElementKind) -> Option<Self> {
        let data = match kind {
            ElementKind::Application => ElementData::Application,
            ElementKind::Window => ElementData::Window(WindowData::default()),
            ElementKind::PartSashContainer => ElementData::PartSashContainer { horizontal: true },
            ElementKind::PartStack => ElementData::PartStack,
            ElementKind::Part => ElementData::Part(PartData::default()),
            ElementKind::Editor => ElementData::Editor(PartData::default()),
            ElementKind::Perspective => ElementData::Perspective(UiLabel::default()),
            ElementKind::TrimContainer => ElementData::TrimContainer { side: None },
            ElementKind::Menu => ElementData::Menu(UiLabel::default()),
            ElementKind::MenuItem => ElementData::MenuItem(ItemData::default()),
            ElementKind::ToolBar => ElementData::ToolBar,
            ElementKind::ToolItem => ElementData::ToolItem(ItemData::default()),
            ElementKind::Command => ElementData::Command(CommandData::default()),
            ElementKind::Handler => ElementData::Handler(HandlerData::default()),
            ElementKind::BindingTable => ElementData::BindingTable(BindingTableData::default()),
            ElementKind::KeyBinding => return None,
            ElementKind::Addon => ElementData::Addon,
        };
        Some(data)
    }

    pub fn ui_label(&self) -> Option<&UiLabel> {
        match self {
            ElementData::Window(w) => Some(&w.label),
            ElementData::Part(p) | ElementData::Editor(p) => Some(&p.label),
            ElementData::Perspective(l) | ElementData::Menu(l) => Some(l),
            ElementData::MenuItem(i) | ElementData::ToolItem(i) => Some(&i.label),
            _ => None,
        }
    }

    pub fn ui_label_mut(&mut self) -> Option<&mut UiLabel> {
        match self {
            ElementData::Window(w) => Some(&mut w.label),
            ElementData::Part(p) | ElementData::Editor(p) => Some(&mut p.label),
            ElementData::Perspective(l) | ElementData::Menu(l) => Some(l),
            ElementData::MenuItem(i) | ElementData::ToolItem(i) => Some(&mut i.label),
            _ => None,
        }
    }

    pub fn as_part(&self) -> Option<&PartData> {
        match self {
            ElementData::Part(p) | ElementData::Editor(p) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn as_part_mut(&mut self) -> Option<&mut PartData> {
        match self {
            ElementData::Part(p) | ElementData::Editor(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&ItemData> {
        match self {
            ElementData::MenuItem(i) | ElementData::ToolItem(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandData> {
        match self {
            ElementData::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_binding_table(&self) -> Option<&BindingTableData> {
        match self {
            ElementData::BindingTable(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_key_binding(&self) -> Option<&KeyBindingData> {
        match self {
            ElementData::KeyBinding(b) => Some(b),
            _ => None,
        }
    }
}

/// The render boundary. The model stores these and never looks inside.
#[derive(Debug, Clone)]
pub struct RenderSlots {
    pub widget: Option<Opaque>,
    pub renderer: Option<Opaque>,
    pub to_be_rendered: bool,
    pub visible: bool,
}

impl Default for RenderSlots {
    fn default() -> Self {
        Self {
            widget: None,
            renderer: None,
            to_be_rendered: true,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Contribution {
    pub contribution_uri: Option<String>,
    pub object: Option<Opaque>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Owned {
    children: Vec<ElementId>,
    main_menu: Vec<ElementId>,
    handlers: Vec<ElementId>,
    commands: Vec<ElementId>,
    binding_tables: Vec<ElementId>,
    bindings: Vec<ElementId>,
    addons: Vec<ElementId>,
}

impl Owned {
    pub(crate) fn get(&self, slot: Slot) -> &Vec<ElementId> {
        match slot {
            Slot::Children => &self.children,
            Slot::MainMenu => &self.main_menu,
            Slot::Handlers => &self.handlers,
            Slot::Commands => &self.commands,
            Slot::BindingTables => &self.binding_tables,
            Slot::Bindings => &self.bindings,
            Slot::Addons => &self.addons,
        }
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> &mut Vec<ElementId> {
        match slot {
            Slot::Children => &mut self.children,
            Slot::MainMenu => &mut self.main_menu,
            Slot::Handlers => &mut self.handlers,
            Slot::Commands => &mut self.commands,
            Slot::BindingTables => &mut self.binding_tables,
            Slot::Bindings => &mut self.bindings,
            Slot::Addons => &mut self.addons,
        }
    }

    pub(crate) fn slot_of(&self, id: ElementId) -> Option<(Slot, usize)> {
        Slot::ALL.iter().find_map(|&slot| {
            self.get(slot)
                .iter()
                .position(|&c| c == id)
                .map(|index| (slot, index))
        })
    }

    /// All owned elements, slot by slot.
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = ElementId> + '_ {
        Slot::ALL
            .into_iter()
            .flat_map(move |slot| self.get(slot).iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    data: ElementData,
    element_id: CompactString,
    tags: Vec<CompactString>,
    persisted_state: BTreeMap<String, String>,
    transient_data: FxHashMap<String, Opaque>,
    contributor_uri: Option<String>,
    binding_contexts: Vec<CompactString>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) owned: Owned,
    pub(crate) active_child: Option<ElementId>,
    pub(crate) render: RenderSlots,
    pub(crate) contribution: Option<Contribution>,
    pub(crate) context: Option<Context>,
}

impl Element {
    pub(crate) fn new(data: ElementData, element_id: &str) -> Self {
        let kind = data.kind();
        Self {
            data,
            element_id: CompactString::from(element_id),
            tags: Vec::new(),
            persisted_state: BTreeMap::new(),
            transient_data: FxHashMap::default(),
            contributor_uri: None,
            binding_contexts: Vec::new(),
            parent: None,
            owned: Owned::default(),
            active_child: None,
            render: RenderSlots::default(),
            contribution: kind.is_contribution().then(Contribution::default),
            context: kind.owns_context().then(Context::default),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.data.kind()
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn set_element_id(&mut self, id: &str) {
        self.element_id = CompactString::from(id);
    }

    pub fn data(&self) -> &ElementData {
        &self.data
    }

    // The kind of an element never changes, so `data_mut` stays crate-private.
    // Reference fields inside the structs below stay behind the workbench setters.

    pub fn ui_label_mut(&mut self) -> Option<&mut UiLabel> {
        self.data.ui_label_mut()
    }

    pub fn window_mut(&mut self) -> Option<&mut WindowData> {
        match &mut self.data {
            ElementData::Window(w) => Some(w),
            _ => None,
        }
    }

    pub fn part_mut(&mut self) -> Option<&mut PartData> {
        self.data.as_part_mut()
    }

    pub fn item_mut(&mut self) -> Option<&mut ItemData> {
        match &mut self.data {
            ElementData::MenuItem(i) | ElementData::ToolItem(i) => Some(i),
            _ => None,
        }
    }

    pub fn command_mut(&mut self) -> Option<&mut CommandData> {
        match &mut self.data {
            ElementData::Command(c) => Some(c),
            _ => None,
        }
    }

    pub fn binding_table_mut(&mut self) -> Option<&mut BindingTableData> {
        match &mut self.data {
            ElementData::BindingTable(t) => Some(t),
            _ => None,
        }
    }

    pub fn set_sash_horizontal(&mut self, value: bool) -> bool {
        match &mut self.data {
            ElementData::PartSashContainer { horizontal } => {
                *horizontal = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_trim_side(&mut self, value: Option<Side>) -> bool {
        match &mut self.data {
            ElementData::TrimContainer { side } => {
                *side = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    pub fn label(&self) -> Option<&str> {
        self.data.ui_label().and_then(|l| l.label.as_deref())
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn tags(&self) -> &[CompactString] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns `false` when the tag was already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(CompactString::from(tag));
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn persisted_state(&self) -> &BTreeMap<String, String> {
        &self.persisted_state
    }

    pub fn persisted_state_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.persisted_state
    }

    pub fn transient_data(&self, key: &str) -> Option<&Opaque> {
        self.transient_data.get(key)
    }

    pub fn set_transient_data(&mut self, key: &str, value: Option<Opaque>) -> Option<Opaque> {
        match value {
            Some(value) => self.transient_data.insert(key.to_string(), value),
            None => self.transient_data.remove(key),
        }
    }

    pub fn contributor_uri(&self) -> Option<&str> {
        self.contributor_uri.as_deref()
    }

    pub fn set_contributor_uri(&mut self, uri: Option<String>) {
        self.contributor_uri = uri;
    }

    pub fn binding_contexts(&self) -> &[CompactString] {
        &self.binding_contexts
    }

    pub(crate) fn binding_contexts_mut(&mut self) -> &mut Vec<CompactString> {
        &mut self.binding_contexts
    }

    pub fn active_child(&self) -> Option<ElementId> {
        self.active_child
    }

    pub fn children(&self) -> &[ElementId] {
        self.owned.get(Slot::Children)
    }

    pub fn owned(&self, slot: Slot) -> &[ElementId] {
        self.owned.get(slot)
    }

    pub fn render(&self) -> &RenderSlots {
        &self.render
    }

    pub fn contribution(&self) -> Option<&Contribution> {
        self.contribution.as_ref()
    }

    pub fn contribution_mut(&mut self) -> Option<&mut Contribution> {
        self.contribution.as_mut()
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }
}
