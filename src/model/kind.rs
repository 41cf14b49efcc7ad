//! 元素种类与能力表
//!
//! 所有节点种类是一个封闭集合，每种类型只声明它需要的能力，
//! 容器可以拥有哪些子元素由 `Slot::for_child` 决定。

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Application,
    Window,
    PartSashContainer,
    PartStack,
    Part,
    Editor,
    Perspective,
    TrimContainer,
    Menu,
    MenuItem,
    ToolBar,
    ToolItem,
    Command,
    Handler,
    BindingTable,
    KeyBinding,
    Addon,
}

impl ElementKind {
    pub const ALL: [ElementKind; 17] = [
        ElementKind::Application,
        ElementKind::Window,
        ElementKind::PartSashContainer,
        ElementKind::PartStack,
        ElementKind::Part,
        ElementKind::Editor,
        ElementKind::Perspective,
        ElementKind::TrimContainer,
        ElementKind::Menu,
        ElementKind::MenuItem,
        ElementKind::ToolBar,
        ElementKind::ToolItem,
        ElementKind::Command,
        ElementKind::Handler,
        ElementKind::BindingTable,
        ElementKind::KeyBinding,
        ElementKind::Addon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Application => "Application",
            ElementKind::Window => "Window",
            ElementKind::PartSashContainer => "PartSashContainer",
            ElementKind::PartStack => "PartStack",
            ElementKind::Part => "Part",
            ElementKind::Editor => "Editor",
            ElementKind::Perspective => "Perspective",
            ElementKind::TrimContainer => "TrimContainer",
            ElementKind::Menu => "Menu",
            ElementKind::MenuItem => "MenuItem",
            ElementKind::ToolBar => "ToolBar",
            ElementKind::ToolItem => "ToolItem",
            ElementKind::Command => "Command",
            ElementKind::Handler => "Handler",
            ElementKind::BindingTable => "BindingTable",
            ElementKind::KeyBinding => "KeyBinding",
            ElementKind::Addon => "Addon",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(v))
    }

    /// Carries the render slots and a `parent` back-reference.
    pub fn is_ui_element(self) -> bool {
        !matches!(
            self,
            ElementKind::Command
                | ElementKind::Handler
                | ElementKind::BindingTable
                | ElementKind::KeyBinding
                | ElementKind::Addon
        )
    }

    /// Owns ordered UI children and tracks an active child.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ElementKind::Application
                | ElementKind::Window
                | ElementKind::Perspective
                | ElementKind::PartSashContainer
                | ElementKind::PartStack
                | ElementKind::TrimContainer
                | ElementKind::Menu
                | ElementKind::ToolBar
        )
    }

    pub fn owns_context(self) -> bool {
        matches!(
            self,
            ElementKind::Application
                | ElementKind::Window
                | ElementKind::Perspective
                | ElementKind::Part
                | ElementKind::Editor
        )
    }

    pub fn is_contribution(self) -> bool {
        matches!(
            self,
            ElementKind::Part | ElementKind::Editor | ElementKind::Handler | ElementKind::Addon
        )
    }

    pub fn is_handler_container(self) -> bool {
        matches!(
            self,
            ElementKind::Application | ElementKind::Window | ElementKind::Part | ElementKind::Editor
        )
    }

    /// Owns binding tables.
    pub fn is_binding_container(self) -> bool {
        matches!(self, ElementKind::Application | ElementKind::Window)
    }

    /// Declares binding-context ids that join the active binding-context stack.
    pub fn declares_binding_contexts(self) -> bool {
        matches!(
            self,
            ElementKind::Application | ElementKind::Window | ElementKind::Part | ElementKind::Editor
        )
    }

    pub fn is_part_like(self) -> bool {
        matches!(self, ElementKind::Part | ElementKind::Editor)
    }

    pub fn has(self, capability: Capability) -> bool {
        match capability {
            Capability::UiElement => self.is_ui_element(),
            Capability::Container => self.is_container(),
            Capability::Context => self.owns_context(),
            Capability::Contribution => self.is_contribution(),
            Capability::HandlerContainer => self.is_handler_container(),
            Capability::BindingContainer => self.is_binding_container(),
            Capability::BindingContexts => self.declares_binding_contexts(),
        }
    }

    /// Kinds this container accepts in its `children` slot.
    pub fn accepts_child(self, child: ElementKind) -> bool {
        use ElementKind as K;
        match self {
            K::Application => child == K::Window,
            K::Window => matches!(
                child,
                K::PartSashContainer
                    | K::PartStack
                    | K::Part
                    | K::Editor
                    | K::Perspective
                    | K::TrimContainer
            ),
            K::Perspective | K::PartSashContainer => matches!(
                child,
                K::PartSashContainer | K::PartStack | K::Part | K::Editor
            ),
            K::PartStack => child.is_part_like(),
            K::TrimContainer => child == K::ToolBar,
            K::Menu => matches!(child, K::Menu | K::MenuItem),
            K::ToolBar => child == K::ToolItem,
            _ => false,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    UiElement,
    Container,
    Context,
    Contribution,
    HandlerContainer,
    BindingContainer,
    BindingContexts,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::UiElement => "ui-element",
            Capability::Container => "container",
            Capability::Context => "context",
            Capability::Contribution => "contribution",
            Capability::HandlerContainer => "handler-container",
            Capability::BindingContainer => "binding-container",
            Capability::BindingContexts => "binding-contexts",
        };
        f.write_str(name)
    }
}

/// An owning collection on a container. Every owned element sits in exactly one slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Children,
    MainMenu,
    Handlers,
    Commands,
    BindingTables,
    Bindings,
    Addons,
}

impl Slot {
    /// Pre-order traversal visits slots in this order.
    pub const ALL: [Slot; 7] = [
        Slot::Children,
        Slot::MainMenu,
        Slot::Handlers,
        Slot::Commands,
        Slot::BindingTables,
        Slot::Bindings,
        Slot::Addons,
    ];

    pub fn for_child(container: ElementKind, child: ElementKind) -> Option<Slot> {
        use ElementKind as K;
        match (container, child) {
            (c, K::Handler) if c.is_handler_container() => Some(Slot::Handlers),
            (K::Application, K::Command) => Some(Slot::Commands),
            (c, K::BindingTable) if c.is_binding_container() => Some(Slot::BindingTables),
            (K::BindingTable, K::KeyBinding) => Some(Slot::Bindings),
            (K::Application, K::Addon) => Some(Slot::Addons),
            (K::Window, K::Menu) => Some(Slot::MainMenu),
            (c, child) if c.accepts_child(child) => Some(Slot::Children),
            _ => None,
        }
    }

    pub fn capacity(self) -> Option<usize> {
        match self {
            Slot::MainMenu => Some(1),
            _ => None,
        }
    }

    /// Slots whose members are rendered.
    pub fn is_ui(self) -> bool {
        matches!(self, Slot::Children | Slot::MainMenu)
    }
}
