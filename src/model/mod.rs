//! 应用模型核心
//!
//! - kind: 元素种类与能力表
//! - element: 共享属性与各种类数据
//! - tree: 包含树（attach / detach / active child）
//! - context: 作用域上下文链
//! - refs: 非拥有引用的校验与读取
//! - inspect: outline 与不变量检查

pub mod context;
pub mod element;
pub mod error;
pub mod inspect;
pub mod kind;
pub mod opaque;
mod refs;
pub mod tree;

use slotmap::new_key_type;

new_key_type! { pub struct ElementId; }

pub use context::Context;
pub use element::{
    BindingTableData, Bounds, CommandData, Contribution, Element, ElementData, HandlerData,
    ItemData, KeyBindingData, PartData, RenderSlots, Side, TrimStructure, UiLabel, WindowData,
};
pub use error::{ModelError, Result};
pub use inspect::{InvariantViolation, OutlineRow};
pub use kind::{Capability, ElementKind, Slot};
pub use opaque::Opaque;
pub use tree::{Ancestors, DefaultBindingContexts, Descendants, Workbench};
