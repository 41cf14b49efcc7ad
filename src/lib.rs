//! wbmodel - 工作台应用模型库
//!
//! 模块结构：
//! - model: 包含树、上下文链、引用与检查（Workbench, Element, Context）
//! - bindings: 命令、处理器、快捷键与解析（KeySequence, resolve_handler）
//! - render: 渲染边界（Renderer, realize_subtree）
//! - addon: 插件贡献（Addon, install_addon）
//! - descriptor: JSON 描述文件加载 / 保存
//! - settings: 用户设置与快捷键规则

pub mod addon;
pub mod bindings;
pub mod descriptor;
pub mod model;
pub mod render;
pub mod settings;

pub use model::{ElementId, ElementKind, ModelError, Result, Workbench};
