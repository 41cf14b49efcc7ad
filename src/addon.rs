//! 插件：向 Application 贡献命令、处理器与快捷键
//!
//! 插件贡献的元素和其他元素一样挂在 Application 下，
//! 安装后额外记录一个 Addon 元素。

use crate::model::{ElementData, ElementId, ElementKind, Opaque, Result, Workbench};

pub trait Addon {
    fn id(&self) -> &str;

    fn contribution_uri(&self) -> Option<&str> {
        None
    }

    /// Adds the addon's contributions below `application`.
    fn install(&mut self, workbench: &mut Workbench, application: ElementId) -> Result<()>;
}

/// Runs `addon.install` and records an Addon element for it. Nothing is recorded
/// when the install fails.
pub fn install_addon(
    workbench: &mut Workbench,
    application: ElementId,
    addon: &mut dyn Addon,
) -> Result<ElementId> {
    workbench.expect_kind(application, ElementKind::Application)?;
    addon.install(workbench, application)?;

    let record = workbench.create(ElementData::Addon, addon.id());
    if let Some(contribution) = workbench.get_mut(record)?.contribution_mut() {
        contribution.contribution_uri = addon.contribution_uri().map(str::to_string);
    }
    if let Err(err) = workbench.append(application, record) {
        workbench.dispose(record)?;
        return Err(err);
    }

    tracing::info!(addon = addon.id(), "addon installed");
    Ok(record)
}

/// Sets the live object of an Addon element.
pub fn set_addon_object(
    workbench: &mut Workbench,
    record: ElementId,
    object: Option<Opaque>,
) -> Result<Option<Opaque>> {
    workbench.expect_kind(record, ElementKind::Addon)?;
    let contribution = workbench.get_mut(record)?.contribution_mut();
    Ok(match contribution {
        Some(c) => std::mem::replace(&mut c.object, object),
        None => None,
    })
}

pub fn addons(workbench: &Workbench, application: ElementId) -> Result<&[ElementId]> {
    workbench.owned(application, crate::model::Slot::Addons)
}
