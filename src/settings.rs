use crate::bindings::key::KeySequence;
use crate::bindings::{DIALOG_AND_WINDOW_CONTEXT, WINDOW_CONTEXT};
use crate::descriptor::LoadError;
use crate::model::{DefaultBindingContexts, ElementId, ElementKind, Result, Workbench};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = ".wbmodel";
const SETTINGS_FILE: &str = "settings.json";

fn default_application_contexts() -> Vec<String> {
    vec![DIALOG_AND_WINDOW_CONTEXT.to_string()]
}

fn default_window_contexts() -> Vec<String> {
    vec![WINDOW_CONTEXT.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbenchSettings {
    #[serde(default = "default_application_contexts")]
    pub application_binding_contexts: Vec<String>,
    #[serde(default = "default_window_contexts")]
    pub window_binding_contexts: Vec<String>,
    #[serde(default)]
    pub keybindings: Vec<KeybindingRule>,
}

impl Default for WorkbenchSettings {
    fn default() -> Self {
        Self {
            application_binding_contexts: default_application_contexts(),
            window_binding_contexts: default_window_contexts(),
            keybindings: Vec::new(),
        }
    }
}

impl WorkbenchSettings {
    pub fn default_contexts(&self) -> DefaultBindingContexts {
        let collect = |ids: &[String]| -> Vec<CompactString> {
            ids.iter().map(|s| CompactString::from(s.as_str())).collect()
        };
        DefaultBindingContexts {
            application: collect(&self.application_binding_contexts),
            window: collect(&self.window_binding_contexts),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeybindingRule {
    pub key: String,
    /// Command element id or command name.
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

pub fn default_settings_path() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

/// Writes default settings to `path` unless a file is already there.
pub fn ensure_settings_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&WorkbenchSettings::default())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings(path: &Path) -> std::result::Result<WorkbenchSettings, LoadError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleReport {
    pub applied: Vec<ElementId>,
    pub skipped: Vec<SkippedRule>,
}

/// Installs user rules at the front of the innermost binding table for their
/// context id on the application's active path, so they shadow the built-in
/// bindings of that context and a later rule shadows an earlier one. When no
/// table for the context is in scope, one is created on the application.
pub fn apply_keybinding_rules(
    workbench: &mut Workbench,
    application: ElementId,
    rules: &[KeybindingRule],
) -> Result<RuleReport> {
    workbench.expect_kind(application, ElementKind::Application)?;
    let leaf = workbench.active_leaf(application)?;
    let mut report = RuleReport::default();

    for (index, rule) in rules.iter().enumerate() {
        let mut skip = |reason: String| {
            tracing::warn!(index, key = %rule.key, command = %rule.command, %reason, "keybinding rule skipped");
            report.skipped.push(SkippedRule { index, reason });
        };

        let sequence: KeySequence = match rule.key.parse() {
            Ok(sequence) => sequence,
            Err(err) => {
                skip(err.to_string());
                continue;
            }
        };
        let Some(command) = workbench.find_command(application, &rule.command) else {
            skip(format!("unknown command '{}'", rule.command));
            continue;
        };
        let parameterized = match workbench.parameterize(command, &rule.parameters) {
            Ok(p) => p,
            Err(err) => {
                skip(err.to_string());
                continue;
            }
        };

        let context_id = rule.context.as_deref().unwrap_or(DIALOG_AND_WINDOW_CONTEXT);
        let table = match workbench.innermost_binding_table(leaf, context_id)? {
            Some(table) => table,
            None => workbench.add_binding_table(application, context_id)?,
        };
        let binding = workbench.add_key_binding(table, sequence, parameterized, Some(0))?;
        report.applied.push(binding);
    }

    tracing::info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "keybinding rules applied"
    );
    Ok(report)
}

fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            return Some(PathBuf::from(xdg));
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            return Some(PathBuf::from(local));
        }
        return std::env::var("APPDATA").ok().map(PathBuf::from);
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}

/// Where the binary writes its log files.
pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_cache_dir()
        .map(|dir| dir.join(SETTINGS_DIR).join("logs"))
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine log directory",
            )
        })?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
