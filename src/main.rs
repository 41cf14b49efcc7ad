//wbmodel/src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;

use wbmodel::bindings::key::KeySequence;
use wbmodel::model::{ElementId, ElementKind, ModelError, Workbench};
use wbmodel::{descriptor, settings};

mod logging;

const USAGE: &str = "usage: wbmodel <descriptor.json> [--settings <path>] [--key <sequence>]... \
[--command <id-or-name>]... [--save <path>]";

#[derive(Debug, Default)]
struct Args {
    descriptor: Option<PathBuf>,
    settings: Option<PathBuf>,
    keys: Vec<String>,
    commands: Vec<String>,
    save: Option<PathBuf>,
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    let mut raw = raw;
    while let Some(arg) = raw.next() {
        let mut value = |flag: &str| {
            raw.next()
                .ok_or_else(|| format!("{flag} expects a value"))
        };
        match arg.as_str() {
            "--settings" => args.settings = Some(PathBuf::from(value("--settings")?)),
            "--key" => args.keys.push(value("--key")?),
            "--command" => args.commands.push(value("--command")?),
            "--save" => args.save = Some(PathBuf::from(value("--save")?)),
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            _ if args.descriptor.is_none() => args.descriptor = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument {arg}")),
        }
    }
    Ok(args)
}

fn load_settings(path: Option<&PathBuf>) -> settings::WorkbenchSettings {
    let path = match path {
        Some(path) => path.clone(),
        None => match settings::default_settings_path() {
            Some(path) => {
                if let Err(e) = settings::ensure_settings_file(&path) {
                    tracing::warn!(error = %e, "cannot create settings file");
                }
                path
            }
            None => return settings::WorkbenchSettings::default(),
        },
    };
    settings::load_settings(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "settings ignored");
        settings::WorkbenchSettings::default()
    })
}

fn describe(wb: &Workbench, id: ElementId) -> String {
    match wb.element(id) {
        Some(e) if !e.element_id().is_empty() => format!("{} '{}'", e.kind(), e.element_id()),
        Some(e) => format!("{} {id:?}", e.kind()),
        None => format!("{id:?} (disposed)"),
    }
}

fn print_outline(wb: &Workbench, root: ElementId) -> Result<(), ModelError> {
    for row in wb.outline(root)? {
        let marker = if row.active { '*' } else { ' ' };
        let indent = "  ".repeat(usize::from(row.depth));
        match &row.label {
            Some(label) => println!("{marker}{indent}{} {} \"{label}\"", row.kind, row.element_id),
            None => println!("{marker}{indent}{} {}", row.kind, row.element_id),
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<(), String> {
    let Some(descriptor_path) = args.descriptor else {
        return Err(USAGE.to_string());
    };

    let settings = load_settings(args.settings.as_ref());
    let mut wb = Workbench::with_defaults(settings.default_contexts());
    let root = descriptor::load_from_path(&mut wb, &descriptor_path).map_err(|e| e.to_string())?;

    let application = (wb.kind(root) == Ok(ElementKind::Application)).then_some(root);
    if let Some(app) = application {
        let report = settings::apply_keybinding_rules(&mut wb, app, &settings.keybindings)
            .map_err(|e| e.to_string())?;
        for skipped in &report.skipped {
            eprintln!("keybinding rule #{} skipped: {}", skipped.index, skipped.reason);
        }
    }

    print_outline(&wb, root).map_err(|e| e.to_string())?;

    let leaf = wb.active_leaf(root).map_err(|e| e.to_string())?;
    let path: Vec<String> = wb
        .active_path(root)
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|id| describe(&wb, id))
        .collect();
    println!("active: {}", path.join(" > "));

    for key in &args.keys {
        let sequence: KeySequence = key.parse().map_err(|e| format!("{key}: {e}"))?;
        match wb.resolve_key_binding(&sequence, leaf) {
            Ok(command) => {
                let params: Vec<String> = command
                    .parameters()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                println!("{sequence} -> {} {}", describe(&wb, command.command()), params.join(" "));
            }
            Err(ModelError::NotBound(_)) if wb.is_partial_match(&sequence, leaf).unwrap_or(false) => {
                println!("{sequence} -> (partial)");
            }
            Err(e) => println!("{sequence} -> {e}"),
        }
    }

    for name in &args.commands {
        let Some(app) = application else {
            return Err("--command needs an Application root".to_string());
        };
        let Some(command) = wb.find_command(app, name) else {
            println!("{name} -> unknown command");
            continue;
        };
        match wb.resolve_handler(command, leaf) {
            Ok(handler) => {
                let owner = wb.parent(handler).ok().flatten();
                let owner = owner.map(|o| describe(&wb, o)).unwrap_or_default();
                println!("{name} -> {} on {owner}", describe(&wb, handler));
            }
            Err(e) => println!("{name} -> {e}"),
        }
    }

    if let Some(path) = &args.save {
        descriptor::save_to_path(&wb, root, path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let logging = logging::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "wbmodel failed");
            eprintln!("{message}");
            if let Some(guard) = &logging {
                eprintln!("logs: {}", guard.log_dir().display());
            }
            ExitCode::FAILURE
        }
    }
}
