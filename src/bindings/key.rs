//! 按键与按键序列
//!
//! 文本格式："Ctrl+Shift+P"，多段序列用空格分隔："Ctrl+K Ctrl+S"。
//! 大写字母等价于小写 + Shift。

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key sequence")]
    Empty,
    #[error("unrecognized key stroke '{0}'")]
    InvalidStroke(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyStroke {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let mut code = code;
        let mut modifiers = modifiers;
        if let KeyCode::Char(ch) = code {
            if ch.is_ascii_uppercase() {
                code = KeyCode::Char(ch.to_ascii_lowercase());
                modifiers |= KeyModifiers::SHIFT;
            }
        }
        Self { code, modifiers }
    }

    pub fn simple(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT)
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }

    pub fn ctrl_shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL | KeyModifiers::SHIFT)
    }

    pub fn parse(value: &str) -> Option<Self> {
        // "Ctrl++" and "+" name the plus key itself.
        let (head, plus) = match value.strip_suffix("++") {
            Some(head) => (head, true),
            None if value == "+" => ("", true),
            None => (value, false),
        };
        let mut modifiers = KeyModifiers::NONE;
        let mut key_part: Option<&str> = plus.then_some("+");
        let parts = head.split('+').map(str::trim);
        for part in parts.filter(|_| !head.is_empty()) {
            if part.is_empty() {
                return None;
            }
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "super" | "meta" | "cmd" | "command" => modifiers |= KeyModifiers::SUPER,
                _ => {
                    if key_part.is_some() {
                        return None;
                    }
                    key_part = Some(part);
                }
            }
        }
        let code = parse_key_code(key_part?)?;
        Some(Self::new(code, modifiers))
    }

    /// Whether `Display` output parses back to this stroke. Media and modifier
    /// key codes have no text form.
    pub fn has_text_form(&self) -> bool {
        match self.code {
            KeyCode::Char(ch) => ch == ' ' || !ch.is_whitespace(),
            KeyCode::Media(_) | KeyCode::Modifier(_) => false,
            _ => true,
        }
    }
}

fn parse_key_code(value: &str) -> Option<KeyCode> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }

    let v_lc = v.to_ascii_lowercase();
    let code = match v_lc.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "insert" | "ins" => KeyCode::Insert,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "space" => KeyCode::Char(' '),
        "null" => KeyCode::Null,
        "capslock" => KeyCode::CapsLock,
        "scrolllock" => KeyCode::ScrollLock,
        "numlock" => KeyCode::NumLock,
        "printscreen" => KeyCode::PrintScreen,
        "pause" => KeyCode::Pause,
        "menu" => KeyCode::Menu,
        "keypadbegin" => KeyCode::KeypadBegin,
        _ if v_lc.len() > 1 && v_lc.starts_with('f') => {
            let n = v_lc[1..].parse::<u8>().ok()?;
            KeyCode::F(n)
        }
        _ => {
            let mut chars = v.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };

    Some(code)
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        if m.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if m.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        if m.contains(KeyModifiers::SHIFT) {
            f.write_str("Shift+")?;
        }
        if m.contains(KeyModifiers::SUPER) {
            f.write_str("Super+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            KeyCode::Enter => f.write_str("Enter"),
            KeyCode::Tab => f.write_str("Tab"),
            KeyCode::BackTab => f.write_str("BackTab"),
            KeyCode::Esc => f.write_str("Esc"),
            KeyCode::Backspace => f.write_str("Backspace"),
            KeyCode::Delete => f.write_str("Delete"),
            KeyCode::Insert => f.write_str("Insert"),
            KeyCode::Up => f.write_str("Up"),
            KeyCode::Down => f.write_str("Down"),
            KeyCode::Left => f.write_str("Left"),
            KeyCode::Right => f.write_str("Right"),
            KeyCode::Home => f.write_str("Home"),
            KeyCode::End => f.write_str("End"),
            KeyCode::PageUp => f.write_str("PageUp"),
            KeyCode::PageDown => f.write_str("PageDown"),
            KeyCode::Null => f.write_str("Null"),
            KeyCode::CapsLock => f.write_str("CapsLock"),
            KeyCode::ScrollLock => f.write_str("ScrollLock"),
            KeyCode::NumLock => f.write_str("NumLock"),
            KeyCode::PrintScreen => f.write_str("PrintScreen"),
            KeyCode::Pause => f.write_str("Pause"),
            KeyCode::Menu => f.write_str("Menu"),
            KeyCode::KeypadBegin => f.write_str("KeypadBegin"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Ordered strokes. Bindings match on the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeySequence(Vec<KeyStroke>);

impl KeySequence {
    pub fn new(strokes: Vec<KeyStroke>) -> Self {
        Self(strokes)
    }

    pub fn single(stroke: KeyStroke) -> Self {
        Self(vec![stroke])
    }

    pub fn strokes(&self) -> &[KeyStroke] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, stroke: KeyStroke) {
        self.0.push(stroke);
    }

    /// `self` is a proper prefix of `other`.
    pub fn is_prefix_of(&self, other: &KeySequence) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<KeyStroke> for KeySequence {
    fn from(stroke: KeyStroke) -> Self {
        Self::single(stroke)
    }
}

impl FromStr for KeySequence {
    type Err = KeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let strokes = value
            .split_whitespace()
            .map(|part| {
                KeyStroke::parse(part).ok_or_else(|| KeyParseError::InvalidStroke(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if strokes.is_empty() {
            return Err(KeyParseError::Empty);
        }
        Ok(Self(strokes))
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stroke) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{stroke}")?;
        }
        Ok(())
    }
}

impl Serialize for KeySequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(stroke) = self.0.iter().find(|s| !s.has_text_form()) {
            return Err(serde::ser::Error::custom(format!(
                "key {:?} has no text form",
                stroke.code
            )));
        }
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeySequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bindings/key.rs"]
mod tests;
