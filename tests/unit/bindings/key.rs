use super::*;

#[test]
fn test_parse_stroke() {
    assert_eq!(
        KeyStroke::parse("Ctrl+Shift+P"),
        Some(KeyStroke::new(
            KeyCode::Char('p'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        ))
    );
    assert_eq!(
        KeyStroke::parse("ctrl+p"),
        Some(KeyStroke::ctrl(KeyCode::Char('p')))
    );
    assert_eq!(KeyStroke::parse("F5"), Some(KeyStroke::simple(KeyCode::F(5))));
    assert_eq!(
        KeyStroke::parse("f"),
        Some(KeyStroke::simple(KeyCode::Char('f')))
    );
    assert_eq!(
        KeyStroke::parse("Alt+Enter"),
        Some(KeyStroke::alt(KeyCode::Enter))
    );
    assert_eq!(
        KeyStroke::parse("cmd+space"),
        Some(KeyStroke::new(KeyCode::Char(' '), KeyModifiers::SUPER))
    );
}

#[test]
fn test_uppercase_means_shift() {
    assert_eq!(
        KeyStroke::new(KeyCode::Char('S'), KeyModifiers::CONTROL),
        KeyStroke::ctrl_shift(KeyCode::Char('s'))
    );
    assert_eq!(KeyStroke::parse("Ctrl+S"), KeyStroke::parse("Ctrl+Shift+s"));
}

#[test]
fn test_parse_rejects_garbage() {
    assert_eq!(KeyStroke::parse(""), None);
    assert_eq!(KeyStroke::parse("Ctrl+"), None);
    assert_eq!(KeyStroke::parse("Ctrl+ab"), None);
    assert_eq!(KeyStroke::parse("a+b"), None);
    assert_eq!(KeyStroke::parse("Fx"), None);
}

#[test]
fn test_stroke_display() {
    assert_eq!(KeyStroke::ctrl_shift(KeyCode::Char('p')).to_string(), "Ctrl+Shift+p");
    assert_eq!(KeyStroke::simple(KeyCode::Char(' ')).to_string(), "Space");
    assert_eq!(KeyStroke::alt(KeyCode::F(12)).to_string(), "Alt+F12");
    assert_eq!(KeyStroke::simple(KeyCode::PageDown).to_string(), "PageDown");
}

#[test]
fn test_sequence_parse_and_display() {
    let seq: KeySequence = "Ctrl+K  Ctrl+s".parse().unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(seq.strokes()[1], KeyStroke::ctrl(KeyCode::Char('s')));
    assert_eq!(seq.to_string(), "Ctrl+Shift+k Ctrl+s");

    let reparsed: KeySequence = seq.to_string().parse().unwrap();
    assert_eq!(reparsed, seq);
}

#[test]
fn test_sequence_parse_errors() {
    assert_eq!("".parse::<KeySequence>(), Err(KeyParseError::Empty));
    assert_eq!(
        "Ctrl+k Ctrl+zz".parse::<KeySequence>(),
        Err(KeyParseError::InvalidStroke("Ctrl+zz".to_string()))
    );
}

#[test]
fn test_prefix() {
    let chord: KeySequence = "Ctrl+k Ctrl+s".parse().unwrap();
    let first: KeySequence = "Ctrl+k".parse().unwrap();
    let other: KeySequence = "Ctrl+j".parse().unwrap();

    assert!(first.is_prefix_of(&chord));
    assert!(!chord.is_prefix_of(&chord));
    assert!(!other.is_prefix_of(&chord));
    assert!(!chord.is_prefix_of(&first));
}

#[test]
fn test_sequence_serde_as_string() {
    let seq: KeySequence = "Ctrl+k Ctrl+s".parse().unwrap();
    let json = serde_json::to_string(&seq).unwrap();
    assert_eq!(json, "\"Ctrl+k Ctrl+s\"");

    let decoded: KeySequence = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, seq);
    assert!(serde_json::from_str::<KeySequence>("\"Ctrl+\"").is_err());
}

#[test]
fn test_plus_key() {
    let plus = KeyStroke::ctrl(KeyCode::Char('+'));
    assert_eq!(KeyStroke::parse("Ctrl++"), Some(plus));
    assert_eq!(plus.to_string(), "Ctrl++");
    assert_eq!(KeyStroke::parse("+"), Some(KeyStroke::simple(KeyCode::Char('+'))));
    assert_eq!(KeyStroke::parse("Ctrl++s"), None);

    let seq: KeySequence = "Ctrl++ Ctrl+Shift++".parse().unwrap();
    let json = serde_json::to_string(&seq).unwrap();
    assert_eq!(serde_json::from_str::<KeySequence>(&json).unwrap(), seq);
}

#[test]
fn test_named_keys_survive_serde() {
    let seq = KeySequence::new(vec![
        KeyStroke::simple(KeyCode::CapsLock),
        KeyStroke::ctrl(KeyCode::PrintScreen),
        KeyStroke::simple(KeyCode::Menu),
    ]);
    assert_eq!(seq.to_string(), "CapsLock Ctrl+PrintScreen Menu");
    let json = serde_json::to_string(&seq).unwrap();
    assert_eq!(serde_json::from_str::<KeySequence>(&json).unwrap(), seq);
}

#[test]
fn test_media_key_has_no_text_form() {
    use crossterm::event::MediaKeyCode;

    let stroke = KeyStroke::simple(KeyCode::Media(MediaKeyCode::Play));
    assert!(!stroke.has_text_form());
    assert!(KeyStroke::simple(KeyCode::Char('+')).has_text_form());
    assert!(serde_json::to_string(&KeySequence::single(stroke)).is_err());
}
