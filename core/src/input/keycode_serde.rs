//! KeyCode serialization utilities

use serde::Deserialize;
use winit::keyboard::KeyCode;

/// Key names accepted in config files, in both directions
const KEY_NAMES: &[(KeyCode, &str)] = &[
    // Letters
    (KeyCode::KeyA, "A"),
    (KeyCode::KeyB, "B"),
    (KeyCode::KeyC, "C"),
    (KeyCode::KeyD, "D"),
    (KeyCode::KeyE, "E"),
    (KeyCode::KeyF, "F"),
    (KeyCode::KeyG, "G"),
    (KeyCode::KeyH, "H"),
    (KeyCode::KeyI, "I"),
    (KeyCode::KeyJ, "J"),
    (KeyCode::KeyK, "K"),
    (KeyCode::KeyL, "L"),
    (KeyCode::KeyM, "M"),
    (KeyCode::KeyN, "N"),
    (KeyCode::KeyO, "O"),
    (KeyCode::KeyP, "P"),
    (KeyCode::KeyQ, "Q"),
    (KeyCode::KeyR, "R"),
    (KeyCode::KeyS, "S"),
    (KeyCode::KeyT, "T"),
    (KeyCode::KeyU, "U"),
    (KeyCode::KeyV, "V"),
    (KeyCode::KeyW, "W"),
    (KeyCode::KeyX, "X"),
    (KeyCode::KeyY, "Y"),
    (KeyCode::KeyZ, "Z"),
    // Numbers
    (KeyCode::Digit0, "0"),
    (KeyCode::Digit1, "1"),
    (KeyCode::Digit2, "2"),
    (KeyCode::Digit3, "3"),
    (KeyCode::Digit4, "4"),
    (KeyCode::Digit5, "5"),
    (KeyCode::Digit6, "6"),
    (KeyCode::Digit7, "7"),
    (KeyCode::Digit8, "8"),
    (KeyCode::Digit9, "9"),
    // Arrow keys
    (KeyCode::ArrowUp, "ArrowUp"),
    (KeyCode::ArrowDown, "ArrowDown"),
    (KeyCode::ArrowLeft, "ArrowLeft"),
    (KeyCode::ArrowRight, "ArrowRight"),
    // Function keys
    (KeyCode::F1, "F1"),
    (KeyCode::F2, "F2"),
    (KeyCode::F3, "F3"),
    (KeyCode::F4, "F4"),
    (KeyCode::F5, "F5"),
    (KeyCode::F6, "F6"),
    (KeyCode::F7, "F7"),
    (KeyCode::F8, "F8"),
    (KeyCode::F9, "F9"),
    (KeyCode::F10, "F10"),
    (KeyCode::F11, "F11"),
    (KeyCode::F12, "F12"),
    // Modifiers
    (KeyCode::ShiftLeft, "ShiftLeft"),
    (KeyCode::ShiftRight, "ShiftRight"),
    (KeyCode::ControlLeft, "ControlLeft"),
    (KeyCode::ControlRight, "ControlRight"),
    (KeyCode::AltLeft, "AltLeft"),
    (KeyCode::AltRight, "AltRight"),
    // Special keys
    (KeyCode::Space, "Space"),
    (KeyCode::Enter, "Enter"),
    (KeyCode::Escape, "Escape"),
    (KeyCode::Backspace, "Backspace"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::Insert, "Insert"),
    (KeyCode::Delete, "Delete"),
    (KeyCode::Home, "Home"),
    (KeyCode::End, "End"),
    (KeyCode::PageUp, "PageUp"),
    (KeyCode::PageDown, "PageDown"),
    // Punctuation
    (KeyCode::Comma, "Comma"),
    (KeyCode::Period, "Period"),
    (KeyCode::Slash, "Slash"),
    (KeyCode::Backslash, "Backslash"),
    (KeyCode::Semicolon, "Semicolon"),
    (KeyCode::Quote, "Quote"),
    (KeyCode::BracketLeft, "BracketLeft"),
    (KeyCode::BracketRight, "BracketRight"),
    (KeyCode::Backquote, "Backquote"),
    (KeyCode::Minus, "Minus"),
    (KeyCode::Equal, "Equal"),
    // Numpad
    (KeyCode::Numpad0, "Numpad0"),
    (KeyCode::Numpad1, "Numpad1"),
    (KeyCode::Numpad2, "Numpad2"),
    (KeyCode::Numpad3, "Numpad3"),
    (KeyCode::Numpad4, "Numpad4"),
    (KeyCode::Numpad5, "Numpad5"),
    (KeyCode::Numpad6, "Numpad6"),
    (KeyCode::Numpad7, "Numpad7"),
    (KeyCode::Numpad8, "Numpad8"),
    (KeyCode::Numpad9, "Numpad9"),
    (KeyCode::NumpadAdd, "NumpadAdd"),
    (KeyCode::NumpadSubtract, "NumpadSubtract"),
    (KeyCode::NumpadMultiply, "NumpadMultiply"),
    (KeyCode::NumpadDivide, "NumpadDivide"),
    (KeyCode::NumpadEnter, "NumpadEnter"),
    (KeyCode::NumpadDecimal, "NumpadDecimal"),
];

/// Convert KeyCode to a human-readable string name
pub fn keycode_to_string(key: KeyCode) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(code, _)| *code == key)
        .map_or("Unknown", |(_, name)| name)
}

/// Convert a string name back to KeyCode. Case-insensitive.
pub fn string_to_keycode(s: &str) -> Option<KeyCode> {
    let s = s.trim();
    KEY_NAMES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(s))
        .map(|(code, _)| *code)
}

/// Serialize a KeyCode as a string
pub(super) fn serialize_keycode<S>(key: &KeyCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(keycode_to_string(*key))
}

/// Deserialize a KeyCode from a string
pub(super) fn deserialize_keycode<'de, D>(deserializer: D) -> Result<KeyCode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    string_to_keycode(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("Unknown key name: '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for (code, name) in KEY_NAMES {
            assert_eq!(keycode_to_string(*code), *name);
            assert_eq!(string_to_keycode(name), Some(*code));
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(string_to_keycode("minus"), Some(KeyCode::Minus));
        assert_eq!(string_to_keycode("c"), Some(KeyCode::KeyC));
        assert_eq!(string_to_keycode(" f5 "), Some(KeyCode::F5));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(string_to_keycode("Hyper"), None);
        assert_eq!(keycode_to_string(KeyCode::AudioVolumeUp), "Unknown");
    }
}
