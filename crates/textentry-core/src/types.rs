// SPDX-License-Identifier: MIT
//
// Keyboard and event types shared between the engine-facing API and the
// platform widget layer.
//
// The engine passes keyboard configuration across the native boundary as
// plain integers; the enums here give those integers names and map them to
// the platform's input-type bitmask. Key codes and editor action ids use the
// Android constant values, which are stable public API.

use serde::{Deserialize, Serialize};

// android.text.InputType
const TYPE_CLASS_TEXT: i32 = 0x0000_0001;
const TYPE_CLASS_NUMBER: i32 = 0x0000_0002;
const TYPE_TEXT_FLAG_CAP_CHARACTERS: i32 = 0x0000_1000;
const TYPE_TEXT_FLAG_CAP_WORDS: i32 = 0x0000_2000;
const TYPE_TEXT_FLAG_CAP_SENTENCES: i32 = 0x0000_4000;
const TYPE_TEXT_FLAG_NO_SUGGESTIONS: i32 = 0x0008_0000;

// android.view.KeyEvent
const KEYCODE_BACK: i32 = 4;
const KEYCODE_ENTER: i32 = 66;
const FLAG_EDITOR_ACTION: i32 = 0x10;

// android.view.inputmethod.EditorInfo
const IME_ACTION_GO: i32 = 2;
const IME_ACTION_NEXT: i32 = 5;
const IME_ACTION_DONE: i32 = 6;

/// Keyboard layout requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyboardType {
    /// Plain text keyboard with suggestions suppressed.
    #[default]
    Text,
    /// Numeric keypad.
    Numeric,
}

impl KeyboardType {
    /// Decode the integer form used across the engine boundary.
    ///
    /// Returns `None` for values outside the recognised set; callers
    /// substitute [`KeyboardType::Text`] and log the bad value.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Text),
            1 => Some(Self::Numeric),
            _ => None,
        }
    }

    /// The platform input-type bits for this keyboard layout.
    pub fn mask(self) -> i32 {
        match self {
            Self::Text => TYPE_CLASS_TEXT | TYPE_TEXT_FLAG_NO_SUGGESTIONS,
            Self::Numeric => TYPE_CLASS_NUMBER,
        }
    }
}

/// Automatic capitalisation applied while the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Capitalisation {
    /// No automatic capitalisation.
    #[default]
    None,
    /// Capitalise the first letter of each sentence.
    Sentences,
    /// Capitalise the first letter of each word.
    Words,
    /// Capitalise every character.
    Characters,
}

impl Capitalisation {
    /// Decode the integer form used across the engine boundary.
    ///
    /// Returns `None` for values outside the recognised set; callers
    /// substitute [`Capitalisation::None`] and log the bad value.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            1 => Some(Self::Sentences),
            2 => Some(Self::Words),
            3 => Some(Self::Characters),
            _ => None,
        }
    }

    /// The platform input-type bits for this capitalisation method.
    pub fn mask(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Sentences => TYPE_TEXT_FLAG_CAP_SENTENCES,
            Self::Words => TYPE_TEXT_FLAG_CAP_WORDS,
            Self::Characters => TYPE_TEXT_FLAG_CAP_CHARACTERS,
        }
    }
}

/// Hardware or IME key presses that dismiss the keyboard.
///
/// Only the dismissal-relevant keys are modelled; all other key codes decode
/// to `None` and are left to the platform's default handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The system back key.
    Back,
    /// The enter key.
    Enter,
    /// A key event synthesised from an editor action.
    Action,
}

impl Key {
    /// Decode a platform key code.
    pub fn from_raw(key_code: i32) -> Option<Self> {
        match key_code {
            KEYCODE_BACK => Some(Self::Back),
            KEYCODE_ENTER => Some(Self::Enter),
            FLAG_EDITOR_ACTION => Some(Self::Action),
            _ => None,
        }
    }
}

/// Soft-keyboard editor actions that dismiss the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImeAction {
    /// The "done" action.
    Done,
    /// The "go" action.
    Go,
    /// The "next" action.
    Next,
}

impl ImeAction {
    /// Decode a platform editor action id.
    pub fn from_raw(action_id: i32) -> Option<Self> {
        match action_id {
            IME_ACTION_DONE => Some(Self::Done),
            IME_ACTION_GO => Some(Self::Go),
            IME_ACTION_NEXT => Some(Self::Next),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_type_decodes_known_values() {
        assert_eq!(KeyboardType::from_raw(0), Some(KeyboardType::Text));
        assert_eq!(KeyboardType::from_raw(1), Some(KeyboardType::Numeric));
    }

    #[test]
    fn keyboard_type_rejects_unknown_values() {
        assert_eq!(KeyboardType::from_raw(-1), None);
        assert_eq!(KeyboardType::from_raw(2), None);
        assert_eq!(KeyboardType::from_raw(i32::MAX), None);
    }

    #[test]
    fn text_mask_suppresses_suggestions() {
        assert_eq!(KeyboardType::Text.mask(), 0x0008_0001);
    }

    #[test]
    fn numeric_mask_is_number_class() {
        assert_eq!(KeyboardType::Numeric.mask(), 0x0000_0002);
    }

    #[test]
    fn capitalisation_decodes_known_values() {
        assert_eq!(Capitalisation::from_raw(0), Some(Capitalisation::None));
        assert_eq!(Capitalisation::from_raw(1), Some(Capitalisation::Sentences));
        assert_eq!(Capitalisation::from_raw(2), Some(Capitalisation::Words));
        assert_eq!(Capitalisation::from_raw(3), Some(Capitalisation::Characters));
    }

    #[test]
    fn capitalisation_rejects_unknown_values() {
        assert_eq!(Capitalisation::from_raw(4), None);
        assert_eq!(Capitalisation::from_raw(-7), None);
    }

    #[test]
    fn capitalisation_masks_are_distinct_bits() {
        let masks = [
            Capitalisation::Sentences.mask(),
            Capitalisation::Words.mask(),
            Capitalisation::Characters.mask(),
        ];
        for (i, a) in masks.iter().enumerate() {
            for b in &masks[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
        assert_eq!(Capitalisation::None.mask(), 0);
    }

    #[test]
    fn dismissal_keys_decode() {
        assert_eq!(Key::from_raw(4), Some(Key::Back));
        assert_eq!(Key::from_raw(66), Some(Key::Enter));
        assert_eq!(Key::from_raw(0x10), Some(Key::Action));
        assert_eq!(Key::from_raw(29), None); // KEYCODE_A
    }

    #[test]
    fn dismissal_actions_decode() {
        assert_eq!(ImeAction::from_raw(6), Some(ImeAction::Done));
        assert_eq!(ImeAction::from_raw(2), Some(ImeAction::Go));
        assert_eq!(ImeAction::from_raw(5), Some(ImeAction::Next));
        assert_eq!(ImeAction::from_raw(3), None); // IME_ACTION_SEARCH
    }
}
