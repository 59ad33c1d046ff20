// SPDX-License-Identifier: MIT
//
// Text entry configuration.

use serde::{Deserialize, Serialize};

use crate::types::{Capitalisation, KeyboardType};

/// Initial settings applied to the text entry widget when a bridge is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextEntryConfig {
    /// Keyboard layout shown when entry is activated.
    pub keyboard_type: KeyboardType,
    /// Automatic capitalisation applied while typing.
    pub capitalisation: Capitalisation,
    /// Contents of the text buffer before the user types anything.
    pub initial_buffer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_plain_text_without_capitalisation() {
        let config = TextEntryConfig::default();
        assert_eq!(config.keyboard_type, KeyboardType::Text);
        assert_eq!(config.capitalisation, Capitalisation::None);
        assert!(config.initial_buffer.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let config = TextEntryConfig {
            keyboard_type: KeyboardType::Numeric,
            capitalisation: Capitalisation::Words,
            initial_buffer: "player one".into(),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: TextEntryConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.keyboard_type, KeyboardType::Numeric);
        assert_eq!(back.capitalisation, Capitalisation::Words);
        assert_eq!(back.initial_buffer, "player one");
    }
}
