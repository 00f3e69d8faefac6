//! Status readout returned to UI clients

use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::inject::MouseButton;

/// Snapshot of everything a settings window shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldStatus {
    /// Daemon version
    pub version: String,

    /// Whether a synthetic button is down
    pub holding: bool,

    /// Button used by the next press
    pub selected_button: MouseButton,

    /// Button currently down, if any
    pub held_button: Option<MouseButton>,

    /// Name of the toggle hotkey
    pub hotkey: String,

    /// Whether the hotkey is registered
    pub hotkey_enabled: bool,

    pub language: Language,

    /// Strings in the active language
    pub labels: Labels,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Localized control captions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub title: String,
    pub toggle: String,
    /// Selector options, indexed like [`MouseButton::index`]
    pub buttons: Vec<String>,
    pub hotkey: String,
    pub status: String,
}

impl Labels {
    pub fn new(language: Language, holding: bool) -> Self {
        let strings = language.strings();
        Self {
            title: strings.title.to_string(),
            toggle: strings.toggle_label(holding).to_string(),
            buttons: [MouseButton::Left, MouseButton::Right]
                .into_iter()
                .map(|b| strings.button_name(b).to_string())
                .collect(),
            hotkey: strings.enable_hotkey.to_string(),
            status: strings.status_line(holding).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_in_russian() {
        let labels = Labels::new(Language::Russian, true);
        assert_eq!(labels.toggle, "Остановить (Отпустить)");
        assert_eq!(labels.status, "Статус: кнопка зажата");
        assert_eq!(labels.buttons, vec!["Левая кнопка", "Правая кнопка"]);
    }

    #[test]
    fn test_button_order_matches_index() {
        let labels = Labels::new(Language::English, false);
        assert_eq!(labels.buttons[MouseButton::Right.index() as usize], "Right button");
    }
}
