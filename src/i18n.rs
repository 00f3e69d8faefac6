//! English and Russian strings for the settings surface

use serde::{Deserialize, Serialize};

use crate::inject::MouseButton;

/// Display language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ru")]
    Russian,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Russian => "ru",
        }
    }

    /// Parse a stored language code; anything but "ru" is English
    pub fn from_code(code: &str) -> Self {
        match code {
            "ru" => Language::Russian,
            _ => Language::English,
        }
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Language::English => &EN,
            Language::Russian => &RU,
        }
    }
}

/// One language's string table
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub start_hold: &'static str,
    pub stop_hold: &'static str,
    pub left_button: &'static str,
    pub right_button: &'static str,
    pub enable_hotkey: &'static str,
    pub status_held: &'static str,
    pub status_released: &'static str,
    pub hotkey_failed: &'static str,
}

static EN: Strings = Strings {
    title: "Mouse Hold - mouse click simulator",
    start_hold: "Start (Hold)",
    stop_hold: "Stop (Release)",
    left_button: "Left button",
    right_button: "Right button",
    enable_hotkey: "Enable global hotkey (F6)",
    status_held: "Status: button held",
    status_released: "Status: button released",
    hotkey_failed: "Failed to register hotkey F6.",
};

static RU: Strings = Strings {
    title: "Mouse Hold - симулятор зажатия мыши",
    start_hold: "Начать (Зажать)",
    stop_hold: "Остановить (Отпустить)",
    left_button: "Левая кнопка",
    right_button: "Правая кнопка",
    enable_hotkey: "Включить глобальную клавишу (F6)",
    status_held: "Статус: кнопка зажата",
    status_released: "Статус: кнопка отпущена",
    hotkey_failed: "Не удалось зарегистрировать клавишу F6.",
};

impl Strings {
    pub fn toggle_label(&self, holding: bool) -> &'static str {
        if holding {
            self.stop_hold
        } else {
            self.start_hold
        }
    }

    pub fn status_line(&self, holding: bool) -> &'static str {
        if holding {
            self.status_held
        } else {
            self.status_released
        }
    }

    pub fn button_name(&self, button: MouseButton) -> &'static str {
        match button {
            MouseButton::Left => self.left_button,
            MouseButton::Right => self.right_button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_falls_back_to_english() {
        assert_eq!(Language::from_code("ru"), Language::Russian);
        assert_eq!(Language::from_code("de"), Language::English);
        assert_eq!(Language::from_code(""), Language::English);
    }

    #[test]
    fn test_labels_follow_hold_state() {
        let en = Language::English.strings();
        assert_eq!(en.toggle_label(false), "Start (Hold)");
        assert_eq!(en.toggle_label(true), "Stop (Release)");
        assert_eq!(en.status_line(true), "Status: button held");
    }

    #[test]
    fn test_russian_error_message() {
        let ru = Language::Russian.strings();
        assert!(ru.hotkey_failed.contains("F6"));
        assert_eq!(ru.button_name(MouseButton::Right), "Правая кнопка");
    }

    #[test]
    fn test_language_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::Russian).unwrap(), "\"ru\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::English);
    }
}
