use serde::{Deserialize, Serialize};

use crate::storage::Persisted;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiDocument {
    #[serde(default)]
    pub dark_mode: bool,
}

/// Display preferences that outlive the session.
#[derive(Debug, Default)]
pub struct Preferences {
    dark_mode: bool,
    revision: u64,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flips the theme and returns the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.revision += 1;
        self.dark_mode
    }
}

impl Persisted for Preferences {
    const KEY: &'static str = "ui-storage";
    type Document = UiDocument;

    fn snapshot(&self) -> UiDocument {
        UiDocument {
            dark_mode: self.dark_mode,
        }
    }

    fn restore(&mut self, document: UiDocument) {
        self.dark_mode = document.dark_mode;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
