use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Layout state. Theme, active tab and collapsed panels are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiState {
    pub theme: Theme,
    pub active_tab: String,
    pub collapsed: BTreeMap<String, bool>,
    pub modal: Option<String>,
    pub loading: bool,
}

impl UiState {
    /// Switch tabs. Returns false if the tab was already active.
    pub fn select_tab(&mut self, tab: &str) -> bool {
        if self.active_tab == tab {
            return false;
        }
        self.active_tab = tab.to_string();
        true
    }

    /// Flip a panel's collapsed flag and return the new value.
    pub fn toggle_collapsed(&mut self, panel: &str) -> bool {
        let flag = self.collapsed.entry(panel.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }
}
