use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub unlocked_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileState {
    pub achievements: Vec<Achievement>,
    pub stats: Map<String, Value>,
    pub loading: bool,
}

impl ProfileState {
    /// Mark an achievement unlocked. The first unlock time wins.
    pub fn unlock(&mut self, id: &str, now: i64) -> bool {
        match self.achievements.iter_mut().find(|a| a.id == id) {
            Some(a) if a.unlocked_at.is_none() => {
                a.unlocked_at = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked_at.is_some())
    }
}
