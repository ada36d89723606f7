//! A small slice used by the store engine tests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoreboard {
    pub home: u32,
    pub away: u32,
    pub label: String,
    pub history: Vec<String>,
}

impl Scoreboard {
    pub fn goal(&mut self, side: &str) -> Result<u32, String> {
        let total = match side {
            "home" => {
                self.home += 1;
                self.home
            }
            "away" => {
                self.away += 1;
                self.away
            }
            other => return Err(format!("no side called {other}")),
        };
        self.history.push(side.to_string());
        Ok(total)
    }
}
