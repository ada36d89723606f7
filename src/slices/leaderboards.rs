use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three ranked leaderboard lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    GoalsAssists,
    Goals,
    Assists,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::GoalsAssists, Category::Goals, Category::Assists];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GoalsAssists => "goals_assists",
            Category::Goals => "goals",
            Category::Assists => "assists",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "goals_assists" | "goals-assists" | "ga" => Some(Category::GoalsAssists),
            "goals" => Some(Category::Goals),
            "assists" => Some(Category::Assists),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player identifiers arrive as numbers from some endpoints and strings
/// from others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerId {
    Num(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default)]
    pub games: u32,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
}

impl LeaderEntry {
    /// Primary ranking metric for `category`.
    pub fn metric(&self, category: Category) -> u64 {
        match category {
            Category::GoalsAssists => u64::from(self.goals) + u64::from(self.assists),
            Category::Goals => self.goals.into(),
            Category::Assists => self.assists.into(),
        }
    }

    /// Ranking order: metric descending, fewer games first, then name.
    pub fn rank_cmp(&self, other: &Self, category: Category) -> Ordering {
        other
            .metric(category)
            .cmp(&self.metric(category))
            .then(self.games.cmp(&other.games))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Top lists for each category, plus the ETag of the response they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardsState {
    pub goals_assists: Vec<LeaderEntry>,
    pub goals: Vec<LeaderEntry>,
    pub assists: Vec<LeaderEntry>,
    pub etag: Option<String>,
    pub ts: Option<i64>,
}

impl LeaderboardsState {
    pub fn list(&self, category: Category) -> &Vec<LeaderEntry> {
        match category {
            Category::GoalsAssists => &self.goals_assists,
            Category::Goals => &self.goals,
            Category::Assists => &self.assists,
        }
    }

    pub fn list_mut(&mut self, category: Category) -> &mut Vec<LeaderEntry> {
        match category {
            Category::GoalsAssists => &mut self.goals_assists,
            Category::Goals => &mut self.goals,
            Category::Assists => &mut self.assists,
        }
    }
}

/// Single-category table shown on the leaderboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardState {
    pub category: Category,
    pub items: Vec<LeaderEntry>,
    pub loading: bool,
    pub etag: Option<String>,
}

impl Default for LeaderboardState {
    fn default() -> Self {
        Self {
            category: Category::GoalsAssists,
            items: Vec::new(),
            loading: false,
            etag: None,
        }
    }
}
