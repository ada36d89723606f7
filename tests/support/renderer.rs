use std::sync::{Arc, Mutex};

use league_store::slices::{Category, LeaderEntry, MatchEntity, OddsEntry, Score};
use league_store::RenderStrategy;

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Match { key: String, score: Score, events: usize },
    Odds { key: String, value: f64 },
    Leaderboard { category: Category, len: usize },
    Connection(bool),
}

/// Renderer that keeps a log of every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingRenderer {
    pub fn all(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    /// Keys of rendered match cards, in order.
    pub fn match_keys(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Match { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    fn push(&self, entry: Recorded) {
        self.log.lock().unwrap().push(entry);
    }
}

impl RenderStrategy for RecordingRenderer {
    fn render_match(&mut self, key: &str, entity: &MatchEntity) {
        self.push(Recorded::Match {
            key: key.to_string(),
            score: entity.score,
            events: entity.events.len(),
        });
    }

    fn render_odds(&mut self, key: &str, odds: &OddsEntry) {
        self.push(Recorded::Odds {
            key: key.to_string(),
            value: odds.value,
        });
    }

    fn render_leaderboards(&mut self, category: Category, entries: &[LeaderEntry]) {
        self.push(Recorded::Leaderboard {
            category,
            len: entries.len(),
        });
    }

    fn connection_changed(&mut self, connected: bool) {
        self.push(Recorded::Connection(connected));
    }
}
