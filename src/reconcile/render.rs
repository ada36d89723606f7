//! Render strategy injected into the reconciler.

use crate::slices::{Category, LeaderEntry, MatchEntity, OddsEntry};

/// UI side of the reconciler. Implementations redraw whatever they own;
/// only `render_match` is required.
pub trait RenderStrategy: Send {
    /// A match card changed and passed the dispatch gate.
    fn render_match(&mut self, key: &str, entity: &MatchEntity);

    fn render_odds(&mut self, _key: &str, _odds: &OddsEntry) {}

    fn render_leaderboards(&mut self, _category: Category, _entries: &[LeaderEntry]) {}

    fn connection_changed(&mut self, _connected: bool) {}
}

/// Renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl RenderStrategy for NoopRenderer {
    fn render_match(&mut self, _key: &str, _entity: &MatchEntity) {}
}

impl<R: RenderStrategy + ?Sized> RenderStrategy for Box<R> {
    fn render_match(&mut self, key: &str, entity: &MatchEntity) {
        (**self).render_match(key, entity)
    }

    fn render_odds(&mut self, key: &str, odds: &OddsEntry) {
        (**self).render_odds(key, odds)
    }

    fn render_leaderboards(&mut self, category: Category, entries: &[LeaderEntry]) {
        (**self).render_leaderboards(category, entries)
    }

    fn connection_changed(&mut self, connected: bool) {
        (**self).connection_changed(connected)
    }
}
