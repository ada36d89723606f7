use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub team: Option<String>,
}

/// Signed-in user. `profile` and `favorites` survive reloads; the session
/// token never does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    pub id: Option<i64>,
    pub token: Option<String>,
    pub profile: UserProfile,
    pub favorites: Vec<String>,
}

impl UserState {
    /// Add or remove a favorite team. Returns true if it is now a favorite.
    pub fn toggle_favorite(&mut self, team: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|t| t == team) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(team.to_string());
            true
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.id.is_some() && self.token.is_some()
    }
}
