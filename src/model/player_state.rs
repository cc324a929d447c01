use serde::{Deserialize, Serialize};

/// Upper bound for health and energy. Gold has no ceiling, only a floor of 0.
pub const STAT_MAX: i32 = 100;

/// Number of action options offered while a session is active.
pub const ACTION_OPTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Won,
    Lost,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Active)
    }
}

/// The authoritative session snapshot.
/// Owned by the state store; everything outside the store reads it only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub health: i32,
    pub energy: i32,
    pub gold: i32,

    /// Item names in insertion order; insertion order is display order.
    pub inventory: Vec<String>,

    /// The choices offered next turn. Exactly 3 while active, empty once
    /// the session has finished.
    pub action_options: Vec<String>,

    /// Derived gating flags, recomputed by the store on every apply.
    pub can_rest: bool,
    pub can_heal: bool,

    /// Versions the state. Every applied update increments it by exactly 1.
    pub turn_number: u32,

    pub status: SessionStatus,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: STAT_MAX,
            energy: STAT_MAX,
            gold: 0,
            inventory: Vec::new(),
            action_options: Vec::new(),
            can_rest: true,
            can_heal: false,
            turn_number: 0,
            status: SessionStatus::Active,
        }
    }
}

impl PlayerState {
    pub fn stats(&self) -> (i32, i32, i32) {
        (self.health, self.energy, self.gold)
    }
}
