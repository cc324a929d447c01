use serde::{Deserialize, Serialize};

/// A *proposal* for the next [`PlayerState`], produced by the model
/// collaborator. This never mutates state directly: it must pass the schema
/// validator and is then applied as a diff-checked replacement by the store.
///
/// Wire field names match the structured-output contract the model is
/// prompted with (`player_message`, `player_stats` as a 3-tuple, ...).
///
/// [`PlayerState`]: crate::model::player_state::PlayerState
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUpdate {
    /// Narrative text shown to the player.
    pub player_message: String,

    /// Full inventory replacement, in display order.
    pub inventory: Vec<String>,

    /// (health, energy, gold) proposed for the next turn.
    pub player_stats: (i32, i32, i32),

    /// The 3 choices offered next turn.
    pub action_options: Vec<String>,

    /// Advisory only; the store recomputes both gating flags.
    pub can_rest: bool,
    pub can_heal: bool,

    pub generate_image: bool,
    pub image_prompt: String,

    /// Not part of the original contract, so tolerated as absent.
    #[serde(default)]
    pub in_combat: bool,
    #[serde(default)]
    pub quest_complete: bool,
}

impl CandidateUpdate {
    pub fn health(&self) -> i32 {
        self.player_stats.0
    }

    pub fn energy(&self) -> i32 {
        self.player_stats.1
    }

    pub fn gold(&self) -> i32 {
        self.player_stats.2
    }

    /// Whether the payload itself proposes ending the session. Terminal
    /// payloads are exempt from the 3-option rule.
    pub fn signals_terminal(&self) -> bool {
        self.player_stats.0 <= 0 || self.quest_complete
    }
}
