//! The player state store: sole owner of the canonical [`PlayerState`].
//!
//! A validated [`CandidateUpdate`] is applied as a diff-checked replacement.
//! The next state is built in full before the swap, so a rejected update
//! leaves zero observable change.

use crate::error::ApplyError;
use crate::model::player_state::{PlayerState, SessionStatus, ACTION_OPTION_COUNT, STAT_MAX};
use crate::model::update::CandidateUpdate;

pub struct PlayerStateStore {
    state: PlayerState,
    /// Lowercased substrings that mark an inventory entry as a healing item.
    healing_keywords: Vec<String>,
}

impl PlayerStateStore {
    pub fn new(healing_keywords: &[String]) -> Self {
        Self::restore(PlayerState::default(), healing_keywords)
    }

    /// Rebuilds a store around a previously saved snapshot.
    pub fn restore(state: PlayerState, healing_keywords: &[String]) -> Self {
        Self {
            state,
            healing_keywords: healing_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Read-only view of the current snapshot.
    pub fn current(&self) -> &PlayerState {
        &self.state
    }

    /// Applies a validated update atomically. The candidate never sets
    /// `turn_number` or `status`: the turn number increments by exactly 1
    /// and the status is derived here (health 0 loses, `quest_complete`
    /// wins). The `can_rest`/`can_heal` flags carried on the update are
    /// ignored and recomputed.
    pub fn apply(&mut self, update: &CandidateUpdate) -> Result<PlayerState, ApplyError> {
        if self.state.status.is_terminal() {
            return Err(ApplyError::InvalidTransition);
        }

        let health = update.health().clamp(0, STAT_MAX);
        let energy = update.energy().clamp(0, STAT_MAX);
        let gold = update.gold().max(0);

        let status = if health == 0 {
            SessionStatus::Lost
        } else if update.quest_complete {
            SessionStatus::Won
        } else {
            SessionStatus::Active
        };

        if status == SessionStatus::Active && update.action_options.len() != ACTION_OPTION_COUNT {
            return Err(ApplyError::OptionCount(update.action_options.len()));
        }

        let inventory = update.inventory.clone();
        let action_options = if status.is_terminal() {
            Vec::new()
        } else {
            update.action_options.clone()
        };

        let can_rest = status == SessionStatus::Active && !update.in_combat;
        let can_heal = status == SessionStatus::Active
            && health < STAT_MAX
            && self.has_healing_item(&inventory);

        let next = PlayerState {
            health,
            energy,
            gold,
            inventory,
            action_options,
            can_rest,
            can_heal,
            turn_number: self.state.turn_number + 1,
            status,
        };

        tracing::debug!(
            turn = next.turn_number,
            status = ?next.status,
            health,
            energy,
            gold,
            "state transition applied"
        );
        self.state = next;
        Ok(self.state.clone())
    }

    /// Reinitializes to session defaults. Rejected mid-session: only a
    /// finished session may be reset.
    pub fn reset(&mut self) -> Result<PlayerState, ApplyError> {
        if !self.state.status.is_terminal() {
            return Err(ApplyError::SessionActive);
        }
        self.state = PlayerState::default();
        Ok(self.state.clone())
    }

    fn has_healing_item(&self, inventory: &[String]) -> bool {
        inventory.iter().any(|item| {
            let item = item.to_lowercase();
            self.healing_keywords.iter().any(|k| item.contains(k))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog;

    fn store() -> PlayerStateStore {
        let keywords: Vec<String> = catalog::HEALING_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();
        PlayerStateStore::new(&keywords)
    }

    fn update(stats: (i32, i32, i32)) -> CandidateUpdate {
        CandidateUpdate {
            player_message: "onward".into(),
            inventory: vec!["dagger".into()],
            player_stats: stats,
            action_options: vec!["a".into(), "b".into(), "c".into()],
            can_rest: false,
            can_heal: false,
            generate_image: false,
            image_prompt: String::new(),
            in_combat: false,
            quest_complete: false,
        }
    }

    #[test]
    fn apply_increments_turn_by_exactly_one() {
        let mut store = store();
        let mut u = update((100, 90, 10));
        u.in_combat = true;
        let state = store.apply(&u).unwrap();
        assert_eq!(state.stats(), (100, 90, 10));
        assert_eq!(state.inventory, vec!["dagger".to_string()]);
        assert_eq!(state.turn_number, 1);
        assert_eq!(state.status, SessionStatus::Active);
        assert!(!state.can_rest);
        let state = store.apply(&update((95, 80, 12))).unwrap();
        assert_eq!(state.turn_number, 2);
        assert!(state.can_rest);
    }

    #[test]
    fn health_zero_loses_and_locks_the_store() {
        let mut store = store();
        let state = store.apply(&update((0, 50, 10))).unwrap();
        assert_eq!(state.status, SessionStatus::Lost);
        assert_eq!(state.turn_number, 1);
        assert!(state.action_options.is_empty());
        assert!(!state.can_rest);
        assert!(!state.can_heal);

        let err = store.apply(&update((50, 50, 10))).unwrap_err();
        assert_eq!(err, ApplyError::InvalidTransition);
        assert_eq!(store.current().turn_number, 1);
    }

    #[test]
    fn quest_complete_wins() {
        let mut store = store();
        let mut u = update((70, 60, 50));
        u.quest_complete = true;
        u.action_options.clear();
        let state = store.apply(&u).unwrap();
        assert_eq!(state.status, SessionStatus::Won);
        assert!(state.action_options.is_empty());
    }

    #[test]
    fn rejected_update_leaves_no_observable_change() {
        let mut store = store();
        let before = store.current().clone();
        let mut u = update((90, 90, 5));
        u.action_options.pop();
        assert_eq!(store.apply(&u).unwrap_err(), ApplyError::OptionCount(2));
        assert_eq!(store.current(), &before);
    }

    #[test]
    fn stats_are_clamped_to_bounds() {
        let mut store = store();
        let state = store.apply(&update((100, 90, -4))).unwrap();
        assert_eq!(state.gold, 0);
    }

    #[test]
    fn can_heal_requires_injury_and_a_healing_item() {
        let mut store = store();

        let mut u = update((80, 90, 5));
        u.inventory = vec!["A small satchel of healing herbs and potions".into()];
        assert!(store.apply(&u).unwrap().can_heal);

        // Uninjured: no heal even with the satchel.
        let mut u = update((100, 90, 5));
        u.inventory = vec!["Healing Potion".into()];
        assert!(!store.apply(&u).unwrap().can_heal);

        // Injured but nothing to heal with.
        let mut u = update((40, 90, 5));
        u.inventory = vec!["rusty key".into()];
        assert!(!store.apply(&u).unwrap().can_heal);
    }

    #[test]
    fn advisory_flags_on_the_update_are_ignored() {
        let mut store = store();
        let mut u = update((90, 90, 5));
        u.in_combat = true;
        u.can_rest = true;
        u.can_heal = true;
        let state = store.apply(&u).unwrap();
        assert!(!state.can_rest);
        assert!(!state.can_heal);
    }

    #[test]
    fn reset_only_after_the_session_ends() {
        let mut store = store();
        assert_eq!(store.reset().unwrap_err(), ApplyError::SessionActive);

        store.apply(&update((0, 50, 10))).unwrap();
        let state = store.reset().unwrap();
        assert_eq!(state, PlayerState::default());
    }
}
