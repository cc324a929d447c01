//! One game turn: gate checks, model call, validate/repair, atomic apply.
//!
//! The engine is an explicit state machine with a single entry point,
//! [`TurnEngine::submit_action`]. Gates are checked before the model
//! collaborator is invoked so a blocked action never wastes a call, and
//! every error path leaves the store untouched.

use crate::config::EngineConfig;
use crate::engine::image_client::ImageClient;
use crate::engine::llm_client::{ModelClient, TurnContext};
use crate::engine::repair::{RepairFailure, RepairHook};
use crate::engine::store::PlayerStateStore;
use crate::engine::validator;
use crate::error::{ApplyError, Gate, TurnError, ValidationError};
use crate::model::catalog::SessionParameters;
use crate::model::message::Message;
use crate::model::player_state::{PlayerState, SessionStatus};
use crate::model::update::CandidateUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingInput,
    AwaitingModel,
    Validating,
    Applying,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Free-form input or one of the offered options.
    Free,
    /// Gated on `can_rest`; the only action accepted at 0 energy.
    Rest,
    /// Gated on `can_heal`.
    Heal,
}

/// What the player wants to do this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAction {
    pub kind: ActionKind,
    pub text: String,
}

impl PlayerAction {
    pub fn say(text: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Free,
            text: text.into(),
        }
    }

    pub fn rest() -> Self {
        Self {
            kind: ActionKind::Rest,
            text: "Rest and recover.".into(),
        }
    }

    pub fn heal() -> Self {
        Self {
            kind: ActionKind::Heal,
            text: "Use a healing item.".into(),
        }
    }
}

/// Per-turn event handed to the presentation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEvent {
    pub player_message: String,
    pub inventory: Vec<String>,
    /// (health, energy, gold).
    pub stats: (i32, i32, i32),
    pub action_options: Vec<String>,
    pub can_rest: bool,
    pub can_heal: bool,
    pub status: SessionStatus,
    pub turn_number: u32,
}

impl TurnEvent {
    fn new(player_message: String, state: &PlayerState) -> Self {
        Self {
            player_message,
            inventory: state.inventory.clone(),
            stats: state.stats(),
            action_options: state.action_options.clone(),
            can_rest: state.can_rest,
            can_heal: state.can_heal,
            status: state.status,
            turn_number: state.turn_number,
        }
    }
}

pub struct TurnEngine {
    parameters: SessionParameters,
    store: PlayerStateStore,
    repair: RepairHook,
    model: Box<dyn ModelClient + Send>,
    image: Box<dyn ImageClient + Send>,
    messages: Vec<Message>,
    phase: TurnPhase,
}

impl TurnEngine {
    pub fn new(
        parameters: SessionParameters,
        model: Box<dyn ModelClient + Send>,
        image: Box<dyn ImageClient + Send>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            parameters,
            store: PlayerStateStore::new(&config.healing_keywords),
            repair: RepairHook::new(config.repair),
            model,
            image,
            messages: Vec::new(),
            phase: TurnPhase::AwaitingInput,
        }
    }

    /// Rebuilds an engine from a saved snapshot and transcript.
    pub fn restore(
        parameters: SessionParameters,
        state: PlayerState,
        messages: Vec<Message>,
        model: Box<dyn ModelClient + Send>,
        image: Box<dyn ImageClient + Send>,
        config: &EngineConfig,
    ) -> Self {
        let phase = if state.status.is_terminal() {
            TurnPhase::Terminal
        } else {
            TurnPhase::AwaitingInput
        };
        Self {
            parameters,
            store: PlayerStateStore::restore(state, &config.healing_keywords),
            repair: RepairHook::new(config.repair),
            model,
            image,
            messages,
            phase,
        }
    }

    pub fn state(&self) -> &PlayerState {
        self.store.current()
    }

    pub fn parameters(&self) -> &SessionParameters {
        &self.parameters
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Runs one full turn. On any error the store and turn number are
    /// unchanged and the engine returns to `AwaitingInput`, so the player
    /// may simply resubmit.
    pub fn submit_action(&mut self, action: PlayerAction) -> Result<TurnEvent, TurnError> {
        self.check_gates(&action)?;

        self.phase = TurnPhase::AwaitingModel;
        let result = self.run_turn(&action);
        self.phase = match &result {
            Ok(event) if event.status.is_terminal() => TurnPhase::Terminal,
            _ => TurnPhase::AwaitingInput,
        };
        result
    }

    /// Restarts a finished session with the same frozen parameters.
    pub fn reset(&mut self) -> Result<PlayerState, ApplyError> {
        let state = self.store.reset()?;
        self.messages.clear();
        self.phase = TurnPhase::AwaitingInput;
        tracing::info!("session reset to defaults");
        Ok(state)
    }

    /// Preconditions checked before the model collaborator is invoked.
    fn check_gates(&self, action: &PlayerAction) -> Result<(), TurnError> {
        let state = self.store.current();
        if state.status.is_terminal() {
            return Err(TurnError::InvalidTransition);
        }
        if state.energy == 0 && action.kind != ActionKind::Rest {
            return Err(TurnError::GateViolation(Gate::Exhausted));
        }
        match action.kind {
            ActionKind::Rest if !state.can_rest => Err(TurnError::GateViolation(Gate::Rest)),
            ActionKind::Heal if !state.can_heal => Err(TurnError::GateViolation(Gate::Heal)),
            _ => Ok(()),
        }
    }

    fn run_turn(&mut self, action: &PlayerAction) -> Result<TurnEvent, TurnError> {
        let raw = {
            let ctx = self.context(&action.text);
            self.model.invoke(&ctx).map_err(|e| {
                tracing::error!(error = %e, "model collaborator unavailable");
                TurnError::ModelUnavailable(e)
            })?
        };

        self.phase = TurnPhase::Validating;
        let update = match validator::validate_text(&raw) {
            Ok(update) => update,
            Err(errors) => {
                tracing::warn!(%errors, "model output failed validation, invoking repair hook");
                let ctx = self.context(&action.text);
                match self.repair.repair(self.model.as_ref(), &ctx, &raw, &errors) {
                    Ok(update) => update,
                    Err(RepairFailure::Validation(errors)) => {
                        return Err(TurnError::InvalidModelOutput(errors));
                    }
                    Err(RepairFailure::Model(e)) => {
                        return Err(TurnError::ModelUnavailable(e));
                    }
                }
            }
        };

        self.phase = TurnPhase::Applying;
        let state = self.store.apply(&update).map_err(|e| match e {
            ApplyError::InvalidTransition => TurnError::InvalidTransition,
            other => TurnError::InvalidModelOutput(ValidationError::single(
                "action_options",
                other.to_string(),
            )),
        })?;

        self.messages.push(Message::Player(action.text.clone()));
        self.messages
            .push(Message::Narrator(update.player_message.clone()));

        self.dispatch_image(&update);

        tracing::info!(
            turn = state.turn_number,
            status = ?state.status,
            "turn applied"
        );
        Ok(TurnEvent::new(update.player_message, &state))
    }

    /// Fire-and-forget: dispatched only after a successful apply, and its
    /// outcome cannot touch game state.
    fn dispatch_image(&self, update: &CandidateUpdate) {
        if update.generate_image {
            self.image.request_image(&update.image_prompt);
        }
    }

    fn context<'a>(&'a self, player_input: &'a str) -> TurnContext<'a> {
        TurnContext {
            parameters: &self.parameters,
            state: self.store.current(),
            history: &self.messages,
            player_input,
        }
    }
}
