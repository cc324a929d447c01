//! Session lifecycle: creation, strict turn serialization, reset, teardown.
//!
//! One session is one playthrough. The handle wraps the engine in a mutex
//! and submits turns through `try_lock`, so a second submission while a
//! turn is running fails fast with [`TurnError::TurnInProgress`] instead of
//! queueing behind the first. Independent sessions share nothing and run
//! concurrently without coordination.

use std::sync::{Arc, Mutex, TryLockError};

use crate::config::EngineConfig;
use crate::engine::image_client::ImageClient;
use crate::engine::llm_client::ModelClient;
use crate::engine::turn::{PlayerAction, TurnEngine, TurnEvent};
use crate::error::{ApplyError, TurnError};
use crate::model::catalog::SessionParameters;
use crate::model::player_state::PlayerState;
use crate::model::save::SessionSave;

pub struct Session {
    engine: TurnEngine,
}

impl Session {
    /// Starts a session, freezing the player's category selections for its
    /// whole lifetime.
    pub fn create(
        parameters: SessionParameters,
        model: Box<dyn ModelClient + Send>,
        image: Box<dyn ImageClient + Send>,
        config: &EngineConfig,
    ) -> SessionHandle {
        tracing::info!(goal = %parameters.goal, "session created");
        SessionHandle {
            inner: Arc::new(Mutex::new(Session {
                engine: TurnEngine::new(parameters, model, image, config),
            })),
        }
    }

    /// Resumes a previously saved session.
    pub fn restore(
        save: SessionSave,
        model: Box<dyn ModelClient + Send>,
        image: Box<dyn ImageClient + Send>,
        config: &EngineConfig,
    ) -> SessionHandle {
        tracing::info!(turn = save.state.turn_number, "session restored");
        SessionHandle {
            inner: Arc::new(Mutex::new(Session {
                engine: TurnEngine::restore(
                    save.parameters,
                    save.state,
                    save.messages,
                    model,
                    image,
                    config,
                ),
            })),
        }
    }
}

pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    /// Submits one turn. Fails with [`TurnError::TurnInProgress`] if
    /// another submission for this session is still running.
    pub fn submit_action(&self, action: PlayerAction) -> Result<TurnEvent, TurnError> {
        let mut session = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(TurnError::TurnInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        session.engine.submit_action(action)
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> PlayerState {
        self.lock().engine.state().clone()
    }

    pub fn parameters(&self) -> SessionParameters {
        self.lock().engine.parameters().clone()
    }

    /// Restarts a finished session with the same frozen parameters.
    pub fn reset(&self) -> Result<PlayerState, ApplyError> {
        self.lock().engine.reset()
    }

    /// Snapshot for persistence.
    pub fn to_save(&self) -> SessionSave {
        let session = self.lock();
        SessionSave::new(
            session.engine.parameters().clone(),
            session.engine.state().clone(),
            session.engine.messages().to_vec(),
        )
    }

    /// Ends the session and returns the final state. Consuming the handle
    /// is what makes "no further calls" hold: there is nothing left to
    /// call them on.
    pub fn end(self) -> PlayerState {
        let state = self.lock().engine.state().clone();
        tracing::info!(turn = state.turn_number, status = ?state.status, "session ended");
        state
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
