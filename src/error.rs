use std::fmt;

/// A single violated field reported by the schema validator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every violation found in a candidate payload, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn single(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                reason: reason.into(),
            }],
        }
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

/// Failures while talking to the model collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model returned an unusable response: {0}")]
    Malformed(String),
}

/// A precondition that blocked an action before any model call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Energy is 0; only a rest action is accepted.
    Exhausted,
    /// A rest action was submitted while `can_rest` is false.
    Rest,
    /// A heal action was submitted while `can_heal` is false.
    Heal,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Exhausted => write!(f, "energy is exhausted, only resting is possible"),
            Gate::Rest => write!(f, "resting is not currently possible"),
            Gate::Heal => write!(f, "healing is not currently possible"),
        }
    }
}

/// Errors surfaced by one turn of the session engine.
///
/// Every recoverable variant leaves `PlayerState` and its turn number
/// untouched; the caller may resubmit.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("model collaborator unavailable: {0}")]
    ModelUnavailable(#[source] ModelError),

    #[error("model output failed validation after repair: {0}")]
    InvalidModelOutput(ValidationError),

    #[error("session is not active")]
    InvalidTransition,

    #[error("a turn is already in progress for this session")]
    TurnInProgress,

    #[error("gate violation: {0}")]
    GateViolation(Gate),
}

/// Errors from the player state store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("update applied to a session that is no longer active")]
    InvalidTransition,

    #[error("reset is only allowed once the session has finished")]
    SessionActive,

    #[error("an active update must carry exactly 3 action options, got {0}")]
    OptionCount(usize),
}

/// Errors while persisting or restoring a session.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save file format version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
}
