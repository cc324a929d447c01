//! One-shot repair of model output that failed validation.
//!
//! The hook runs exactly once per turn, after the first validation failure.
//! It never loops: whatever the single attempt yields is re-validated and
//! the result is final.

use serde_json::Value;

use crate::engine::llm_client::{ModelClient, TurnContext};
use crate::engine::validator;
use crate::error::{ModelError, ValidationError};
use crate::model::player_state::STAT_MAX;
use crate::model::update::CandidateUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStrategy {
    /// Ask the model collaborator to re-derive the payload, feeding the
    /// error list back as part of the prompt.
    Reprompt,
    /// Fix what can be fixed mechanically: strip markdown code fences,
    /// clamp out-of-range stats, drop store-owned keys. Missing or
    /// mistyped fields are never fabricated.
    Coerce,
}

impl Default for RepairStrategy {
    fn default() -> Self {
        RepairStrategy::Reprompt
    }
}

/// Why the repair attempt did not produce a usable update.
#[derive(Debug)]
pub enum RepairFailure {
    Model(ModelError),
    Validation(ValidationError),
}

#[derive(Debug, Clone, Copy)]
pub struct RepairHook {
    strategy: RepairStrategy,
}

impl RepairHook {
    pub fn new(strategy: RepairStrategy) -> Self {
        Self { strategy }
    }

    pub fn repair(
        &self,
        model: &dyn ModelClient,
        ctx: &TurnContext<'_>,
        raw: &str,
        errors: &ValidationError,
    ) -> Result<CandidateUpdate, RepairFailure> {
        tracing::debug!(strategy = ?self.strategy, "attempting payload repair");
        match self.strategy {
            RepairStrategy::Reprompt => {
                let retry = model
                    .repair_request(ctx, raw, errors)
                    .map_err(RepairFailure::Model)?;
                validator::validate_text(&retry).map_err(RepairFailure::Validation)
            }
            RepairStrategy::Coerce => coerce(raw).map_err(RepairFailure::Validation),
        }
    }
}

fn coerce(raw: &str) -> Result<CandidateUpdate, ValidationError> {
    let stripped = strip_code_fences(raw.trim());
    let mut value: Value = serde_json::from_str(stripped)
        .map_err(|e| ValidationError::single("payload", format!("not valid JSON: {e}")))?;

    if let Some(obj) = value.as_object_mut() {
        obj.remove("turn_number");
        obj.remove("status");
        if let Some(Value::Array(stats)) = obj.get_mut("player_stats") {
            clamp_stat(stats, 0, 0, STAT_MAX);
            clamp_stat(stats, 1, 0, STAT_MAX);
            clamp_stat(stats, 2, 0, i32::MAX);
        }
    }

    validator::validate_value(&value)
}

fn clamp_stat(stats: &mut [Value], index: usize, min: i32, max: i32) {
    if let Some(n) = stats.get(index).and_then(Value::as_i64) {
        let clamped = n.clamp(i64::from(min), i64::from(max)) as i32;
        stats[index] = Value::from(clamped);
    }
}

/// Models often wrap JSON in a ```json fence despite the instructions.
fn strip_code_fences(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
