//! Schema validation for candidate updates.
//!
//! The validator is a pure function over the raw model output: no side
//! effects, no I/O. Unlike a plain serde decode it keeps walking after the
//! first problem so that [`ValidationError`] names every violated field —
//! the repair hook forwards the whole list to the model as feedback.

use serde_json::{Map, Value};

use crate::error::{FieldError, ValidationError};
use crate::model::player_state::{ACTION_OPTION_COUNT, STAT_MAX};
use crate::model::update::CandidateUpdate;

/// Keys the store owns; a candidate carrying them is rejected outright.
const STORE_OWNED_KEYS: &[&str] = &["turn_number", "status"];

/// Validates the raw text returned by the model collaborator.
pub fn validate_text(raw: &str) -> Result<CandidateUpdate, ValidationError> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| ValidationError::single("payload", format!("not valid JSON: {e}")))?;
    validate_value(&value)
}

/// Validates an already-parsed payload against the update contract.
pub fn validate_value(value: &Value) -> Result<CandidateUpdate, ValidationError> {
    let Some(obj) = value.as_object() else {
        return Err(ValidationError::single(
            "payload",
            "expected a JSON object",
        ));
    };

    let mut errors = Vec::new();

    for key in STORE_OWNED_KEYS {
        if obj.contains_key(*key) {
            push(&mut errors, key, "field is store-owned and must not be set");
        }
    }

    let player_message = expect_string(obj, "player_message", &mut errors);
    let inventory = expect_string_array(obj, "inventory", &mut errors);
    let player_stats = expect_stats(obj, &mut errors);
    let action_options = expect_string_array(obj, "action_options", &mut errors);
    let can_rest = expect_bool(obj, "can_rest", &mut errors);
    let can_heal = expect_bool(obj, "can_heal", &mut errors);
    let generate_image = expect_bool(obj, "generate_image", &mut errors);
    let image_prompt = expect_string(obj, "image_prompt", &mut errors);
    let in_combat = optional_bool(obj, "in_combat", &mut errors);
    let quest_complete = optional_bool(obj, "quest_complete", &mut errors);

    // The 3-option rule only binds payloads that keep the session active.
    let signals_terminal =
        matches!(player_stats, Some((health, _, _)) if health <= 0) || quest_complete;
    if let Some(options) = &action_options {
        if !signals_terminal && options.len() != ACTION_OPTION_COUNT {
            push(
                &mut errors,
                "action_options",
                format!(
                    "expected exactly {ACTION_OPTION_COUNT} options, got {}",
                    options.len()
                ),
            );
        }
        if options.iter().any(|o| o.trim().is_empty()) {
            push(&mut errors, "action_options", "options must not be empty");
        }
    }

    if generate_image == Some(true) {
        if let Some(prompt) = &image_prompt {
            if prompt.trim().is_empty() {
                push(
                    &mut errors,
                    "image_prompt",
                    "must not be empty when generate_image is set",
                );
            }
        }
    }

    if !errors.is_empty() {
        return Err(ValidationError { errors });
    }

    Ok(CandidateUpdate {
        player_message: player_message.unwrap_or_default(),
        inventory: inventory.unwrap_or_default(),
        player_stats: player_stats.unwrap_or_default(),
        action_options: action_options.unwrap_or_default(),
        can_rest: can_rest.unwrap_or_default(),
        can_heal: can_heal.unwrap_or_default(),
        generate_image: generate_image.unwrap_or_default(),
        image_prompt: image_prompt.unwrap_or_default(),
        in_combat,
        quest_complete,
    })
}

fn push(errors: &mut Vec<FieldError>, field: &str, reason: impl Into<String>) {
    errors.push(FieldError {
        field: field.to_string(),
        reason: reason.into(),
    });
}

fn expect_string(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            push(errors, field, format!("expected a string, got {}", kind(other)));
            None
        }
        None => {
            push(errors, field, "missing");
            None
        }
    }
}

fn expect_bool(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    match obj.get(field) {
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            push(errors, field, format!("expected a boolean, got {}", kind(other)));
            None
        }
        None => {
            push(errors, field, "missing");
            None
        }
    }
}

fn optional_bool(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> bool {
    match obj.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            push(errors, field, format!("expected a boolean, got {}", kind(other)));
            false
        }
        None => false,
    }
}

fn expect_string_array(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        push(
                            errors,
                            field,
                            format!("entry {index}: expected a string, got {}", kind(other)),
                        );
                        return None;
                    }
                }
            }
            Some(out)
        }
        Some(other) => {
            push(errors, field, format!("expected an array, got {}", kind(other)));
            None
        }
        None => {
            push(errors, field, "missing");
            None
        }
    }
}

/// `player_stats` is a (health, energy, gold) tuple encoded as a 3-element
/// JSON array. Health and energy must land in 0..=100, gold must be >= 0.
fn expect_stats(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<(i32, i32, i32)> {
    let field = "player_stats";
    let items = match obj.get(field) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            push(errors, field, format!("expected an array, got {}", kind(other)));
            return None;
        }
        None => {
            push(errors, field, "missing");
            return None;
        }
    };

    if items.len() != 3 {
        push(
            errors,
            field,
            format!("expected [health, energy, gold], got {} entries", items.len()),
        );
        return None;
    }

    let mut stats = [0i32; 3];
    for (index, item) in items.iter().enumerate() {
        match item.as_i64() {
            Some(n) if i32::try_from(n).is_ok() => stats[index] = n as i32,
            _ => {
                push(
                    errors,
                    field,
                    format!("entry {index}: expected an integer, got {}", kind(item)),
                );
                return None;
            }
        }
    }

    let [health, energy, gold] = stats;
    if !(0..=STAT_MAX).contains(&health) {
        push(errors, field, format!("health {health} outside 0..={STAT_MAX}"));
    }
    if !(0..=STAT_MAX).contains(&energy) {
        push(errors, field, format!("energy {energy} outside 0..={STAT_MAX}"));
    }
    if gold < 0 {
        push(errors, field, format!("gold {gold} must not be negative"));
    }
    Some((health, energy, gold))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
