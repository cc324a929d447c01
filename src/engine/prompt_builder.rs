//! Builds the full prompt sent to the model collaborator.
//! This module is intentionally dumb: it only formats text.
//! No parsing, no networking, no engine logic.

use crate::engine::llm_client::TurnContext;
use crate::error::ValidationError;
use crate::model::message::Message;

/// Only the tail of the transcript is replayed; older turns are already
/// reflected in the state snapshot.
const HISTORY_WINDOW: usize = 20;

/// Prompt for a regular turn.
pub fn build_turn_prompt(ctx: &TurnContext<'_>) -> String {
    let mut prompt = String::new();

    push_system_brief(&mut prompt, ctx);
    push_format_instructions(&mut prompt);
    push_state_section(&mut prompt, ctx);
    push_history_section(&mut prompt, ctx.history);
    push_player_action(&mut prompt, ctx.player_input);

    prompt
}

/// Prompt for the single repair attempt after a validation failure. The
/// previous reply and the full error list are appended as feedback.
pub fn build_repair_prompt(ctx: &TurnContext<'_>, raw: &str, errors: &ValidationError) -> String {
    let mut prompt = String::new();

    push_system_brief(&mut prompt, ctx);
    push_format_instructions(&mut prompt);
    push_state_section(&mut prompt, ctx);

    prompt.push_str("Your previous reply could not be accepted.\n\nPREVIOUS REPLY:\n");
    prompt.push_str(raw);
    prompt.push_str("\n\nPROBLEMS:\n");
    for error in &errors.errors {
        prompt.push_str("- ");
        prompt.push_str(&error.field);
        prompt.push_str(": ");
        prompt.push_str(&error.reason);
        prompt.push('\n');
    }
    prompt.push_str("\nReturn a corrected JSON object and nothing else.\n");

    push_player_action(&mut prompt, ctx.player_input);

    prompt
}

fn push_system_brief(prompt: &mut String, ctx: &TurnContext<'_>) {
    let p = ctx.parameters;
    prompt.push_str(
        "You are a text-based game master leading the player through a \
         procedurally generated adventure.\n\n",
    );
    prompt.push_str("The player has selected the following options:\n");
    prompt.push_str(&format!("    - History: {}\n", p.history));
    prompt.push_str(&format!("    - Trait: {}\n", p.character_trait));
    prompt.push_str(&format!("    - Location: {}\n", p.location));
    prompt.push_str(&format!("    - Goal: {}\n", p.goal));
    prompt.push_str(&format!("    - Item: {}\n\n", p.item));

    prompt.push_str(
        "The player is prompted with a quest early on. The game ends when the \
         quest is complete (set quest_complete) or when health reaches 0.\n\
         Always offer exactly 3 action options, procedurally generated from \
         the character, location, items, and situation.\n\
         The player can also rest or heal when possible: resting is not \
         possible in combat (set in_combat accordingly), healing requires an \
         injury and a healing item in the inventory.\n\
         Track health, energy, and gold between 0 and 100 (gold has no \
         ceiling). Do not print the stats in player_message; report them in \
         player_stats.\n\
         If the player's energy reaches 0 they must rest before acting; if \
         gold reaches 0 they cannot purchase items.\n\
         In exciting situations set generate_image and describe the scene in \
         image_prompt using only visual elements already present in \
         player_message",
    );
    prompt.push_str(&format!(
        ", rendered in a {} style with {} tones, featuring {} against a {} backdrop.\n\n",
        p.style, p.color, p.character, p.background
    ));
}

fn push_format_instructions(prompt: &mut String) {
    prompt.push_str(
        "Respond with a single JSON object and nothing else. Fields:\n\
         - player_message (string): message that the player will see\n\
         - inventory (array of strings): full list of items in the player's inventory\n\
         - player_stats (array of 3 integers): the player's stats (health, energy, gold)\n\
         - action_options (array of 3 strings): the player's action options in order\n\
         - can_rest (boolean): whether the player can rest at the moment\n\
         - can_heal (boolean): whether the player can heal at the moment\n\
         - generate_image (boolean): whether to generate an image of the game state\n\
         - image_prompt (string): prompt to generate the image of the game state\n\
         - in_combat (boolean): whether the player is currently in combat\n\
         - quest_complete (boolean): whether the quest has just been completed\n\n",
    );
}

fn push_state_section(prompt: &mut String, ctx: &TurnContext<'_>) {
    let state = ctx.state;
    prompt.push_str("CURRENT STATE:\n");
    prompt.push_str(&format!(
        "    Turn {} | Health {} | Energy {} | Gold {}\n",
        state.turn_number, state.health, state.energy, state.gold
    ));
    if state.inventory.is_empty() {
        prompt.push_str("    Inventory: (empty)\n\n");
    } else {
        prompt.push_str(&format!("    Inventory: {}\n\n", state.inventory.join(", ")));
    }
}

fn push_history_section(prompt: &mut String, history: &[Message]) {
    if history.is_empty() {
        return;
    }
    prompt.push_str("RECENT HISTORY:\n");
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for message in &history[start..] {
        prompt.push_str(&format!("[{}] {}\n", message.role(), message.text()));
    }
    prompt.push('\n');
}

fn push_player_action(prompt: &mut String, input: &str) {
    prompt.push_str("PLAYER ACTION:\n");
    prompt.push_str(input);
    prompt.push('\n');
}
