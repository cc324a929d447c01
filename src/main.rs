use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use questloom::config;
use questloom::engine::image_client::{HttpImageClient, ImageEvent};
use questloom::engine::llm_client::LmStudioClient;
use questloom::engine::session::Session;
use questloom::engine::turn::PlayerAction;
use questloom::error::TurnError;
use questloom::model::catalog::SessionParameters;
use questloom::model::player_state::SessionStatus;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = config::load_config();
    let parameters = SessionParameters::random(&mut rand::thread_rng());

    let model = LmStudioClient::new(&config.model)?;
    match model.test_connection() {
        Ok(status) => println!("{status}"),
        Err(e) => println!("Warning: model endpoint probe failed ({e})"),
    }

    let (image_tx, image_rx) = mpsc::channel();
    let image = HttpImageClient::new(&config.image, image_tx);

    println!("Your adventure:");
    println!("  History:  {}", parameters.history);
    println!("  Trait:    {}", parameters.character_trait);
    println!("  Location: {}", parameters.location);
    println!("  Goal:     {}", parameters.goal);
    println!("  Item:     {}", parameters.item);
    println!();
    println!("Type an action, or /rest, /heal, /quit.");

    let session = Session::create(parameters, Box::new(model), Box::new(image), &config);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let action = match input {
            "/quit" => break,
            "/rest" => PlayerAction::rest(),
            "/heal" => PlayerAction::heal(),
            other => PlayerAction::say(other),
        };

        match session.submit_action(action) {
            Ok(event) => {
                println!("\n{}\n", event.player_message);
                let (health, energy, gold) = event.stats;
                println!("Health {health} | Energy {energy} | Gold {gold}");
                if !event.inventory.is_empty() {
                    println!("Inventory: {}", event.inventory.join(", "));
                }
                for (index, option) in event.action_options.iter().enumerate() {
                    println!("  {}. {option}", index + 1);
                }
                match event.status {
                    SessionStatus::Won => {
                        println!("\nQuest complete. You win!");
                        break;
                    }
                    SessionStatus::Lost => {
                        println!("\nYou have fallen. Game over.");
                        break;
                    }
                    SessionStatus::Active => {}
                }
            }
            Err(TurnError::GateViolation(gate)) => println!("Not possible: {gate}"),
            Err(e) => println!("Turn failed: {e}"),
        }

        // Surface any image results that finished in the background.
        while let Ok(event) = image_rx.try_recv() {
            match event {
                ImageEvent::Ready { url, .. } => println!("[image ready: {url}]"),
                ImageEvent::Failed { reason, .. } => println!("[image failed: {reason}]"),
            }
        }
    }

    let final_state = session.end();
    println!(
        "Session over after {} turn(s), status {:?}.",
        final_state.turn_number, final_state.status
    );
    Ok(())
}
