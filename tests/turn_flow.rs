//! End-to-end turn flow against scripted collaborator stubs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use questloom::config::EngineConfig;
use questloom::engine::image_client::ImageClient;
use questloom::engine::llm_client::{ModelClient, TurnContext};
use questloom::engine::session::{Session, SessionHandle};
use questloom::engine::turn::PlayerAction;
use questloom::error::{Gate, ModelError, TurnError, ValidationError};
use questloom::model::catalog::SessionParameters;
use questloom::model::player_state::SessionStatus;

/// Plays back a fixed script of model replies and counts every call.
struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    repair_replies: Mutex<VecDeque<String>>,
    invokes: AtomicUsize,
    repairs: AtomicUsize,
}

impl ScriptedModel {
    fn new(replies: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            repair_replies: Mutex::new(VecDeque::new()),
            invokes: AtomicUsize::new(0),
            repairs: AtomicUsize::new(0),
        })
    }

    fn with_repair(self: Arc<Self>, replies: Vec<&str>) -> Arc<Self> {
        *self.repair_replies.lock().unwrap() =
            replies.into_iter().map(str::to_string).collect();
        self
    }
}

/// Local wrapper so the `ModelClient` impl satisfies the orphan rule;
/// `Arc` is not a fundamental type, so `impl ModelClient for Arc<_>` is
/// rejected in an integration-test crate.
struct SharedModel(Arc<ScriptedModel>);

impl ModelClient for SharedModel {
    fn invoke(&self, _ctx: &TurnContext<'_>) -> Result<String, ModelError> {
        self.0.invokes.fetch_add(1, Ordering::SeqCst);
        self.0
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::Malformed("script exhausted".into()))
    }

    fn repair_request(
        &self,
        _ctx: &TurnContext<'_>,
        _raw: &str,
        _errors: &ValidationError,
    ) -> Result<String, ModelError> {
        self.0.repairs.fetch_add(1, Ordering::SeqCst);
        self.0
            .repair_replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::Malformed("repair script exhausted".into()))
    }
}

/// Blocks every invoke until the test releases it, to hold a turn open.
struct BlockingModel {
    release: Mutex<Receiver<()>>,
    reply: String,
}

impl ModelClient for BlockingModel {
    fn invoke(&self, _ctx: &TurnContext<'_>) -> Result<String, ModelError> {
        self.release.lock().unwrap().recv().ok();
        Ok(self.reply.clone())
    }

    fn repair_request(
        &self,
        _ctx: &TurnContext<'_>,
        _raw: &str,
        _errors: &ValidationError,
    ) -> Result<String, ModelError> {
        Err(ModelError::Malformed("unexpected repair".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingImage {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ImageClient for RecordingImage {
    fn request_image(&self, prompt: &str) {
        self.prompts.lock().unwrap().push(prompt.to_string());
    }
}

fn start_session(model: Arc<ScriptedModel>) -> (SessionHandle, RecordingImage) {
    let image = RecordingImage::default();
    let handle = Session::create(
        SessionParameters::default(),
        Box::new(SharedModel(model)),
        Box::new(image.clone()),
        &EngineConfig::default(),
    );
    (handle, image)
}

const DAGGER_TURN: &str = r#"{
    "player_message": "You pick up a dagger as a bandit closes in.",
    "inventory": ["dagger"],
    "player_stats": [100, 90, 10],
    "action_options": ["Fight", "Flee", "Hide"],
    "can_rest": false,
    "can_heal": false,
    "generate_image": false,
    "image_prompt": "",
    "in_combat": true,
    "quest_complete": false
}"#;

#[test]
fn first_turn_applies_the_dagger_update() {
    let model = ScriptedModel::new(vec![DAGGER_TURN]);
    let (session, _image) = start_session(model.clone());

    let event = session
        .submit_action(PlayerAction::say("scavenge the battlefield"))
        .unwrap();

    assert_eq!(event.stats, (100, 90, 10));
    assert_eq!(event.inventory, vec!["dagger".to_string()]);
    assert_eq!(event.turn_number, 1);
    assert_eq!(event.status, SessionStatus::Active);
    assert!(!event.can_rest);
    assert_eq!(model.invokes.load(Ordering::SeqCst), 1);
}

#[test]
fn rest_in_combat_is_gated_before_any_model_call() {
    let model = ScriptedModel::new(vec![DAGGER_TURN]);
    let (session, _image) = start_session(model.clone());

    session.submit_action(PlayerAction::say("fight")).unwrap();
    assert_eq!(model.invokes.load(Ordering::SeqCst), 1);

    let err = session.submit_action(PlayerAction::rest()).unwrap_err();
    assert!(matches!(err, TurnError::GateViolation(Gate::Rest)));
    // The collaborator was never consulted for the gated action.
    assert_eq!(model.invokes.load(Ordering::SeqCst), 1);
    assert_eq!(session.state().turn_number, 1);
}

#[test]
fn lethal_update_ends_the_session_idempotently() {
    let lethal = r#"{
        "player_message": "The blow lands true.",
        "inventory": [],
        "player_stats": [0, 40, 10],
        "action_options": [],
        "can_rest": false,
        "can_heal": false,
        "generate_image": false,
        "image_prompt": ""
    }"#;
    let model = ScriptedModel::new(vec![lethal]);
    let (session, _image) = start_session(model.clone());

    let event = session.submit_action(PlayerAction::say("charge")).unwrap();
    assert_eq!(event.status, SessionStatus::Lost);
    assert_eq!(event.turn_number, 1);
    assert!(event.action_options.is_empty());

    for _ in 0..3 {
        let err = session
            .submit_action(PlayerAction::say("get up"))
            .unwrap_err();
        assert!(matches!(err, TurnError::InvalidTransition));
        assert_eq!(session.state().turn_number, 1);
    }
    assert_eq!(model.invokes.load(Ordering::SeqCst), 1);
}

#[test]
fn repair_runs_once_then_the_turn_fails_cleanly() {
    let missing_options = r#"{
        "player_message": "Something stirs.",
        "inventory": [],
        "player_stats": [90, 80, 0],
        "can_rest": true,
        "can_heal": false,
        "generate_image": false,
        "image_prompt": ""
    }"#;
    let model = ScriptedModel::new(vec![missing_options])
        .with_repair(vec![missing_options]);
    let (session, _image) = start_session(model.clone());

    let err = session.submit_action(PlayerAction::say("listen")).unwrap_err();
    match err {
        TurnError::InvalidModelOutput(errors) => assert!(errors.mentions("action_options")),
        other => panic!("expected InvalidModelOutput, got {other:?}"),
    }
    assert_eq!(model.repairs.load(Ordering::SeqCst), 1);
    assert_eq!(session.state().turn_number, 0);
    assert_eq!(session.state().status, SessionStatus::Active);
}

#[test]
fn repair_can_rescue_a_fenced_payload() {
    let fenced = format!("```json\n{DAGGER_TURN}\n```");
    let model = ScriptedModel::new(vec![fenced.as_str()]).with_repair(vec![DAGGER_TURN]);
    let (session, _image) = start_session(model.clone());

    let event = session.submit_action(PlayerAction::say("look")).unwrap();
    assert_eq!(event.turn_number, 1);
    assert_eq!(model.repairs.load(Ordering::SeqCst), 1);
}

#[test]
fn winning_turn_dispatches_the_image_request() {
    let victory = r#"{
        "player_message": "The artifact is yours. The curse lifts.",
        "inventory": ["artifact"],
        "player_stats": [70, 40, 150],
        "action_options": [],
        "can_rest": false,
        "can_heal": false,
        "generate_image": true,
        "image_prompt": "a glowing artifact held aloft",
        "quest_complete": true
    }"#;
    let model = ScriptedModel::new(vec![victory]);
    let (session, image) = start_session(model);

    let event = session
        .submit_action(PlayerAction::say("seize the artifact"))
        .unwrap();
    assert_eq!(event.status, SessionStatus::Won);
    assert_eq!(
        image.prompts.lock().unwrap().as_slice(),
        ["a glowing artifact held aloft"]
    );

    let final_state = session.end();
    assert_eq!(final_state.status, SessionStatus::Won);
    assert_eq!(final_state.turn_number, 1);
}

#[test]
fn concurrent_submission_is_rejected_not_queued() {
    let (release_tx, release_rx): (Sender<()>, Receiver<()>) = channel();
    let model = BlockingModel {
        release: Mutex::new(release_rx),
        reply: DAGGER_TURN.to_string(),
    };
    let image = RecordingImage::default();
    let session = Arc::new(Session::create(
        SessionParameters::default(),
        Box::new(model),
        Box::new(image),
        &EngineConfig::default(),
    ));

    let first = {
        let session = Arc::clone(&session);
        thread::spawn(move || session.submit_action(PlayerAction::say("explore")))
    };

    // Wait until the first turn is parked inside the model call, then make
    // sure a second submission bounces instead of queueing.
    thread::sleep(Duration::from_millis(50));
    let err = session.submit_action(PlayerAction::say("also explore"));
    assert!(matches!(err, Err(TurnError::TurnInProgress)));

    release_tx.send(()).unwrap();
    let event = first.join().unwrap().unwrap();
    assert_eq!(event.turn_number, 1);
    assert_eq!(session.state().turn_number, 1);
}

#[test]
fn reset_replays_a_finished_session_from_defaults() {
    let lethal = r#"{
        "player_message": "Darkness takes you.",
        "inventory": [],
        "player_stats": [0, 0, 0],
        "action_options": [],
        "can_rest": false,
        "can_heal": false,
        "generate_image": false,
        "image_prompt": ""
    }"#;
    let model = ScriptedModel::new(vec![lethal, DAGGER_TURN]);
    let (session, _image) = start_session(model);

    assert!(session.reset().is_err());
    session.submit_action(PlayerAction::say("fall")).unwrap();

    let state = session.reset().unwrap();
    assert_eq!(state.turn_number, 0);
    assert_eq!(state.stats(), (100, 100, 0));

    // The reset session plays on with the same frozen parameters.
    let event = session.submit_action(PlayerAction::say("try again")).unwrap();
    assert_eq!(event.turn_number, 1);
    assert_eq!(event.status, SessionStatus::Active);
}
