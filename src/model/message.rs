use serde::{Deserialize, Serialize};

/// One entry of a session's transcript. The transcript is replayed to the
/// model collaborator as conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Player(String),
    Narrator(String),
    System(String),
}

impl Message {
    pub fn text(&self) -> &str {
        match self {
            Message::Player(text) | Message::Narrator(text) | Message::System(text) => text,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::Player(_) => "Player",
            Message::Narrator(_) => "Narrator",
            Message::System(_) => "System",
        }
    }
}
