pub mod catalog;
pub mod message;
pub mod player_state;
pub mod save;
pub mod update;
