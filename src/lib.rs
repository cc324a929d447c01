//! questloom — a turn-based, LLM-driven adventure session engine.
//!
//! The player submits an action, the model collaborator proposes a
//! structured state update, the engine validates (and optionally repairs)
//! it, and the store applies it atomically to a versioned `PlayerState`.
//! Rendering, prompt transport, and image generation stay behind the
//! `ModelClient`/`ImageClient` traits and the `ImageEvent` channel.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
